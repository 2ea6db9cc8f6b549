//! contreectl - Build a container tree from config and inspect it
//!
//! The tree is rebuilt from the config file on every run; each command runs
//! one operation against it and prints the result.
//!
//! # Examples
//!
//! ```bash
//! # Print the startup tree
//! contreectl tree
//!
//! # Check the tree invariants
//! contreectl validate
//!
//! # Which container would swallow an xterm?
//! contreectl match --class XTerm --instance xterm
//!
//! # Focus a container by name, then print the tree
//! contreectl focus editor
//!
//! # Toggle fullscreen, pushing _NET_WM_STATE to a real X server
//! contreectl --x11 fullscreen editor
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use contree::config::Config;
use contree::startup;
use contree::state;
use contree::x11::X11Display;
use contree::{
    ClientWindow, ConId, ConKind, ConTree, DisplayServer, ExactMatcher, FullscreenMode,
    HeadlessDisplay, Orientation, ToggleOutcome,
};

/// contreectl - Inspect a contree container tree
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/contree/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Realize frames on the X server in $DISPLAY instead of running headless
    #[arg(long, global = true)]
    x11: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the container tree
    Tree,

    /// Validate tree invariants
    Validate,

    /// Find the container that would swallow a window
    Match {
        /// WM_CLASS class
        #[arg(long)]
        class: Option<String>,
        /// WM_CLASS instance
        #[arg(long)]
        instance: Option<String>,
        /// Window title
        #[arg(long)]
        title: Option<String>,
        /// Window ID (decimal or hex with 0x prefix)
        #[arg(long)]
        window: Option<String>,
    },

    /// Focus the first container with the given name
    Focus {
        name: String,
    },

    /// Toggle fullscreen on the first container with the given name
    Fullscreen {
        name: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::read(path)?,
        None => Config::load(),
    };

    let ok = if cli.x11 {
        let display = X11Display::connect()?;
        run(ConTree::new(display), &config, &cli.command)?
    } else {
        run(ConTree::new(HeadlessDisplay::new()), &config, &cli.command)?
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Build the tree, run one command. Returns false when the command reports failure.
fn run<D: DisplayServer>(mut tree: ConTree<D>, config: &Config, command: &Commands) -> Result<bool> {
    let summary = startup::apply_config(&mut tree, config);
    log::info!(
        "Built {} outputs, {} workspaces, {} containers",
        summary.outputs.len(),
        summary.workspaces.len(),
        summary.containers
    );

    match command {
        Commands::Tree => print_tree(&tree),
        Commands::Validate => {
            let violations = state::validate(&tree);
            if violations.is_empty() {
                println!("OK: no violations");
            } else {
                for v in &violations {
                    println!("{:?}: {}", v.kind, v.description);
                }
                return Ok(false);
            }
        }
        Commands::Match {
            class,
            instance,
            title,
            window,
        } => {
            let id = match window {
                Some(w) => parse_window_id(w)?,
                None => x11rb::NONE,
            };
            let window = ClientWindow {
                id,
                class: class.clone(),
                instance: instance.clone(),
                title: title.clone(),
            };
            match tree.find_owner(&window, &ExactMatcher) {
                Some((owner, rule)) => {
                    println!("{} ({:?}) via {:?}", describe(&tree, owner), owner, rule);
                }
                None => {
                    println!("No container swallows this window");
                    return Ok(false);
                }
            }
        }
        Commands::Focus { name } => {
            let id = lookup(&tree, name)?;
            if tree.con(id).kind() == ConKind::Root {
                bail!("The root container cannot be focused");
            }
            tree.focus(id);
            print_tree(&tree);
        }
        Commands::Fullscreen { name } => {
            let id = lookup(&tree, name)?;
            if tree.find_ancestor(id, ConKind::Workspace).is_none() {
                bail!("'{}' is not on a workspace", name);
            }
            let outcome = tree.toggle_fullscreen(id);
            match outcome {
                ToggleOutcome::Entered => println!("'{}' is now fullscreen", name),
                ToggleOutcome::Left => println!("'{}' left fullscreen", name),
                ToggleOutcome::Blocked(other) => {
                    println!("Blocked: {} is already fullscreen", describe(&tree, other));
                }
            }
            print_tree(&tree);
            if let ToggleOutcome::Blocked(_) = outcome {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn lookup<D: DisplayServer>(tree: &ConTree<D>, name: &str) -> Result<ConId> {
    tree.find_by_name(name)
        .with_context(|| format!("No container named '{}'", name))
}

/// Parse window ID from string (supports hex with 0x prefix)
fn parse_window_id(s: &str) -> Result<u32> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse::<u32>()
    };
    parsed.with_context(|| format!("Invalid window ID: {}", s))
}

fn describe<D: DisplayServer>(tree: &ConTree<D>, id: ConId) -> String {
    let con = tree.con(id);
    if con.name().is_empty() {
        format!("{:?}", con.kind())
    } else {
        format!("{:?} '{}'", con.kind(), con.name())
    }
}

fn print_tree<D: DisplayServer>(tree: &ConTree<D>) {
    print_node(tree, tree.root(), 0, false);
}

fn print_node<D: DisplayServer>(tree: &ConTree<D>, id: ConId, depth: usize, floating: bool) {
    let con = tree.con(id);
    let mut line = format!("{}{}", "  ".repeat(depth), describe(tree, id));

    if con.orientation() != Orientation::None {
        line.push_str(&format!(" [{:?}]", con.orientation()).to_lowercase());
    }
    if con.percent() > 0.0 {
        line.push_str(&format!(" {:.1}%", con.percent() * 100.0));
    }
    if let Some(window) = con.window() {
        line.push_str(&format!(" window=0x{:x}", window.id));
    }
    if floating {
        line.push_str(" (floating)");
    }
    if con.fullscreen_mode() != FullscreenMode::None {
        line.push_str(" (fullscreen)");
    }
    if con.urgent() {
        line.push_str(" (urgent)");
    }
    if tree.focused() == Some(id) {
        line.push_str(" *");
    }
    println!("{}", line);

    for &child in con.children() {
        print_node(tree, child, depth + 1, false);
    }
    for &child in con.floating_children() {
        print_node(tree, child, depth + 1, true);
    }
}
