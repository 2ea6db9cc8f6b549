//! Startup tree construction.
//!
//! This module turns the configured outputs, workspaces and containers into
//! containers in the tree, attaching each one at the tail of its parent the
//! same way containers created at runtime are attached.

use crate::config::{Config, ContainerConfig, OutputConfig, WorkspaceConfig};
use crate::display::DisplayServer;
use crate::layout::{ConId, ConTree};
use crate::types::{ConKind, FloatingMode, RebalanceAction};

/// Name of the output created when the config lists none
pub const DEFAULT_OUTPUT: &str = "default";
/// Name of the workspace created when the config lists none
pub const DEFAULT_WORKSPACE: &str = "1";

/// What the startup pass created
#[derive(Debug, Default, Clone)]
pub struct StartupSummary {
    pub outputs: Vec<ConId>,
    pub workspaces: Vec<ConId>,
    /// Split containers and floating groups, excluding outputs and workspaces
    pub containers: usize,
    /// Container focused at the end of startup
    pub focused: Option<ConId>,
}

/// Build the configured tree below the root of `tree`.
///
/// With no outputs configured, a single default output with one workspace is
/// created. The most recently focused leaf of the first workspace ends up
/// focused.
pub fn apply_config<D: DisplayServer>(tree: &mut ConTree<D>, config: &Config) -> StartupSummary {
    let mut summary = StartupSummary::default();
    let rebalance = config.general.rebalance;

    let default_outputs;
    let outputs = if config.outputs.is_empty() {
        log::info!("No outputs configured, using '{}'", DEFAULT_OUTPUT);
        default_outputs = vec![default_output()];
        &default_outputs
    } else {
        &config.outputs
    };

    for output_config in outputs {
        let output = tree.add_output(&output_config.name);
        summary.outputs.push(output);

        for ws_config in &output_config.workspaces {
            if tree.workspace_by_name(&ws_config.name).is_some() {
                log::warn!(
                    "Duplicate workspace '{}' in startup config, skipping",
                    ws_config.name
                );
                continue;
            }

            log::info!("Applying startup layout to workspace '{}'", ws_config.name);
            let workspace = tree.add_workspace(output, &ws_config.name);
            tree.set_orientation(workspace, ws_config.orientation);
            summary.workspaces.push(workspace);

            for child in &ws_config.children {
                summary.containers += build_container(tree, workspace, child, rebalance);
            }
        }
    }

    if let Some(&first) = summary.workspaces.first() {
        let target = tree.descend_focused(first);
        tree.focus(target);
        summary.focused = Some(target);
    }
    summary
}

fn default_output() -> OutputConfig {
    OutputConfig {
        name: DEFAULT_OUTPUT.to_string(),
        workspaces: vec![WorkspaceConfig {
            name: DEFAULT_WORKSPACE.to_string(),
            orientation: Default::default(),
            children: Vec::new(),
        }],
    }
}

/// Create one configured container (and its subtree) under `parent`.
/// Returns the number of containers created.
fn build_container<D: DisplayServer>(
    tree: &mut ConTree<D>,
    parent: ConId,
    config: &ContainerConfig,
    rebalance: bool,
) -> usize {
    match config {
        ContainerConfig::Split(split) => {
            let id = tree.create_node(None);
            tree.set_name(id, split.name.as_str());
            tree.set_orientation(id, split.orientation);
            for rule in &split.swallows {
                tree.swallow(id, rule.clone());
            }

            tree.attach(id, parent);
            if rebalance {
                tree.rebalance(parent, RebalanceAction::Add);
            }
            // The new container's own share is assigned after making room for it
            if split.percent > 0.0 {
                tree.set_percent(id, split.percent);
            }

            1 + split
                .children
                .iter()
                .map(|child| build_container(tree, id, child, rebalance))
                .sum::<usize>()
        }
        ContainerConfig::Floating(floating) => {
            let id = tree.create_node(None);
            tree.set_kind(id, ConKind::FloatingGroup);
            tree.set_floating(id, FloatingMode::AutoOn);
            tree.set_name(id, floating.name.as_str());
            tree.attach(id, parent);

            1 + floating
                .children
                .iter()
                .map(|child| build_container(tree, id, child, rebalance))
                .sum::<usize>()
        }
    }
}
