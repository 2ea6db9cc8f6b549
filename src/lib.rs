//! contree - container tree core for a tiling window manager.
//!
//! The tree holds outputs, workspaces, split containers, window leaves and
//! floating groups. Every container sits in one arena; each parent keeps two
//! independent orderings of its children (stacking order and focus order).
//! Side effects on the display go through [`display::DisplayServer`].

pub mod config;
pub mod display;
pub mod ewmh;
pub mod fullscreen;
pub mod layout;
pub mod matching;
pub mod startup;
pub mod state;
pub mod types;
pub mod workspaces;
pub mod x11;

pub use display::{DisplayServer, HeadlessDisplay};
pub use layout::{Con, ConId, ConTree};
pub use matching::{ExactMatcher, Match, WindowMatcher};
pub use types::{
    ClientWindow, ConKind, FloatingMode, FullscreenMode, Orientation, RebalanceAction,
    ToggleOutcome, WindowState,
};
