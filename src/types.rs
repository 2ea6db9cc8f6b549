//! Shared types used across multiple modules.
//!
//! This module contains the small value types of the container tree so that
//! layout, fullscreen, matching and config can share them without depending
//! on each other.

use serde::Deserialize;
use x11rb::protocol::xproto::Window;

/// What a container represents in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConKind {
    /// The single top-level node
    Root,
    /// A physical screen
    Output,
    /// A virtual desktop on an output
    Workspace,
    /// A plain container: either splits its children or hosts a window
    Split,
    /// A group of floating containers, kept in the parent's floating list
    FloatingGroup,
}

/// Axis along which a container divides its space among children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Not a splitter; the container may host a window
    #[default]
    None,
    /// Children arranged left-to-right
    Horizontal,
    /// Children arranged top-to-bottom
    Vertical,
}

/// Fullscreen state of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullscreenMode {
    #[default]
    None,
    /// Covers the whole output
    PerOutput,
}

/// Floating state. The `Auto*` variants are decided by the window manager,
/// the `User*` variants by an explicit user request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FloatingMode {
    #[default]
    AutoOff,
    UserOff,
    AutoOn,
    UserOn,
}

/// Window state pushed to the display server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Fullscreen,
}

/// Which structural change a rebalance follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceAction {
    Add,
    Remove,
}

/// Result of toggling fullscreen on a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome<Id> {
    /// The container is now fullscreen
    Entered,
    /// The container left fullscreen
    Left,
    /// Another container in the same workspace is already fullscreen
    Blocked(Id),
}

/// A client window as seen by the container tree.
///
/// The window itself is owned by the display server; the tree only keeps the
/// properties it needs for matching and state pushes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientWindow {
    pub id: Window,
    /// WM_CLASS class part
    pub class: Option<String>,
    /// WM_CLASS instance part
    pub instance: Option<String>,
    pub title: Option<String>,
}

impl ClientWindow {
    pub fn new(id: Window) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
