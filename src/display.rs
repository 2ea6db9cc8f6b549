//! Display-server boundary.
//!
//! The container tree never talks to X11 (or anything else) directly. Every
//! side effect goes through a [`DisplayServer`], so the tree can run headless
//! in tests and in `contreectl`, or against a real server via
//! [`crate::x11::X11Display`].

use x11rb::protocol::xproto::Window;

use crate::layout::ConId;
use crate::types::WindowState;

/// Capabilities the container tree needs from the display server.
pub trait DisplayServer {
    /// Create the display-side frame for a freshly created container.
    /// Called exactly once per container, before any state push.
    fn realize_frame(&mut self, con: ConId) -> Window;

    /// Release a frame previously returned by [`Self::realize_frame`].
    fn unrealize_frame(&mut self, _frame: Window) {}

    /// Replace the window's state. `None` clears it.
    fn push_window_state(&mut self, window: Window, state: Option<WindowState>);

    /// A container on `workspace` lost its urgent flag; the workspace's own
    /// urgency may need recomputing.
    fn notify_urgent_recheck(&mut self, workspace: ConId);
}

/// A display server that only records what was asked of it.
#[derive(Debug)]
pub struct HeadlessDisplay {
    next_frame: Window,
    /// Frames realized so far, in order
    pub realized: Vec<(ConId, Window)>,
    /// Frames released so far, in order
    pub unrealized: Vec<Window>,
    /// Every state push, in order
    pub pushed_states: Vec<(Window, Option<WindowState>)>,
    /// Every urgent recheck notification, in order
    pub urgent_rechecks: Vec<ConId>,
}

/// First frame id handed out, chosen to look like an X resource id
const FIRST_FRAME_ID: Window = 0x0040_0001;

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self {
            next_frame: FIRST_FRAME_ID,
            realized: Vec::new(),
            unrealized: Vec::new(),
            pushed_states: Vec::new(),
            urgent_rechecks: Vec::new(),
        }
    }
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayServer for HeadlessDisplay {
    fn realize_frame(&mut self, con: ConId) -> Window {
        let frame = self.next_frame;
        self.next_frame += 1;
        self.realized.push((con, frame));
        log::debug!("Realized frame 0x{:x} for {:?}", frame, con);
        frame
    }

    fn unrealize_frame(&mut self, frame: Window) {
        log::debug!("Released frame 0x{:x}", frame);
        self.unrealized.push(frame);
    }

    fn push_window_state(&mut self, window: Window, state: Option<WindowState>) {
        log::debug!("Window 0x{:x} state -> {:?}", window, state);
        self.pushed_states.push((window, state));
    }

    fn notify_urgent_recheck(&mut self, workspace: ConId) {
        log::debug!("Urgent recheck for workspace {:?}", workspace);
        self.urgent_rechecks.push(workspace);
    }
}
