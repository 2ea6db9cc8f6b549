//! X11 implementation of the display-server boundary.
//!
//! Every container gets an unmapped frame window as a child of the X root
//! window. Window state pushes replace `_NET_WM_STATE` on the client window.
//! Requests are fire-and-forget: X errors are logged and never reach the tree.

use anyhow::{Context, Result};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::display::DisplayServer;
use crate::ewmh::Atoms;
use crate::layout::ConId;
use crate::types::WindowState;

/// Size of a freshly realized frame, before any layout pass sizes it
const INITIAL_FRAME_SIZE: u16 = 1;

pub struct X11Display<C: Connection> {
    conn: C,
    root: Window,
    atoms: Atoms,
}

impl X11Display<RustConnection> {
    /// Connect to `$DISPLAY`
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
        let root = conn.setup().roots[screen_num].root;
        Self::new(conn, root)
    }
}

impl<C: Connection> X11Display<C> {
    pub fn new(conn: C, root: Window) -> Result<Self> {
        let atoms = Atoms::new(&conn).context("Failed to intern EWMH atoms")?;
        log::info!("Using X11 root window 0x{:x}", root);
        Ok(Self { conn, root, atoms })
    }

    fn create_frame(&self) -> Result<Window> {
        let frame = self.conn.generate_id()?;
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            frame,
            self.root,
            0,
            0,
            INITIAL_FRAME_SIZE,
            INITIAL_FRAME_SIZE,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new().override_redirect(1),
        )?;
        self.conn.flush()?;
        Ok(frame)
    }

    fn destroy_frame(&self, frame: Window) -> Result<()> {
        self.conn.destroy_window(frame)?;
        self.conn.flush()?;
        Ok(())
    }

    fn set_wm_state(&self, window: Window, state: Option<WindowState>) -> Result<()> {
        let values: Vec<Atom> = match state {
            Some(WindowState::Fullscreen) => vec![self.atoms.net_wm_state_fullscreen],
            None => Vec::new(),
        };
        self.conn.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.net_wm_state,
            AtomEnum::ATOM,
            &values,
        )?;
        self.conn.flush()?;
        Ok(())
    }
}

impl<C: Connection> DisplayServer for X11Display<C> {
    fn realize_frame(&mut self, con: ConId) -> Window {
        match self.create_frame() {
            Ok(frame) => {
                log::debug!("Frame 0x{:x} for {:?}", frame, con);
                frame
            }
            Err(e) => {
                log::warn!("Failed to create frame for {:?}: {}", con, e);
                x11rb::NONE
            }
        }
    }

    fn unrealize_frame(&mut self, frame: Window) {
        if frame == x11rb::NONE {
            return;
        }
        if let Err(e) = self.destroy_frame(frame) {
            log::warn!("Failed to destroy frame 0x{:x}: {}", frame, e);
        }
    }

    fn push_window_state(&mut self, window: Window, state: Option<WindowState>) {
        if let Err(e) = self.set_wm_state(window, state) {
            log::warn!("Failed to update _NET_WM_STATE on 0x{:x}: {}", window, e);
        }
    }

    fn notify_urgent_recheck(&mut self, workspace: ConId) {
        // Workspace urgency has no X11 property of its own
        log::debug!("Urgent recheck requested for workspace {:?}", workspace);
    }
}
