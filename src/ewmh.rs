//! EWMH (Extended Window Manager Hints) atom management.
//!
//! Only the atoms the container tree pushes to clients are interned here.

use anyhow::Result;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, ConnectionExt};

/// EWMH atoms used for window state pushes
pub struct Atoms {
    pub net_wm_state: Atom,
    pub net_wm_state_fullscreen: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new(conn: &impl Connection) -> Result<Self> {
        Ok(Self {
            net_wm_state: Self::intern(conn, b"_NET_WM_STATE")?,
            net_wm_state_fullscreen: Self::intern(conn, b"_NET_WM_STATE_FULLSCREEN")?,
        })
    }

    /// Intern an atom name
    fn intern(conn: &impl Connection, name: &[u8]) -> Result<Atom> {
        Ok(conn.intern_atom(false, name)?.reply()?.atom)
    }
}
