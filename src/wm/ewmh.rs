//! EWMH / ICCCM atoms
//!
//! Property names the core reads by name, and the fixed atoms the X11 backend
//! interns once at startup to send protocol messages.

use anyhow::Result;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, ConnectionExt as _};

pub const NET_WM_WINDOW_TYPE: &str = "_NET_WM_WINDOW_TYPE";
pub const NET_WM_NAME: &str = "_NET_WM_NAME";
pub const WM_NAME: &str = "WM_NAME";
pub const WM_HINTS: &str = "WM_HINTS";
pub const WM_NORMAL_HINTS: &str = "WM_NORMAL_HINTS";
pub const WM_TRANSIENT_FOR: &str = "WM_TRANSIENT_FOR";

/// Holds the interned atoms needed to talk to clients
#[derive(Debug, Clone, Copy)]
pub struct Atoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub wm_state: Atom,
    pub utf8_string: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            wm_protocols: intern("WM_PROTOCOLS")?,
            wm_delete_window: intern("WM_DELETE_WINDOW")?,
            wm_state: intern("WM_STATE")?,
            utf8_string: intern("UTF8_STRING")?,
        })
    }
}
