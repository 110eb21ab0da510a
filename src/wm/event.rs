//! Event Module
//!
//! Display-server events, already decoded into the shape the dispatcher needs.

use crate::shared::{Geometry, Xid};
use crate::wm::display::{Damage, WindowChanges};
use crate::wm::keyboard::{KeySym, ModifierState};

/// An event delivered by the display server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XEvent {
    /// A new top-level window was created
    Create {
        id: Xid,
        geometry: Geometry,
        override_redirect: bool,
    },
    /// A window was destroyed
    Destroy(Xid),
    /// A client asked for its window to be mapped
    MapRequest(Xid),
    /// A window became mapped
    MapNotify(Xid),
    /// A window became unmapped
    UnmapNotify(Xid),
    /// A window's position or size changed
    ConfigureNotify { id: Xid, geometry: Geometry },
    /// A client asked for its window to be reconfigured. Only the fields in
    /// the request's value mask are set.
    ConfigureRequest { id: Xid, changes: WindowChanges },
    /// Part of a window's contents changed. `area` is relative to the window.
    Damage {
        drawable: Xid,
        damage: Damage,
        area: Geometry,
    },
    KeyPress(KeyEvent),
    KeyRelease(KeyEvent),
    /// A watched property changed
    Property { id: Xid, atom: String },
    /// An asynchronous protocol error
    Error(XError),
}

/// A key press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub keysym: KeySym,
    /// Modifiers held just before the event
    pub state: ModifierState,
}

/// Protocol error classes the window manager reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XErrorKind {
    Access,
    Window,
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XError {
    pub kind: XErrorKind,
    pub major_opcode: u8,
    pub bad_value: u32,
}

/// Core protocol opcode of ChangeWindowAttributes
pub const CHANGE_WINDOW_ATTRIBUTES: u8 = 2;
