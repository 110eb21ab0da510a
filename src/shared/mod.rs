//! Types shared between the window manager and the compositor

pub mod geometry;

pub use geometry::Geometry;

/// An X11 resource id (window, picture, damage, ...)
pub type Xid = u32;
