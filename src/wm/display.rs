//! Display Module
//!
//! The set of display-server queries and commands the window manager issues.
//! The event dispatcher and the compositor only talk to the X server through
//! [DisplayConn], so the whole core runs unchanged against a recording mock.

use anyhow::Result;

use crate::shared::{Geometry, Xid};
use crate::wm::event::XEvent;
use crate::wm::hints::{SizeHints, WmHints};

/// XRender picture id
pub type Picture = u32;

/// XDamage object id
pub type Damage = u32;

/// A window property value, decoded according to its X type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prop {
    /// One or more atoms, already resolved to their names
    Atom(Vec<String>),
    /// One or more window ids
    Window(Vec<Xid>),
    /// Plain 32-bit values
    Cardinal(Vec<u32>),
    /// STRING / UTF8_STRING values split on NUL
    UTF8String(Vec<String>),
    /// Decoded WM_HINTS
    WmHints(WmHints),
    /// Decoded WM_NORMAL_HINTS
    WmNormalHints(SizeHints),
}

/// ICCCM WM_STATE values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmState {
    Withdrawn = 0,
    Normal = 1,
}

/// Restacking request carried through from a client ConfigureRequest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    Above,
    Below,
    TopIf,
    BottomIf,
    Opposite,
}

/// A low-level window reconfiguration. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowChanges {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub border_width: Option<u32>,
    pub sibling: Option<Xid>,
    pub stack_mode: Option<StackMode>,
}

impl WindowChanges {
    /// Overwrite the fields of `geometry` present in these changes
    pub fn apply_to(&self, geometry: &mut Geometry) {
        if let Some(x) = self.x {
            geometry.x = x;
        }
        if let Some(y) = self.y {
            geometry.y = y;
        }
        if let Some(w) = self.width {
            geometry.width = w;
        }
        if let Some(h) = self.height {
            geometry.height = h;
        }
    }

    /// The same changes, always setting position and size to `geometry`
    pub fn with_geometry(self, geometry: Geometry) -> Self {
        Self {
            x: Some(geometry.x),
            y: Some(geometry.y),
            width: Some(geometry.width),
            height: Some(geometry.height),
            ..self
        }
    }
}

impl From<Geometry> for WindowChanges {
    fn from(geometry: Geometry) -> Self {
        Self::default().with_geometry(geometry)
    }
}

/// 16 bit per channel premultiplied colour, as XRender expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub alpha: u16,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 0xffff);

    pub const fn rgba(red: u16, green: u16, blue: u16, alpha: u16) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Compositing operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictOp {
    /// Replace the destination
    Src,
    /// Blend over the destination
    Over,
}

/// Per-screen drawing resources created once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSurfaces {
    /// The override-redirect window pixels are presented in
    pub window: Xid,
    /// Front picture, backed by `window`
    pub picture: Picture,
    /// Off-screen back buffer the frame is composed in
    pub buffer: Picture,
    /// Progressively half-sized buffers used to build overview thumbnails
    pub resize_buffers: Vec<Picture>,
}

/// A handle on a display server connection.
///
/// All calls are made from the event loop thread. Requests that target a
/// window the server has already destroyed do not fail here: the protocol
/// error comes back later as an [XEvent::Error].
pub trait DisplayConn {
    /// The root window of the managed X screen
    fn root(&self) -> Xid;
    /// Non-blocking: the next already available event, if any
    fn poll_event(&self) -> Result<Option<XEvent>>;
    /// Push any buffered requests to the server
    fn flush(&self) -> Result<()>;

    /// Geometry of each physical output, in root coordinates
    fn screen_geometries(&self) -> Result<Vec<Geometry>>;
    /// Create the compositing window and pictures for one output
    fn create_screen_surfaces(&self, geometry: Geometry) -> Result<ScreenSurfaces>;

    /// Read a property by name. `Ok(None)` if it is not set.
    fn get_prop(&self, id: Xid, name: &str) -> Result<Option<Prop>>;
    /// Publish the ICCCM WM_STATE of a client
    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()>;
    /// Ask to be told about property changes on a client
    fn watch_properties(&self, id: Xid) -> Result<()>;

    /// Move/resize (and optionally restack) a window
    fn configure_window(&self, id: Xid, changes: &WindowChanges) -> Result<()>;
    /// Move a window horizontally only, leaving everything else untouched
    fn set_window_x(&self, id: Xid, x: i32) -> Result<()>;
    fn map_window(&self, id: Xid) -> Result<()>;
    fn set_input_focus(&self, id: Xid) -> Result<()>;
    /// Send WM_DELETE_WINDOW through WM_PROTOCOLS
    fn send_delete_window(&self, id: Xid) -> Result<()>;

    /// Stop redirecting the pixel contents of a window off-screen
    fn unredirect_window(&self, id: Xid) -> Result<()>;
    /// Create a render picture for a window, including its inferiors
    fn create_window_picture(&self, id: Xid) -> Result<Picture>;
    fn free_picture(&self, picture: Picture) -> Result<()>;
    /// Start tracking damage to a window (non-empty report level)
    fn create_damage(&self, id: Xid) -> Result<Damage>;
    fn destroy_damage(&self, damage: Damage) -> Result<()>;
    /// Mark all damage of `damage` as repaired so further notifications arrive.
    /// Returns the repaired region in window coordinates.
    fn subtract_damage(&self, damage: Damage) -> Result<Vec<Geometry>>;

    /// Fill a rectangle of `dst` with a solid colour
    fn fill_rectangle(&self, op: PictOp, dst: Picture, color: Color, r: Geometry) -> Result<()>;
    /// Copy a `width` x `height` block from `src` at (0, 0) to `dst` at (x, y)
    fn composite(
        &self,
        op: PictOp,
        src: Picture,
        dst: Picture,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<()>;
    /// Restrict drawing into `dst` to the given rectangles, or lift the clip with `None`
    fn set_clip_rectangles(&self, dst: Picture, rects: Option<&[Geometry]>) -> Result<()>;
    /// Sample `picture` scaled by `scale` (1.0 restores the identity transform)
    fn set_picture_scale(&self, picture: Picture, scale: f64) -> Result<()>;
}
