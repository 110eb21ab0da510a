//! Client Module
//!
//! Per-window state for every top-level window the manager knows about.

use anyhow::Result;
use tracing::{debug, trace};

use crate::shared::{Geometry, Xid};
use crate::wm::display::{Color, Damage, DisplayConn, PictOp, Picture, Prop, WindowChanges};
use crate::wm::ewmh;

/// Window classification, resolved once from `_NET_WM_WINDOW_TYPE`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowType {
    #[default]
    Unknown,
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
    Normal,
}

impl WindowType {
    /// Map a `_NET_WM_WINDOW_TYPE_*` atom name to a classification
    pub fn from_atom_name(name: &str) -> Option<Self> {
        let t = match name.strip_prefix("_NET_WM_WINDOW_TYPE_")? {
            "DESKTOP" => Self::Desktop,
            "DOCK" => Self::Dock,
            "TOOLBAR" => Self::Toolbar,
            "MENU" => Self::Menu,
            "UTILITY" => Self::Utility,
            "SPLASH" => Self::Splash,
            "DIALOG" => Self::Dialog,
            "NORMAL" => Self::Normal,
            _ => return None,
        };

        Some(t)
    }
}

/// Render resources held while a window is mapped. The damage tracker and
/// the picture come and go together; override-redirect windows are drawn by
/// the server directly and only get the damage tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeResources {
    pub picture: Option<Picture>,
    pub damage: Damage,
}

/// Window Manager client state
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    /// X11 window ID
    pub id: Xid,
    pub window_type: WindowType,
    /// Weak reference to the window this one is transient for
    pub transient_for: Option<Xid>,
    /// Where the manager wants the window
    pub position: Geometry,
    /// Where the server last reported the window to be
    pub real_position: Geometry,
    /// Created with override-redirect: tracked, never placed
    pub override_redirect: bool,
    pub accepts_input: bool,
    pub name: String,
    composite: Option<CompositeResources>,
}

impl Client {
    pub fn new(id: Xid, geometry: Geometry, override_redirect: bool) -> Self {
        Self {
            id,
            window_type: WindowType::Unknown,
            transient_for: None,
            position: geometry,
            real_position: geometry,
            override_redirect,
            accepts_input: true,
            name: String::new(),
            composite: None,
        }
    }

    pub fn composite(&self) -> Option<&CompositeResources> {
        self.composite.as_ref()
    }

    /// The render picture, if the window is currently composited
    pub fn picture(&self) -> Option<Picture> {
        self.composite.and_then(|c| c.picture)
    }

    /// Resolve the window classification. Only runs while the type is still
    /// unknown; query failures classify the window as normal.
    pub fn get_hints<D: DisplayConn + ?Sized>(&mut self, conn: &D) {
        if self.window_type != WindowType::Unknown {
            return;
        }

        self.transient_for = match conn.get_prop(self.id, ewmh::WM_TRANSIENT_FOR) {
            Ok(Some(Prop::Window(ids))) => ids.first().copied().filter(|&w| w != 0),
            _ => None,
        };

        self.window_type = match conn.get_prop(self.id, ewmh::NET_WM_WINDOW_TYPE) {
            Ok(Some(Prop::Atom(names))) => names
                .iter()
                .find_map(|n| WindowType::from_atom_name(n))
                .unwrap_or(WindowType::Normal),
            Ok(_) => WindowType::Normal,
            Err(e) => {
                debug!("Window 0x{:x}: window type query failed: {}", self.id, e);
                WindowType::Normal
            }
        };

        if self.window_type == WindowType::Normal && self.transient_for.is_some() {
            self.window_type = WindowType::Dialog;
        }

        debug!(
            "Window 0x{:x} classified as {:?} (transient for {:?})",
            self.id, self.window_type, self.transient_for
        );

        self.get_wm_hints(conn);
        self.update_name(conn);
    }

    /// Refresh the input-acceptance flag from WM_HINTS
    pub fn get_wm_hints<D: DisplayConn + ?Sized>(&mut self, conn: &D) {
        match conn.get_prop(self.id, ewmh::WM_HINTS) {
            Ok(Some(Prop::WmHints(hints))) => self.accepts_input = hints.accepts_input(),
            Ok(_) => self.accepts_input = true,
            Err(e) => debug!("Window 0x{:x}: WM_HINTS query failed: {}", self.id, e),
        }
    }

    /// Refresh the window name, preferring `_NET_WM_NAME` over `WM_NAME`
    pub fn update_name<D: DisplayConn + ?Sized>(&mut self, conn: &D) {
        for prop in [ewmh::NET_WM_NAME, ewmh::WM_NAME] {
            if let Ok(Some(Prop::UTF8String(strs))) = conn.get_prop(self.id, prop) {
                if let Some(name) = strs.into_iter().next() {
                    trace!("Window 0x{:x} is now named {:?}", self.id, name);
                    self.name = name;
                    return;
                }
            }
        }
    }

    /// Apply the client's WM_NORMAL_HINTS to the requested position
    pub fn constrain_size<D: DisplayConn + ?Sized>(&mut self, conn: &D) {
        let hints = conn.get_prop(self.id, ewmh::WM_NORMAL_HINTS);
        if let Ok(Some(Prop::WmNormalHints(hints))) = hints {
            self.position = hints.apply_to(&self.position);
        }
    }

    /// Acquire the render picture and damage tracker. A no-op while they exist.
    pub fn init_composite<D: DisplayConn + ?Sized>(&mut self, conn: &D) -> Result<()> {
        if self.composite.is_some() {
            return Ok(());
        }

        let picture = if self.override_redirect {
            None
        } else {
            let picture = conn.create_window_picture(self.id)?;
            let area = Geometry::new(0, 0, self.real_position.width, self.real_position.height);
            conn.fill_rectangle(PictOp::Src, picture, Color::BLACK, area)?;
            Some(picture)
        };
        let damage = conn.create_damage(self.id)?;

        debug!(
            "Window 0x{:x} has picture {:?} and damage 0x{:x}",
            self.id, picture, damage
        );
        self.composite = Some(CompositeResources { picture, damage });

        Ok(())
    }

    /// Release the render picture and damage tracker, if held
    pub fn reset_composite<D: DisplayConn + ?Sized>(&mut self, conn: &D) -> Result<()> {
        if let Some(res) = self.composite.take() {
            conn.destroy_damage(res.damage)?;
            if let Some(picture) = res.picture {
                conn.free_picture(picture)?;
            }
        }

        Ok(())
    }

    /// Move the window to its requested position and map it
    pub fn show<D: DisplayConn + ?Sized>(&self, conn: &D) -> Result<()> {
        conn.configure_window(self.id, &WindowChanges::from(self.position))?;
        conn.map_window(self.id)
    }

    /// Park the window just past the right edge of the desktop
    pub fn hide<D: DisplayConn + ?Sized>(&self, conn: &D, desktop: &Geometry) -> Result<()> {
        conn.set_window_x(self.id, desktop.x + desktop.width as i32)
    }
}
