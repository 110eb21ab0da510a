//! Screen Module
//!
//! Per-output state: the 24 workspaces, ancillary windows, navigation history
//! and the damage accumulated since the last repaint.

use crate::shared::Geometry;
use crate::wm::client::Client;
use crate::wm::display::ScreenSurfaces;

/// Workspaces per screen, laid out as two rows of twelve
pub const WORKSPACE_COUNT: usize = 24;

/// One physical output
#[derive(Debug)]
pub struct Screen {
    pub geometry: Geometry,
    /// Stacking order within a workspace: most recently shown last
    pub workspaces: [Vec<Client>; WORKSPACE_COUNT],
    /// Windows shown regardless of the active workspace (desktop backgrounds)
    pub ancillary: Vec<Client>,
    pub active_workspace: usize,
    /// Previously visited workspaces, most recent last, without duplicates
    pub navigation_stack: Vec<usize>,
    /// Render targets, created once the X backend is up
    pub surfaces: Option<ScreenSurfaces>,
    /// Screen-space rectangles repainted on the next frame
    pub damage: Vec<Geometry>,
}

impl Screen {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            workspaces: std::array::from_fn(|_| Vec::new()),
            ancillary: Vec::new(),
            active_workspace: 0,
            navigation_stack: Vec::new(),
            surfaces: None,
            damage: Vec::new(),
        }
    }

    pub fn with_surfaces(geometry: Geometry, surfaces: ScreenSurfaces) -> Self {
        Self {
            surfaces: Some(surfaces),
            ..Self::new(geometry)
        }
    }

    pub fn active_windows(&self) -> &[Client] {
        &self.workspaces[self.active_workspace]
    }

    pub fn active_is_empty(&self) -> bool {
        self.active_windows().is_empty()
    }

    /// The first empty workspace at or after the active one, wrapping around
    pub fn first_free_workspace(&self) -> Option<usize> {
        (0..WORKSPACE_COUNT)
            .map(|i| (self.active_workspace + i) % WORKSPACE_COUNT)
            .find(|&ws| self.workspaces[ws].is_empty())
    }

    /// Record a visit to `workspace`, dropping any earlier entry for it
    pub fn push_navigation(&mut self, workspace: usize) {
        self.navigation_stack.retain(|&w| w != workspace);
        self.navigation_stack.push(workspace);
    }

    /// Forget the history and restart it at `workspace`
    pub fn reset_navigation(&mut self, workspace: usize) {
        self.navigation_stack.clear();
        self.navigation_stack.push(workspace);
    }

    pub fn add_damage(&mut self, area: Geometry) {
        if !area.is_empty() {
            self.damage.push(area);
        }
    }
}
