//! Session Module
//!
//! The whole desktop: every screen, every managed window and the flags that
//! drive the next repaint. Each [Client] lives in exactly one container at a
//! time (the unpositioned list, one screen's ancillary list or one workspace),
//! and [Session::move_window] is the only place that changes which.

use anyhow::Result;
use std::collections::HashSet;
use tracing::debug;

use crate::shared::{Geometry, Xid};
use crate::wm::client::Client;
use crate::wm::display::DisplayConn;
use crate::wm::screen::Screen;

/// Which container currently holds a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Unpositioned,
    Ancillary { screen: usize },
    Workspace { screen: usize, workspace: usize },
}

impl Location {
    pub fn screen(&self) -> Option<usize> {
        match *self {
            Location::Unpositioned => None,
            Location::Ancillary { screen } | Location::Workspace { screen, .. } => Some(screen),
        }
    }

    pub fn workspace(&self) -> Option<usize> {
        match *self {
            Location::Workspace { workspace, .. } => Some(workspace),
            _ => None,
        }
    }
}

/// Destination of [Session::move_window]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Ancillary(usize),
    Workspace(usize, usize),
}

#[derive(Debug)]
pub struct Session {
    pub screens: Vec<Screen>,
    pub active_screen: usize,
    /// Windows not yet assigned to a screen
    pub unpositioned: Vec<Client>,
    /// Windows created by the manager itself, never managed
    internal_windows: HashSet<Xid>,
    /// Bounding box of all screens
    pub desktop_geometry: Geometry,
    pub repaint_all: bool,
    pub damage_pending: bool,
    pub showing_overlay: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            screens: Vec::new(),
            active_screen: 0,
            unpositioned: Vec::new(),
            internal_windows: HashSet::new(),
            desktop_geometry: Geometry::default(),
            repaint_all: true,
            damage_pending: false,
            showing_overlay: false,
        }
    }

    /// Append a screen, growing the desktop geometry to cover it
    pub fn add_screen(&mut self, screen: Screen) {
        if self.screens.is_empty() {
            self.desktop_geometry = screen.geometry;
        } else {
            self.desktop_geometry.union_with(&screen.geometry);
        }
        if let Some(surfaces) = &screen.surfaces {
            self.internal_windows.insert(surfaces.window);
        }

        debug!(
            "Added screen {} at {:?}, desktop is now {:?}",
            self.screens.len(),
            screen.geometry,
            self.desktop_geometry
        );
        self.screens.push(screen);
    }

    pub fn is_internal(&self, id: Xid) -> bool {
        self.internal_windows.contains(&id)
    }

    /// Locate a managed window: unpositioned first, then each screen's
    /// ancillary list, then each screen's workspaces.
    pub fn find_x_window(&self, id: Xid) -> Option<(&Client, Location)> {
        if let Some(c) = self.unpositioned.iter().find(|c| c.id == id) {
            return Some((c, Location::Unpositioned));
        }

        for (s, screen) in self.screens.iter().enumerate() {
            if let Some(c) = screen.ancillary.iter().find(|c| c.id == id) {
                return Some((c, Location::Ancillary { screen: s }));
            }
            for (w, ws) in screen.workspaces.iter().enumerate() {
                if let Some(c) = ws.iter().find(|c| c.id == id) {
                    return Some((
                        c,
                        Location::Workspace {
                            screen: s,
                            workspace: w,
                        },
                    ));
                }
            }
        }

        None
    }

    pub fn locate(&self, id: Xid) -> Option<Location> {
        self.find_x_window(id).map(|(_, loc)| loc)
    }

    pub fn client(&self, id: Xid) -> Option<&Client> {
        self.find_x_window(id).map(|(c, _)| c)
    }

    pub fn client_mut(&mut self, id: Xid) -> Option<&mut Client> {
        let loc = self.locate(id)?;
        self.container_mut(loc).iter_mut().find(|c| c.id == id)
    }

    fn container_mut(&mut self, loc: Location) -> &mut Vec<Client> {
        match loc {
            Location::Unpositioned => &mut self.unpositioned,
            Location::Ancillary { screen } => &mut self.screens[screen].ancillary,
            Location::Workspace { screen, workspace } => {
                &mut self.screens[screen].workspaces[workspace]
            }
        }
    }

    /// Remove a window from whichever container holds it
    pub fn take_client(&mut self, id: Xid) -> Option<(Client, Location)> {
        let loc = self.locate(id)?;
        let container = self.container_mut(loc);
        let idx = container.iter().position(|c| c.id == id)?;

        Some((container.remove(idx), loc))
    }

    /// Move a window into `target`, appending it to the end of that container.
    /// Returns false if the window is not known.
    pub fn move_window(&mut self, id: Xid, target: Target) -> bool {
        let Some((client, _)) = self.take_client(id) else {
            return false;
        };

        match target {
            Target::Ancillary(s) => self.screens[s].ancillary.push(client),
            Target::Workspace(s, w) => self.screens[s].workspaces[w].push(client),
        }

        true
    }

    /// Forget a destroyed window. If that empties the active workspace of its
    /// screen, fall back to the most recent workspace left in the history.
    pub fn remove_x_window<D: DisplayConn + ?Sized>(
        &mut self,
        conn: &D,
        id: Xid,
    ) -> Result<Option<Client>> {
        self.repaint_all = true;

        let Some((client, loc)) = self.take_client(id) else {
            debug!("Window 0x{:x} destroyed but was not managed", id);
            return Ok(None);
        };
        debug!("Window 0x{:x} removed from {:?}", id, loc);

        if let Location::Workspace { screen, workspace } = loc {
            let scr = &mut self.screens[screen];
            if scr.workspaces[workspace].is_empty() {
                scr.navigation_stack.retain(|&w| w != workspace);
                if scr.active_workspace == workspace {
                    if let Some(&previous) = scr.navigation_stack.last() {
                        self.update_focus(conn, screen, previous)?;
                    }
                }
            }
        }

        Ok(Some(client))
    }
}
