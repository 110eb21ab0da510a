//! Focus Module
//!
//! Workspace switching and the focus change that goes with it, directional
//! navigation over the workspace grid, workspace swapping and screen switching.

use anyhow::Result;
use tracing::{debug, trace};

use crate::wm::display::DisplayConn;
use crate::wm::screen::WORKSPACE_COUNT;
use crate::wm::session::Session;

/// Workspaces per row of the grid. The top row is reached with super+F1..F12,
/// the bottom row with control+F1..F12.
pub const GRID_COLUMNS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// The workspace next to `workspace` in `direction`, if there is one.
/// Navigation stops at the edges of the grid.
pub fn neighbour(workspace: usize, direction: Direction) -> Option<usize> {
    let col = workspace % GRID_COLUMNS;

    let dest = match direction {
        Direction::Left if col > 0 => workspace - 1,
        Direction::Right if col + 1 < GRID_COLUMNS => workspace + 1,
        Direction::Up if workspace >= GRID_COLUMNS => workspace - GRID_COLUMNS,
        Direction::Down => workspace + GRID_COLUMNS,
        _ => return None,
    };

    (dest < WORKSPACE_COUNT).then_some(dest)
}

impl Session {
    /// Make `workspace` the active workspace of `screen` and move input focus
    /// into it.
    ///
    /// On an actual change the destination windows are shown and those of the
    /// previous workspace are hidden. Focus goes to the last window of the
    /// destination that accepts input, or to the root window, and exactly one
    /// focus request is issued either way.
    pub fn update_focus<D: DisplayConn + ?Sized>(
        &mut self,
        conn: &D,
        screen: usize,
        workspace: usize,
    ) -> Result<()> {
        let desktop = self.desktop_geometry;
        let scr = &mut self.screens[screen];
        let previous = scr.active_workspace;
        let changed = previous != workspace;

        if changed {
            for c in &scr.workspaces[workspace] {
                c.show(conn)?;
            }
            for c in &scr.workspaces[previous] {
                c.hide(conn, &desktop)?;
            }
        }

        let target = scr.workspaces[workspace]
            .iter()
            .rev()
            .find(|c| c.accepts_input)
            .map(|c| c.id)
            .unwrap_or_else(|| conn.root());

        scr.active_workspace = workspace;
        conn.set_input_focus(target)?;

        if changed {
            debug!(
                "Screen {}: workspace {} -> {}, focus 0x{:x}",
                screen, previous, workspace, target
            );
            self.repaint_all = true;
        } else {
            trace!("Screen {}: focus 0x{:x}", screen, target);
        }

        Ok(())
    }

    /// Jump straight to `workspace` on the active screen
    pub fn select_workspace<D: DisplayConn + ?Sized>(
        &mut self,
        conn: &D,
        workspace: usize,
    ) -> Result<()> {
        let screen = self.active_screen;
        self.update_focus(conn, screen, workspace)?;
        self.screens[screen].push_navigation(workspace);

        Ok(())
    }

    /// Move to the neighbouring workspace. The navigation history restarts
    /// at the destination.
    pub fn navigate<D: DisplayConn + ?Sized>(
        &mut self,
        conn: &D,
        direction: Direction,
    ) -> Result<()> {
        let screen = self.active_screen;
        let Some(dest) = neighbour(self.screens[screen].active_workspace, direction) else {
            return Ok(());
        };

        self.update_focus(conn, screen, dest)?;
        self.screens[screen].reset_navigation(dest);

        Ok(())
    }

    /// Exchange the active workspace with its neighbour and follow the
    /// windows to their new slot.
    pub fn swap_workspace<D: DisplayConn + ?Sized>(
        &mut self,
        conn: &D,
        direction: Direction,
    ) -> Result<()> {
        let screen = self.active_screen;
        let scr = &mut self.screens[screen];
        let current = scr.active_workspace;
        let Some(dest) = neighbour(current, direction) else {
            return Ok(());
        };

        scr.workspaces.swap(current, dest);
        for w in scr.navigation_stack.iter_mut() {
            if *w == current {
                *w = dest;
            } else if *w == dest {
                *w = current;
            }
        }

        self.update_focus(conn, screen, dest)?;
        self.screens[screen].push_navigation(dest);

        Ok(())
    }

    /// Make `screen` the active screen and focus its active workspace
    pub fn select_screen<D: DisplayConn + ?Sized>(
        &mut self,
        conn: &D,
        screen: usize,
    ) -> Result<()> {
        if screen >= self.screens.len() {
            debug!("No screen {} to switch to", screen);
            return Ok(());
        }

        self.active_screen = screen;
        let workspace = self.screens[screen].active_workspace;

        self.update_focus(conn, screen, workspace)
    }

    /// Ask the front window of the active workspace to close itself
    pub fn close_active_window<D: DisplayConn + ?Sized>(&self, conn: &D) -> Result<()> {
        match self.screens.get(self.active_screen).and_then(|s| s.active_windows().last()) {
            Some(c) => conn.send_delete_window(c.id),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{Geometry, Xid};
    use crate::wm::client::Client;
    use crate::wm::mock::{Call, MockDisplay, ROOT};
    use crate::wm::screen::Screen;
    use simple_test_case::test_case;

    fn client(id: Xid, accepts_input: bool) -> Client {
        let mut c = Client::new(id, Geometry::new(0, 0, 1920, 1080), false);
        c.accepts_input = accepts_input;
        c
    }

    fn session() -> Session {
        let mut s = Session::new();
        s.add_screen(Screen::new(Geometry::new(0, 0, 1920, 1080)));
        s.add_screen(Screen::new(Geometry::new(1920, 0, 1280, 1024)));
        s
    }

    fn focus_calls(conn: &MockDisplay) -> Vec<Call> {
        conn.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Focus(_)))
            .collect()
    }

    #[test_case(0, Direction::Left, None; "left edge")]
    #[test_case(0, Direction::Up, None; "top edge")]
    #[test_case(11, Direction::Right, None; "right edge of top row")]
    #[test_case(12, Direction::Left, None; "no wrap to previous row")]
    #[test_case(23, Direction::Down, None; "bottom edge")]
    #[test_case(0, Direction::Right, Some(1); "right")]
    #[test_case(3, Direction::Down, Some(15); "down")]
    #[test_case(15, Direction::Up, Some(3); "up")]
    #[test_case(23, Direction::Left, Some(22); "left")]
    #[test]
    fn grid_neighbours(from: usize, direction: Direction, expected: Option<usize>) {
        assert_eq!(neighbour(from, direction), expected);
    }

    #[test]
    fn switching_focuses_the_last_window_accepting_input() {
        let conn = MockDisplay::default();
        let mut s = session();
        s.screens[0].workspaces[4] = vec![client(1, true), client(2, true), client(3, false)];

        s.update_focus(&conn, 0, 4).unwrap();

        assert_eq!(focus_calls(&conn), vec![Call::Focus(2)]);
        assert_eq!(s.screens[0].active_workspace, 4);
    }

    #[test]
    fn switching_to_a_workspace_without_input_windows_focuses_root() {
        let conn = MockDisplay::default();
        let mut s = session();
        s.screens[0].workspaces[4] = vec![client(1, false)];

        s.update_focus(&conn, 0, 4).unwrap();

        assert_eq!(focus_calls(&conn), vec![Call::Focus(ROOT)]);
    }

    #[test]
    fn switching_shows_the_destination_and_hides_the_source() {
        let conn = MockDisplay::default();
        let mut s = session();
        s.screens[0].workspaces[0] = vec![client(1, true)];
        s.screens[0].workspaces[1] = vec![client(2, true)];
        s.repaint_all = false;

        s.update_focus(&conn, 0, 1).unwrap();

        let calls = conn.calls();
        assert!(calls.contains(&Call::Map(2)));
        assert!(calls.contains(&Call::SetWindowX(1, 3200)));
        assert!(!calls.iter().any(|c| matches!(c, Call::SetWindowX(2, _))));
        assert!(s.repaint_all);
    }

    #[test]
    fn refocusing_the_active_workspace_does_not_touch_windows() {
        let conn = MockDisplay::default();
        let mut s = session();
        s.screens[0].workspaces[0] = vec![client(1, true)];

        s.update_focus(&conn, 0, 0).unwrap();

        assert_eq!(conn.calls(), vec![Call::Focus(1)]);
    }

    #[test]
    fn navigation_reseeds_the_history() {
        let conn = MockDisplay::default();
        let mut s = session();
        s.screens[0].navigation_stack = vec![5, 0];

        s.navigate(&conn, Direction::Down).unwrap();

        assert_eq!(s.screens[0].active_workspace, 12);
        assert_eq!(s.screens[0].navigation_stack, vec![12]);
    }

    #[test]
    fn navigation_off_the_grid_does_nothing() {
        let conn = MockDisplay::default();
        let mut s = session();

        s.navigate(&conn, Direction::Left).unwrap();

        assert!(conn.calls().is_empty());
        assert_eq!(s.screens[0].active_workspace, 0);
    }

    #[test]
    fn swap_moves_windows_with_the_user() {
        let conn = MockDisplay::default();
        let mut s = session();
        s.screens[0].workspaces[0] = vec![client(1, true)];
        s.screens[0].workspaces[1] = vec![client(2, true)];
        s.screens[0].navigation_stack = vec![1, 0];

        s.swap_workspace(&conn, Direction::Right).unwrap();

        let scr = &s.screens[0];
        assert_eq!(scr.active_workspace, 1);
        assert_eq!(scr.workspaces[1][0].id, 1);
        assert_eq!(scr.workspaces[0][0].id, 2);
        assert_eq!(scr.navigation_stack, vec![0, 1]);
        assert_eq!(focus_calls(&conn), vec![Call::Focus(1)]);
    }

    #[test]
    fn direct_selection_is_recorded_in_history() {
        let conn = MockDisplay::default();
        let mut s = session();
        s.screens[0].navigation_stack = vec![7, 0];

        s.select_workspace(&conn, 7).unwrap();

        assert_eq!(s.screens[0].navigation_stack, vec![0, 7]);
    }

    #[test]
    fn screen_switch_focuses_that_screens_workspace() {
        let conn = MockDisplay::default();
        let mut s = session();
        s.screens[1].active_workspace = 3;
        s.screens[1].workspaces[3] = vec![client(9, true)];

        s.select_screen(&conn, 1).unwrap();
        s.select_screen(&conn, 5).unwrap();

        assert_eq!(s.active_screen, 1);
        assert_eq!(focus_calls(&conn), vec![Call::Focus(9)]);
    }

    #[test]
    fn close_targets_the_front_window() {
        let conn = MockDisplay::default();
        let mut s = session();
        s.screens[0].workspaces[0] = vec![client(1, true), client(2, true)];

        s.close_active_window(&conn).unwrap();

        assert_eq!(conn.calls(), vec![Call::DeleteWindow(2)]);
    }
}
