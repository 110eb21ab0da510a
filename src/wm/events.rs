//! Events Module
//!
//! The event dispatcher: one handler per notification kind, each bringing the
//! session model back in line with what the X server reports.

use anyhow::Result;
use tracing::{debug, info, trace, warn};

use crate::shared::{Geometry, Xid};
use crate::wm::client::{Client, WindowType};
use crate::wm::display::{Damage, DisplayConn, WindowChanges, WmState};
use crate::wm::event::{KeyEvent, XError, XErrorKind, XEvent, CHANGE_WINDOW_ATTRIBUTES};
use crate::wm::ewmh;
use crate::wm::keyboard::{self, KeyAction};
use crate::wm::session::Target;
use crate::wm::{WindowManager, WmError};

impl<D: DisplayConn> WindowManager<D> {
    pub fn handle_event(&mut self, event: XEvent) -> Result<()> {
        trace!("Event: {:?}", event);

        match event {
            XEvent::Create {
                id,
                geometry,
                override_redirect,
            } => self.handle_create(id, geometry, override_redirect),
            XEvent::Destroy(id) => self.handle_destroy(id),
            XEvent::MapRequest(id) => self.handle_map_request(id),
            XEvent::MapNotify(id) => self.handle_map_notify(id),
            XEvent::UnmapNotify(id) => self.handle_unmap_notify(id),
            XEvent::ConfigureNotify { id, geometry } => self.handle_configure_notify(id, geometry),
            XEvent::ConfigureRequest { id, changes } => self.handle_configure_request(id, changes),
            XEvent::Damage {
                drawable,
                damage,
                area,
            } => self.handle_damage(drawable, damage, area),
            XEvent::KeyPress(key) => self.handle_key(key, true),
            XEvent::KeyRelease(key) => self.handle_key(key, false),
            XEvent::Property { id, atom } => self.handle_property(id, &atom),
            XEvent::Error(err) => self.handle_error(err),
        }
    }

    fn handle_create(
        &mut self,
        id: Xid,
        geometry: Geometry,
        override_redirect: bool,
    ) -> Result<()> {
        if self.session.is_internal(id) {
            return Ok(());
        }
        debug!(
            "Window 0x{:x} created at {:?} (override-redirect: {})",
            id, geometry, override_redirect
        );

        if override_redirect {
            self.conn.unredirect_window(id)?;
        } else {
            self.conn.watch_properties(id)?;
        }
        self.session
            .unpositioned
            .push(Client::new(id, geometry, override_redirect));

        Ok(())
    }

    fn handle_destroy(&mut self, id: Xid) -> Result<()> {
        // The server frees a destroyed window's damage object along with it
        if let Some(client) = self.session.remove_x_window(&self.conn, id)? {
            trace!("Dropped window 0x{:x} ({:?})", client.id, client.name);
        }

        Ok(())
    }

    fn handle_map_request(&mut self, id: Xid) -> Result<()> {
        let Some(location) = self.session.locate(id) else {
            debug!("Map request for unknown window 0x{:x}", id);
            return Ok(());
        };
        let screen = location.screen().unwrap_or(self.session.active_screen);

        let window_type = match self.session.client_mut(id) {
            Some(c) => {
                c.get_hints(&self.conn);
                c.window_type
            }
            None => return Ok(()),
        };

        let (workspace, assigned) = if window_type == WindowType::Desktop {
            self.session.move_window(id, Target::Ancillary(screen));
            (None, false)
        } else if let Some(ws) = location.workspace() {
            (Some(ws), false)
        } else {
            match self.session.screens[screen].first_free_workspace() {
                Some(ws) => {
                    self.session.move_window(id, Target::Workspace(screen, ws));
                    (Some(ws), true)
                }
                None => {
                    info!("No free workspace on screen {}, not mapping 0x{:x}", screen, id);
                    return Ok(());
                }
            }
        };

        let screen_geometry = self.session.screens[screen].geometry;
        if let Some(c) = self.session.client_mut(id) {
            if c.window_type == WindowType::Normal {
                c.position = screen_geometry;
            }
            c.show(&self.conn)?;
        }
        self.conn.set_wm_state(id, WmState::Normal)?;

        // A remap keeps its workspace and only takes focus if that one is visible
        if let Some(ws) = workspace {
            if assigned || ws == self.session.screens[screen].active_workspace {
                self.session.update_focus(&self.conn, screen, ws)?;
            } else if let Some(c) = self.session.client(id) {
                c.hide(&self.conn, &self.session.desktop_geometry)?;
            }
            if assigned {
                self.session.screens[screen].push_navigation(ws);
            }
        }
        self.session.repaint_all = true;

        Ok(())
    }

    fn handle_map_notify(&mut self, id: Xid) -> Result<()> {
        match self.session.client_mut(id) {
            Some(c) => c.init_composite(&self.conn),
            None => Ok(()),
        }
    }

    fn handle_unmap_notify(&mut self, id: Xid) -> Result<()> {
        // An unmap is often the first half of a destroy
        self.pull_events()?;
        let (destroys, rest) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition::<Vec<_>, _>(|e| matches!(e, XEvent::Destroy(_)));
        self.pending = rest.into();
        for event in destroys {
            if let Err(e) = self.handle_event(event) {
                warn!("Failed to handle a drained destroy: {:#}", e);
            }
        }

        if let Some(c) = self.session.client_mut(id) {
            c.reset_composite(&self.conn)?;
            if !c.override_redirect {
                self.conn.set_wm_state(id, WmState::Withdrawn)?;
            }
            self.session.repaint_all = true;
        }

        Ok(())
    }

    fn handle_configure_notify(&mut self, id: Xid, geometry: Geometry) -> Result<()> {
        if let Some(c) = self.session.client_mut(id) {
            c.real_position = geometry;
            self.session.repaint_all = true;
        }

        Ok(())
    }

    fn handle_configure_request(&mut self, id: Xid, changes: WindowChanges) -> Result<()> {
        let Some(c) = self.session.client_mut(id) else {
            trace!("Forwarding configure request for unmanaged 0x{:x}", id);
            return self.conn.configure_window(id, &changes);
        };

        changes.apply_to(&mut c.position);
        c.constrain_size(&self.conn);

        self.conn
            .configure_window(id, &changes.with_geometry(c.position))
    }

    fn handle_damage(&mut self, drawable: Xid, damage: Damage, area: Geometry) -> Result<()> {
        // Everything damaged since the last subtract, which may be more than `area`
        let repaired = self.conn.subtract_damage(damage)?;

        let Some((client, location)) = self.session.find_x_window(drawable) else {
            debug!("Damage for unrecognised drawable 0x{:x}", drawable);
            return Ok(());
        };
        let Some(screen) = location.screen() else {
            return Ok(());
        };

        let origin = self.session.screens[screen].geometry;
        let r = client.real_position;
        let (dx, dy) = (r.x - origin.x, r.y - origin.y);

        let scr = &mut self.session.screens[screen];
        for rect in std::iter::once(area).chain(repaired) {
            scr.add_damage(rect.translate(dx, dy));
        }
        self.session.damage_pending = true;

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent, pressed: bool) -> Result<()> {
        self.modifiers = key.state;
        if self.modifiers.track(key.keysym, pressed) {
            let overlay = self.modifiers.wants_overlay();
            if overlay != self.session.showing_overlay {
                self.session.showing_overlay = overlay;
                self.session.repaint_all = true;
            }
            return Ok(());
        }

        if !pressed {
            return Ok(());
        }
        let Some(action) = keyboard::resolve(self.modifiers, key.keysym) else {
            return Ok(());
        };
        debug!("Key 0x{:x} with {:?}: {:?}", key.keysym, self.modifiers, action);

        match action {
            KeyAction::Launch(letter) => match self.config.lookup(&format!("hotkey.{}", letter)) {
                Some(command) => {
                    self.launcher.spawn(command, self.session.active_screen)?;
                }
                None => debug!("Nothing bound to hotkey.{}", letter),
            },
            KeyAction::SelectWorkspace(ws) => self.session.select_workspace(&self.conn, ws)?,
            KeyAction::SelectScreen(screen) => self.session.select_screen(&self.conn, screen)?,
            KeyAction::Navigate(dir) => self.session.navigate(&self.conn, dir)?,
            KeyAction::Swap(dir) => self.session.swap_workspace(&self.conn, dir)?,
            KeyAction::CloseWindow => self.session.close_active_window(&self.conn)?,
        }

        Ok(())
    }

    fn handle_property(&mut self, id: Xid, atom: &str) -> Result<()> {
        let Some(c) = self.session.client_mut(id) else {
            return Ok(());
        };

        match atom {
            ewmh::NET_WM_NAME | ewmh::WM_NAME => c.update_name(&self.conn),
            ewmh::WM_HINTS => c.get_wm_hints(&self.conn),
            _ => {}
        }

        Ok(())
    }

    fn handle_error(&mut self, err: XError) -> Result<()> {
        match err.kind {
            XErrorKind::Access if err.major_opcode == CHANGE_WINDOW_ATTRIBUTES => {
                Err(WmError::AnotherWmRunning.into())
            }
            XErrorKind::Window => {
                debug!("BadWindow for 0x{:x}, dropping it", err.bad_value);
                self.handle_destroy(err.bad_value)
            }
            _ => {
                warn!("X error: {:?}", err);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::wm::display::Prop;
    use crate::wm::hints::WmHints;
    use crate::wm::keyboard::{keysym, ModifierState};
    use crate::wm::mock::{Call, MockDisplay, ROOT};
    use crate::wm::screen::WORKSPACE_COUNT;
    use crate::wm::session::Location;
    use nix::sys::wait::WaitStatus;
    use std::time::{Duration, Instant};

    const SCREEN: Geometry = Geometry {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    fn wm() -> WindowManager<MockDisplay> {
        wm_with(MockDisplay::default())
    }

    fn wm_with(conn: MockDisplay) -> WindowManager<MockDisplay> {
        WindowManager::new(conn, Config::default()).unwrap()
    }

    fn create(wm: &mut WindowManager<MockDisplay>, id: Xid) {
        wm.handle_event(XEvent::Create {
            id,
            geometry: Geometry::new(10, 10, 300, 200),
            override_redirect: false,
        })
        .unwrap();
    }

    fn create_and_map(wm: &mut WindowManager<MockDisplay>, id: Xid) {
        create(wm, id);
        wm.handle_event(XEvent::MapRequest(id)).unwrap();
        wm.handle_event(XEvent::MapNotify(id)).unwrap();
    }

    fn focus_calls(conn: &MockDisplay) -> Vec<Call> {
        conn.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Focus(_)))
            .collect()
    }

    fn press(wm: &mut WindowManager<MockDisplay>, state: ModifierState, sym: u32) {
        wm.handle_event(XEvent::KeyPress(KeyEvent { keysym: sym, state }))
            .unwrap();
    }

    #[test]
    fn created_windows_start_unpositioned() {
        let mut wm = wm();

        create(&mut wm, 1);

        assert_eq!(wm.session.locate(1), Some(Location::Unpositioned));
        assert!(wm.conn.calls().contains(&Call::WatchProperties(1)));
    }

    #[test]
    fn internal_windows_are_never_managed() {
        let mut wm = wm();
        let own = wm.session.screens[0].surfaces.as_ref().unwrap().window;

        create(&mut wm, own);
        wm.handle_event(XEvent::MapNotify(own)).unwrap();

        assert_eq!(wm.session.locate(own), None);
        assert!(wm.conn.calls().is_empty());
    }

    #[test]
    fn override_redirect_windows_are_tracked_and_unredirected() {
        let mut wm = wm();

        wm.handle_event(XEvent::Create {
            id: 1,
            geometry: Geometry::new(5, 5, 50, 50),
            override_redirect: true,
        })
        .unwrap();

        let (c, loc) = wm.session.find_x_window(1).unwrap();
        assert!(c.override_redirect);
        assert_eq!(loc, Location::Unpositioned);
        assert_eq!(wm.conn.calls(), vec![Call::Unredirect(1)]);
    }

    #[test]
    fn normal_windows_fill_the_first_free_workspace() {
        let mut wm = wm();
        create(&mut wm, 1);

        wm.handle_event(XEvent::MapRequest(1)).unwrap();

        let c = wm.session.client(1).unwrap();
        assert_eq!(c.window_type, WindowType::Normal);
        assert_eq!(c.position, SCREEN);
        assert_eq!(
            wm.session.locate(1),
            Some(Location::Workspace {
                screen: 0,
                workspace: 0
            })
        );
        let calls = wm.conn.calls();
        assert!(calls.contains(&Call::Configure(1, WindowChanges::from(SCREEN))));
        assert!(calls.contains(&Call::Map(1)));
        assert!(calls.contains(&Call::SetWmState(1, WmState::Normal)));
        assert_eq!(focus_calls(&wm.conn), vec![Call::Focus(1)]);
        assert_eq!(wm.session.screens[0].navigation_stack, vec![0]);
    }

    #[test]
    fn second_window_gets_its_own_workspace() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);

        create_and_map(&mut wm, 2);

        let scr = &wm.session.screens[0];
        assert_eq!(scr.active_workspace, 1);
        assert_eq!(scr.workspaces[1][0].id, 2);
        assert_eq!(scr.navigation_stack, vec![0, 1]);
        assert!(wm.conn.calls().contains(&Call::SetWindowX(1, 1920)));
    }

    #[test]
    fn desktop_windows_go_to_the_ancillary_list_without_focus() {
        let mut wm = wm();
        create(&mut wm, 1);
        wm.conn.set_prop(
            1,
            ewmh::NET_WM_WINDOW_TYPE,
            Prop::Atom(vec!["_NET_WM_WINDOW_TYPE_DESKTOP".into()]),
        );

        wm.handle_event(XEvent::MapRequest(1)).unwrap();

        assert_eq!(wm.session.locate(1), Some(Location::Ancillary { screen: 0 }));
        assert!(focus_calls(&wm.conn).is_empty());
        assert!(wm.conn.calls().contains(&Call::Map(1)));
        assert_eq!(wm.session.client(1).unwrap().position, Geometry::new(10, 10, 300, 200));
    }

    #[test]
    fn map_request_is_refused_when_every_workspace_is_taken() {
        let mut wm = wm();
        for id in 0..WORKSPACE_COUNT as Xid {
            create_and_map(&mut wm, 100 + id);
        }
        create(&mut wm, 1);
        wm.conn.clear_calls();

        wm.handle_event(XEvent::MapRequest(1)).unwrap();

        assert_eq!(wm.session.locate(1), Some(Location::Unpositioned));
        assert!(wm.conn.calls().iter().all(|c| !matches!(c, Call::Map(_) | Call::Focus(_))));
    }

    #[test]
    fn focus_skips_windows_refusing_input() {
        let mut wm = wm();
        create(&mut wm, 1);
        wm.conn
            .set_prop(1, ewmh::WM_HINTS, Prop::WmHints(WmHints { flags: 1, input: false }));

        wm.handle_event(XEvent::MapRequest(1)).unwrap();

        assert_eq!(focus_calls(&wm.conn), vec![Call::Focus(ROOT)]);
    }

    #[test]
    fn destroying_the_last_window_goes_back_in_history() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        create_and_map(&mut wm, 2);
        wm.conn.clear_calls();

        wm.handle_event(XEvent::Destroy(2)).unwrap();

        let scr = &wm.session.screens[0];
        assert_eq!(scr.active_workspace, 0);
        assert_eq!(scr.navigation_stack, vec![0]);
        assert_eq!(focus_calls(&wm.conn), vec![Call::Focus(1)]);
        assert_eq!(wm.session.locate(2), None);
        assert!(wm.session.repaint_all);
    }

    #[test]
    fn map_notify_acquires_render_resources() {
        let mut wm = wm();
        create(&mut wm, 1);

        wm.handle_event(XEvent::MapNotify(1)).unwrap();
        wm.handle_event(XEvent::MapNotify(1)).unwrap();

        assert!(wm.session.client(1).unwrap().composite().is_some());
        assert_eq!(wm.conn.count(|c| matches!(c, Call::CreateDamage(1))), 1);
    }

    #[test]
    fn unmap_releases_render_resources() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        wm.session.repaint_all = false;

        wm.handle_event(XEvent::UnmapNotify(1)).unwrap();

        assert!(wm.session.client(1).unwrap().composite().is_none());
        assert_eq!(wm.conn.count(|c| matches!(c, Call::DestroyDamage(_))), 1);
        assert!(wm.conn.calls().contains(&Call::SetWmState(1, WmState::Withdrawn)));
        assert!(wm.session.repaint_all);
    }

    #[test]
    fn unmap_handles_pending_destroys_first() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        create(&mut wm, 3);
        wm.conn.push_event(XEvent::MapNotify(3));
        wm.conn.push_event(XEvent::Destroy(1));
        wm.conn.clear_calls();

        wm.handle_event(XEvent::UnmapNotify(1)).unwrap();

        assert_eq!(wm.session.locate(1), None);
        assert_eq!(wm.conn.count(|c| matches!(c, Call::DestroyDamage(_))), 0);
        assert_eq!(wm.pending.len(), 1);
        assert_eq!(wm.pending[0], XEvent::MapNotify(3));
    }

    #[test]
    fn a_failing_drained_destroy_does_not_drop_the_rest() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        create_and_map(&mut wm, 2);
        create(&mut wm, 5);
        // Going back to window 1's workspace after 2 is gone fails
        wm.conn.refuse_requests(1);
        wm.conn.push_event(XEvent::Destroy(2));
        wm.conn.push_event(XEvent::Destroy(5));

        wm.handle_event(XEvent::UnmapNotify(9)).unwrap();

        assert_eq!(wm.session.locate(2), None);
        assert_eq!(wm.session.locate(5), None);
        assert!(wm.pending.is_empty());
    }

    #[test]
    fn remapping_on_a_background_workspace_keeps_the_user_where_they_are() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        create_and_map(&mut wm, 2);
        wm.handle_event(XEvent::UnmapNotify(1)).unwrap();
        wm.conn.clear_calls();

        wm.handle_event(XEvent::MapRequest(1)).unwrap();

        let scr = &wm.session.screens[0];
        assert_eq!(scr.active_workspace, 1);
        assert_eq!(scr.navigation_stack, vec![0, 1]);
        assert!(focus_calls(&wm.conn).is_empty());
        let calls = wm.conn.calls();
        assert!(calls.contains(&Call::SetWmState(1, WmState::Normal)));
        assert_eq!(calls.last(), Some(&Call::SetWindowX(1, 1920)));
    }

    #[test]
    fn remapping_on_the_active_workspace_refocuses() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        create_and_map(&mut wm, 2);
        wm.handle_event(XEvent::UnmapNotify(2)).unwrap();
        wm.conn.clear_calls();

        wm.handle_event(XEvent::MapRequest(2)).unwrap();

        assert_eq!(wm.session.screens[0].navigation_stack, vec![0, 1]);
        assert_eq!(focus_calls(&wm.conn), vec![Call::Focus(2)]);
        assert!(!wm.conn.calls().contains(&Call::SetWindowX(2, 1920)));
    }

    #[test]
    fn configure_notify_updates_the_real_position_only() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        wm.session.repaint_all = false;

        wm.handle_event(XEvent::ConfigureNotify {
            id: 1,
            geometry: Geometry::new(3, 4, 5, 6),
        })
        .unwrap();

        let c = wm.session.client(1).unwrap();
        assert_eq!(c.real_position, Geometry::new(3, 4, 5, 6));
        assert_eq!(c.position, SCREEN);
        assert!(wm.session.repaint_all);
    }

    #[test]
    fn configure_request_always_sets_position_and_size() {
        let mut wm = wm();
        create(&mut wm, 1);
        wm.conn.clear_calls();
        let changes = WindowChanges {
            width: Some(640),
            ..Default::default()
        };

        wm.handle_event(XEvent::ConfigureRequest { id: 1, changes }).unwrap();

        assert_eq!(
            wm.conn.calls(),
            vec![Call::Configure(1, WindowChanges::from(Geometry::new(10, 10, 640, 200)))]
        );
    }

    #[test]
    fn configure_request_respects_size_hints() {
        let mut wm = wm();
        create(&mut wm, 1);
        let mut raw = vec![0; 18];
        raw[0] = 1 << 4;
        raw[5] = 400;
        raw[6] = 300;
        let hints = crate::wm::hints::SizeHints::from_raw(&raw).unwrap();
        wm.conn.set_prop(1, ewmh::WM_NORMAL_HINTS, Prop::WmNormalHints(hints));
        wm.conn.clear_calls();
        let changes = WindowChanges {
            width: Some(100),
            height: Some(100),
            ..Default::default()
        };

        wm.handle_event(XEvent::ConfigureRequest { id: 1, changes }).unwrap();

        assert_eq!(
            wm.conn.calls(),
            vec![Call::Configure(1, WindowChanges::from(Geometry::new(10, 10, 400, 300)))]
        );
    }

    #[test]
    fn configure_requests_for_unknown_windows_are_forwarded() {
        let mut wm = wm();
        let changes = WindowChanges {
            x: Some(1),
            ..Default::default()
        };

        wm.handle_event(XEvent::ConfigureRequest { id: 77, changes }).unwrap();

        assert_eq!(wm.conn.calls(), vec![Call::Configure(77, changes)]);
    }

    #[test]
    fn damage_is_translated_to_screen_space() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        wm.handle_event(XEvent::ConfigureNotify {
            id: 1,
            geometry: Geometry::new(50, 30, 400, 400),
        })
        .unwrap();
        let damage = wm.session.client(1).unwrap().composite().unwrap().damage;
        wm.session.repaint_all = false;

        wm.handle_event(XEvent::Damage {
            drawable: 1,
            damage,
            area: Geometry::new(0, 0, 10, 10),
        })
        .unwrap();

        assert_eq!(wm.session.screens[0].damage, vec![Geometry::new(50, 30, 10, 10)]);
        assert!(wm.session.damage_pending);
        assert!(!wm.session.repaint_all);
        assert!(wm.conn.calls().contains(&Call::SubtractDamage(damage)));
    }

    #[test]
    fn damage_collected_before_the_subtract_is_kept() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        wm.handle_event(XEvent::ConfigureNotify {
            id: 1,
            geometry: Geometry::new(50, 30, 400, 400),
        })
        .unwrap();
        let damage = wm.session.client(1).unwrap().composite().unwrap().damage;
        wm.conn.set_repair(
            damage,
            vec![Geometry::new(0, 0, 10, 10), Geometry::new(100, 0, 20, 20)],
        );

        wm.handle_event(XEvent::Damage {
            drawable: 1,
            damage,
            area: Geometry::new(0, 0, 10, 10),
        })
        .unwrap();

        let screen_damage = &wm.session.screens[0].damage;
        assert!(screen_damage.contains(&Geometry::new(50, 30, 10, 10)));
        assert!(screen_damage.contains(&Geometry::new(150, 30, 20, 20)));
    }

    #[test]
    fn damage_on_a_secondary_screen_is_relative_to_it() {
        let mut wm = wm_with(MockDisplay::with_screens(vec![
            SCREEN,
            Geometry::new(1920, 0, 1280, 1024),
        ]));
        wm.session.active_screen = 1;
        create_and_map(&mut wm, 1);
        let damage = wm.session.client(1).unwrap().composite().unwrap().damage;
        wm.handle_event(XEvent::ConfigureNotify {
            id: 1,
            geometry: Geometry::new(1920, 0, 1280, 1024),
        })
        .unwrap();

        wm.handle_event(XEvent::Damage {
            drawable: 1,
            damage,
            area: Geometry::new(5, 5, 10, 10),
        })
        .unwrap();

        assert_eq!(wm.session.screens[1].damage, vec![Geometry::new(5, 5, 10, 10)]);
        assert!(wm.session.screens[0].damage.is_empty());
    }

    #[test]
    fn damage_for_unknown_or_unpositioned_windows_is_discarded() {
        let mut wm = wm();
        create(&mut wm, 1);

        for drawable in [1, 99] {
            wm.handle_event(XEvent::Damage {
                drawable,
                damage: 5,
                area: Geometry::new(0, 0, 10, 10),
            })
            .unwrap();
        }

        assert!(wm.session.screens[0].damage.is_empty());
        assert!(!wm.session.damage_pending);
        assert_eq!(wm.conn.count(|c| matches!(c, Call::SubtractDamage(5))), 2);
    }

    #[test]
    fn property_changes_refresh_the_name() {
        let mut wm = wm();
        create(&mut wm, 1);
        wm.conn
            .set_prop(1, ewmh::NET_WM_NAME, Prop::UTF8String(vec!["editor".into()]));

        wm.handle_event(XEvent::Property {
            id: 1,
            atom: ewmh::NET_WM_NAME.into(),
        })
        .unwrap();
        wm.handle_event(XEvent::Property {
            id: 2,
            atom: ewmh::NET_WM_NAME.into(),
        })
        .unwrap();

        assert_eq!(wm.session.client(1).unwrap().name, "editor");
    }

    #[test]
    fn bad_access_on_change_window_attributes_is_fatal() {
        let mut wm = wm();
        wm.queue_event(XEvent::Error(XError {
            kind: XErrorKind::Access,
            major_opcode: CHANGE_WINDOW_ATTRIBUTES,
            bad_value: ROOT,
        }));

        let err = wm.process_pending().unwrap_err();

        assert!(matches!(err.downcast_ref::<WmError>(), Some(WmError::AnotherWmRunning)));
    }

    #[test]
    fn bad_window_drops_the_window() {
        let mut wm = wm();
        create(&mut wm, 1);
        wm.queue_event(XEvent::Error(XError {
            kind: XErrorKind::Window,
            major_opcode: 12,
            bad_value: 1,
        }));
        wm.queue_event(XEvent::Error(XError {
            kind: XErrorKind::Other(8),
            major_opcode: 12,
            bad_value: 1,
        }));

        wm.process_pending().unwrap();

        assert_eq!(wm.session.locate(1), None);
    }

    #[test]
    fn overlay_follows_super_with_alt_or_control() {
        let mut wm = wm();
        wm.session.repaint_all = false;

        press(&mut wm, ModifierState::empty(), keysym::SUPER_L);
        assert!(!wm.session.showing_overlay);

        press(&mut wm, ModifierState::SUPER, keysym::ALT_L);
        assert!(wm.session.showing_overlay);
        assert!(wm.session.repaint_all);

        wm.handle_event(XEvent::KeyRelease(KeyEvent {
            keysym: keysym::ALT_L,
            state: ModifierState::SUPER | ModifierState::ALT,
        }))
        .unwrap();
        assert!(!wm.session.showing_overlay);
    }

    #[test]
    fn function_keys_select_workspaces() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        wm.conn.clear_calls();

        press(&mut wm, ModifierState::CONTROL, keysym::F1 + 2);

        assert_eq!(wm.session.screens[0].active_workspace, 14);
        assert_eq!(wm.session.screens[0].navigation_stack, vec![0, 14]);
        assert_eq!(focus_calls(&wm.conn), vec![Call::Focus(ROOT)]);
        assert!(wm.conn.calls().contains(&Call::SetWindowX(1, 1920)));
    }

    #[test]
    fn alt_f4_closes_the_front_window() {
        let mut wm = wm();
        create_and_map(&mut wm, 1);
        wm.conn.clear_calls();

        press(&mut wm, ModifierState::ALT, keysym::F4);

        assert_eq!(wm.conn.calls(), vec![Call::DeleteWindow(1)]);
    }

    #[test]
    fn bound_letters_launch_with_the_active_screen() {
        let config = Config::parse(
            r#"
[hotkey]
t = "test \"$VITRINE_HOTKEY_SCREEN\" = 1"

[launch]
screen_env = "VITRINE_HOTKEY_SCREEN"
"#,
        )
        .unwrap();
        let conn = MockDisplay::with_screens(vec![SCREEN, Geometry::new(1920, 0, 1280, 1024)]);
        let mut wm = WindowManager::new(conn, config).unwrap();
        wm.session.active_screen = 1;

        press(&mut wm, ModifierState::SUPER, 0x74);
        assert_eq!(wm.launcher.running(), 1);

        let mut statuses = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while wm.launcher.running() > 0 && Instant::now() < deadline {
            statuses.extend(wm.launcher.reap());
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(matches!(statuses.as_slice(), [WaitStatus::Exited(_, 0)]));
    }

    #[test]
    fn unbound_letters_do_nothing() {
        let mut wm = wm();

        press(&mut wm, ModifierState::SUPER, 0x71);

        assert_eq!(wm.launcher.running(), 0);
        assert!(wm.conn.calls().is_empty());
    }
}
