//! Window Manager Module
//!
//! The session model, the event dispatcher that keeps it in step with the X
//! server, and the application context tying them to the compositor.

pub mod client;
pub mod display;
pub mod event;
pub mod events;
pub mod ewmh;
pub mod focus;
pub mod hints;
pub mod keyboard;
pub mod screen;
pub mod session;
pub mod x11;

#[cfg(test)]
pub mod mock;

use anyhow::Result;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{error, info};

use crate::compositor::overview::WorkspaceGrid;
use crate::compositor::Compositor;
use crate::config::Config;
use crate::spawn::Launcher;
use crate::wm::display::DisplayConn;
use crate::wm::event::XEvent;
use crate::wm::keyboard::ModifierState;
use crate::wm::screen::Screen;
use crate::wm::session::Session;

/// Conditions the window manager cannot run under
#[derive(Debug, Error)]
pub enum WmError {
    #[error("another window manager is already running")]
    AnotherWmRunning,
    #[error("the {0} extension is not available")]
    MissingExtension(&'static str),
    #[error("the {name} extension is version {major}.{minor}, {required} or newer is required")]
    ExtensionTooOld {
        name: &'static str,
        major: u32,
        minor: u32,
        required: &'static str,
    },
    #[error("no render format for the visual of window 0x{0:x}")]
    NoVisualFormat(u32),
}

/// The application context: one per process, passed to everything that
/// needs the session or the display.
pub struct WindowManager<D: DisplayConn> {
    pub conn: D,
    pub session: Session,
    config: Config,
    compositor: Compositor,
    launcher: Launcher,
    modifiers: ModifierState,
    /// Events pulled from the connection but not yet handled
    pending: VecDeque<XEvent>,
}

impl<D: DisplayConn> WindowManager<D> {
    /// Build the session from the display's screens
    pub fn new(conn: D, config: Config) -> Result<Self> {
        let mut session = Session::new();
        for geometry in conn.screen_geometries()? {
            let surfaces = conn.create_screen_surfaces(geometry)?;
            session.add_screen(Screen::with_surfaces(geometry, surfaces));
        }
        info!(
            "Managing {} screen(s), desktop {:?}",
            session.screens.len(),
            session.desktop_geometry
        );

        let compositor = Compositor::new(
            Box::new(WorkspaceGrid),
            config.compositor.partial_damage_clip,
        );
        let launcher = Launcher::new(config.launch.screen_env.clone());

        Ok(Self {
            conn,
            session,
            config,
            compositor,
            launcher,
            modifiers: ModifierState::default(),
            pending: VecDeque::new(),
        })
    }

    /// Move every event the connection already has into the queue
    pub fn pull_events(&mut self) -> Result<()> {
        while let Some(event) = self.conn.poll_event()? {
            self.pending.push_back(event);
        }

        Ok(())
    }

    pub fn queue_event(&mut self, event: XEvent) {
        self.pending.push_back(event);
    }

    /// Handle queued events in order. Fatal conditions end the loop; any other
    /// handler failure is logged and the next event is processed.
    pub fn process_pending(&mut self) -> Result<()> {
        while let Some(event) = self.pending.pop_front() {
            if let Err(e) = self.handle_event(event) {
                if e.downcast_ref::<WmError>().is_some() {
                    return Err(e);
                }
                error!("Event handler failed: {:#}", e);
            }
        }

        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Repaint if anything is stale
    pub fn repaint(&mut self) -> Result<()> {
        if Compositor::needs_repaint(&self.session) {
            self.compositor.paint(&self.conn, &mut self.session)?;
        }

        Ok(())
    }

    /// Collect exited hotkey commands
    pub fn reap_children(&mut self) {
        self.launcher.reap();
    }
}
