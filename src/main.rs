//! Vitrine - compositing tiled-workspace window manager
//!
//! Every client window fills its screen; each screen has 24 workspaces laid
//! out as a 12x2 grid, composed with XRender and browsable through a
//! thumbnail overview.

mod compositor;
mod config;
mod shared;
mod spawn;
mod wm;
mod x11_async;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::wm::display::DisplayConn;
use crate::wm::x11::X11Display;
use crate::wm::WindowManager;
use crate::x11_async::X11Readiness;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "vitrine=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vitrine");

    let config = config::Config::load().context("Failed to load configuration")?;
    info!("{} hotkey(s) bound", config.hotkey.len());

    // Launched commands start in the home directory
    if let Some(home) = dirs::home_dir() {
        if let Err(e) = std::env::set_current_dir(&home) {
            warn!("Failed to change to {:?}: {}", home, e);
        }
    }

    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
    let conn = Arc::new(conn);
    let readiness = X11Readiness::new(&conn).context("Failed to watch the X11 connection")?;

    let display = X11Display::new(conn, screen_num)?;
    let mut wm = WindowManager::new(display, config).context("Failed to set up screens")?;

    let mut sigchld = signal(SignalKind::child())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("Starting main event loop");
    loop {
        wm.pull_events()?;
        if wm.has_pending() {
            wm.process_pending()?;
            continue;
        }

        wm.repaint()?;
        wm.reap_children();
        wm.conn.flush()?;

        tokio::select! {
            () = readiness.wait_readable() => {}
            _ = sigchld.recv() => wm.reap_children(),
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                break;
            }
        }
    }

    Ok(())
}
