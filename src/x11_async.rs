//! X11 connection readiness
//!
//! A mio poller on a blocking thread watches the X connection's file
//! descriptor and wakes the main loop when it becomes readable. Events are
//! read on the main loop, never here.

use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{oneshot, Notify};
use x11rb::rust_connection::RustConnection;

/// How often the poller checks whether the main loop has gone away
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

pub struct X11Readiness {
    notify: Arc<Notify>,
    /// Dropping this stops the poller thread
    _task_guard: oneshot::Receiver<()>,
}

impl X11Readiness {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        let fd = conn.stream().as_raw_fd();
        let notify = Arc::new(Notify::new());
        let task_notify = notify.clone();

        let (guard, task_guard) = oneshot::channel::<()>();
        let mut poll = mio::Poll::new().context("Failed to create mio Poll")?;
        let mut events = mio::Events::with_capacity(1);

        poll.registry()
            .register(
                &mut mio::unix::SourceFd(&fd),
                mio::Token(0),
                mio::Interest::READABLE,
            )
            .context("Failed to register X11 FD with mio")?;

        tokio::task::spawn_blocking(move || loop {
            if guard.is_closed() {
                tracing::info!("X11 socket polling thread shutting down");
                return;
            }

            if let Err(err) = poll.poll(&mut events, Some(POLL_TIMEOUT)) {
                tracing::warn!("X11 socket poll failed: {:?}", err);
                continue;
            }

            if events.iter().any(|event| event.token() == mio::Token(0)) {
                task_notify.notify_one();
            }
        });

        Ok(Self {
            notify,
            _task_guard: task_guard,
        })
    }

    /// Resolves once the connection has data to read. A wakeup that arrived
    /// while nobody was waiting is kept, so none are lost.
    pub async fn wait_readable(&self) {
        self.notify.notified().await;
    }
}
