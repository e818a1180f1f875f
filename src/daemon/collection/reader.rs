use anyhow::Result;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    select,
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::daemon::protocol::{BrowserEvent, HostEvent};

/// Reads extension signals, one json object per line, and queues them for processing.
///
/// The extension closing its end of the pipe means the browser is gone, so end of input cancels
/// the whole host.
pub struct EventReader<R> {
    input: R,
    next: mpsc::Sender<HostEvent>,
    shutdown: CancellationToken,
}

impl<R: AsyncBufRead + Unpin> EventReader<R> {
    pub fn new(input: R, next: mpsc::Sender<HostEvent>, shutdown: CancellationToken) -> Self {
        Self {
            input,
            next,
            shutdown,
        }
    }

    /// Executes the reader event loop.
    ///
    /// Lines are read as raw bytes. A line that isn't utf-8 or isn't a known event is logged and
    /// skipped, only end of input or a failing read stops the loop.
    pub async fn run(self) -> Result<()> {
        let Self {
            mut input,
            next,
            shutdown,
        } = self;
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = select! {
                _ = shutdown.cancelled() => return Ok(()),
                read = input.read_until(b'\n', &mut line) => read,
            };

            match read {
                Ok(0) => {
                    info!("Extension closed the input, shutting down");
                    shutdown.cancel();
                    return Ok(());
                }
                Ok(_) => (),
                Err(e) => {
                    error!("Failed to read extension input {e:?}");
                    shutdown.cancel();
                    return Err(e.into());
                }
            }

            if line.trim_ascii().is_empty() {
                continue;
            }

            match serde_json::from_slice::<BrowserEvent>(&line) {
                Ok(event) => {
                    let span = info_span!("Queueing browser event");
                    debug!("Sending message {:?}", event);
                    if next
                        .send(HostEvent::Browser(event))
                        .instrument(span)
                        .await
                        .is_err()
                    {
                        // Processing is gone, nothing left to feed.
                        return Ok(());
                    }
                }
                Err(e) => warn!(
                    "Ignoring malformed event {:?}: {e}",
                    String::from_utf8_lossy(line.trim_ascii())
                ),
            }
        }
    }
}
