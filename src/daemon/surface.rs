//! Outgoing side of the host: the sinks the tracker and the reporter publish to, and the writer
//! that serializes them for the extension.

use anyhow::{anyhow, Result};
use futures::{stream, StreamExt};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    select,
    sync::{broadcast, mpsc},
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::report::indicator::Badge;

use super::{
    protocol::{HostMessage, Notification},
    storage::store::StoreChange,
};

#[cfg_attr(test, mockall::automock)]
pub trait Indicator {
    fn set_badge(&self, badge: &Badge);
}

/// Fire-and-forget delivery of user facing alerts.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Cloneable handle queueing [HostMessage]s for the [HostWriter].
#[derive(Clone)]
pub struct HostChannel {
    sender: mpsc::UnboundedSender<HostMessage>,
}

impl HostChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn send(&self, message: HostMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|e| anyhow!("Host output is closed, dropped {:?}", e.0))
    }
}

impl Indicator for HostChannel {
    fn set_badge(&self, badge: &Badge) {
        let message = HostMessage::SetBadge {
            text: badge.text.clone(),
            color: badge.color.map(str::to_owned),
        };
        if let Err(e) = self.send(message) {
            warn!("Badge update lost: {e}");
        }
    }
}

impl Notifier for HostChannel {
    fn notify(&self, notification: &Notification) -> Result<()> {
        self.send(HostMessage::Notify(notification.clone()))
    }
}

/// Writes queued messages as json lines. Stops once every [HostChannel] is gone.
pub struct HostWriter<W> {
    output: W,
    receiver: mpsc::UnboundedReceiver<HostMessage>,
}

impl<W: AsyncWrite + Unpin> HostWriter<W> {
    pub fn new(output: W, receiver: mpsc::UnboundedReceiver<HostMessage>) -> Self {
        Self { output, receiver }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(message) = self.receiver.recv().await {
            debug!("Sending {message:?}");
            let mut line = serde_json::to_vec(&message)?;
            line.push(b'\n');
            self.output
                .write_all(&line)
                .await
                .inspect_err(|e| error!("Failed to write to the extension {e:?}"))?;
            self.output.flush().await?;
        }
        Ok(())
    }
}

/// Tells the extension about store writes so open surfaces can refresh.
pub struct ChangeForwarder {
    changes: Vec<broadcast::Receiver<StoreChange>>,
    channel: HostChannel,
    shutdown: CancellationToken,
}

impl ChangeForwarder {
    pub fn new(
        changes: Vec<broadcast::Receiver<StoreChange>>,
        channel: HostChannel,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            changes,
            channel,
            shutdown,
        }
    }

    pub async fn run(self) -> Result<()> {
        let mut changes = stream::select_all(self.changes.into_iter().map(BroadcastStream::new));
        loop {
            let change = select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                change = changes.next() => change,
            };
            match change {
                Some(Ok(change)) => {
                    if self.channel.send(HostMessage::StorageChanged(change)).is_err() {
                        return Ok(());
                    }
                }
                Some(Err(e)) => warn!("Missed store changes: {e}"),
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::report::indicator::GOOD_COLOR;

    #[tokio::test]
    async fn test_writer_emits_json_lines() -> Result<()> {
        let (channel, receiver) = HostChannel::new();
        let mut output = Vec::<u8>::new();

        channel.set_badge(&Badge {
            text: "60%".into(),
            color: Some(GOOD_COLOR),
        });
        channel.notify(&Notification {
            title: "Settings Saved".into(),
            message: "Done".into(),
            context_message: None,
        })?;
        drop(channel);

        HostWriter::new(&mut output, receiver).run().await?;

        let text = String::from_utf8(output)?;
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r##"{"type":"setBadge","text":"60%","color":"#4CAF50"}"##
        );
        assert!(lines[1].starts_with(r#"{"type":"notify","title":"Settings Saved""#));
        Ok(())
    }

    #[tokio::test]
    async fn test_forwarder_stops_on_shutdown() -> Result<()> {
        let (sender, _) = broadcast::channel(4);
        let (channel, mut receiver) = HostChannel::new();
        let shutdown = CancellationToken::new();

        let forwarder = ChangeForwarder::new(vec![sender.subscribe()], channel, shutdown.clone());
        sender.send(StoreChange {
            area: crate::daemon::storage::store::StoreArea::Sync,
            keys: vec!["timeData".into()],
        })?;

        let (result, message) = tokio::join!(forwarder.run(), async {
            let message = receiver.recv().await;
            shutdown.cancel();
            message
        });
        result?;
        assert!(matches!(message, Some(HostMessage::StorageChanged(_))));
        Ok(())
    }
}
