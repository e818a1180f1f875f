use anyhow::Result;
use module::EventProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info_span, trace, Instrument};

use super::protocol::HostEvent;

pub mod module;
pub mod router;
pub mod tracker;
pub mod weekly;

/// Consumer of the host's event queue. This is the only place events are handled, which is what
/// keeps tracker transitions and store writes from interleaving.
pub struct ProcessingModule<Processor> {
    receiver: Receiver<HostEvent>,
    processor: Processor,
}

impl<P: EventProcessor> ProcessingModule<P> {
    pub fn new(receiver: Receiver<HostEvent>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(event) = self.receiver.recv().await {
            debug!("Processing event {:?}", event);
            let span = info_span!("Processing event");
            match self
                .processor
                .process_next(event.clone())
                .instrument(span)
                .await
            {
                Ok(_) => {
                    trace!("Processed event {:?}", event)
                }
                Err(e) => {
                    error!("Error processing event {:?}: {e:?}", event)
                }
            }
        }

        let result = self.processor.finalize().await;
        self.receiver.close();
        result
    }
}
