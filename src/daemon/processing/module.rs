use anyhow::Result;

use crate::daemon::protocol::HostEvent;

/// Represents an event processor. Every queued [HostEvent] is handed over one at a time, the next
/// one only after the previous future completed.
pub trait EventProcessor {
    fn process_next(&mut self, event: HostEvent) -> impl std::future::Future<Output = Result<()>>;

    /// Called once the queue is closed and drained.
    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
