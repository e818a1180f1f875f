use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancels `cancelation` on ctrl-c. Returns as soon as the token is cancelled, whoever did it.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
