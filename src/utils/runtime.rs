use anyhow::Result;

/// The host relies on a single thread so that every event is handled to completion before the
/// next one is looked at.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
