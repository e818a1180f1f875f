//! Read-side projections over the stored day buckets. Nothing in here touches tracking state or
//! writes to a store; the host and the CLI decide what to do with the results.

pub mod indicator;
pub mod range;
pub mod ranking;
pub mod summary;
pub mod weekly;
