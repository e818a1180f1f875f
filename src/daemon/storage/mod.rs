//!  Storage is organized through [store::KeyValueStore].
//!  The basic idea is:
//!   - There are two areas, `sync` for settings and day buckets, `local` for the weekly snapshot.
//!   - Each area is an opaque key-value document. [file_store::FileStore] keeps it on disk.
//!   - [repository] gives typed access to the few keys sitetally uses, degrading to empty state
//!     when something is missing or malformed.

pub mod entities;
pub mod file_store;
pub mod memory_store;
pub mod repository;
pub mod store;
