//! Shared building blocks for tickdb services: a backend-agnostic key-value
//! storage abstraction and a mockable clock.

pub mod clock;
pub mod storage;
pub mod util;

pub use clock::Clock;
pub use storage::{Record, Storage, StorageError, StorageResult};
pub use util::BytesRange;
