//! Label identity and resolution.
//!
//! Labels map human-readable metric and tag names to compact 64-bit ids
//! with the label kind tagged in the low bits. Resolution goes through a
//! bounded bidirectional cache per kind, fronted by pluggable lookup
//! policies that decide whether an unknown name is an error, a creation, or
//! a wildcard.

pub mod cache;
pub mod error;
pub mod events;
pub mod id;
pub mod lookup;
pub mod validation;

pub use cache::LabelCache;
pub use error::LabelError;
pub use events::{LabelEvent, LabelListener};
pub use id::{generate_label_id, LabelId, LabelKind, KIND_MASK};
pub use lookup::{
    CreatingLookup, LookupStrategy, Resolution, StrictLookup, WildcardLookup, WILDCARD_TOKEN,
};
pub use validation::check_label_name;
