use super::id::{LabelId, LabelKind};

/// A change to the set of known labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelEvent {
    /// A label was durably created.
    Created {
        id: LabelId,
        name: String,
        kind: LabelKind,
    },
    /// A forward mapping was durably deleted (currently only through
    /// renames, which retire the old name).
    Deleted { name: String, kind: LabelKind },
}

/// Observer of label changes, invoked synchronously after the durable write
/// succeeds.
///
/// Subscribers (search indexers, metric reporters) are wired in by the
/// caller at construction time; there is no ambient global event bus.
pub trait LabelListener: Send + Sync {
    fn on_label_event(&self, event: &LabelEvent);
}
