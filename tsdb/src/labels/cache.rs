use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info};
use lru::LruCache;

use super::error::LabelError;
use super::events::{LabelEvent, LabelListener};
use super::id::{LabelId, LabelKind};
use crate::metrics::{CacheCounters, CacheDirection, Metrics};
use crate::store::LabelStore;

/// The outstanding creation of one label, shared by every caller that asked
/// for it while it was in flight.
type PendingAssignment = Shared<BoxFuture<'static, Result<LabelId, LabelError>>>;

/// A bounded bidirectional name/id cache in front of the durable label store
/// for a single label kind.
///
/// The two directions are cached and evicted independently, so a name can be
/// resolvable while its id is not, and vice versa. Lookups that miss consult
/// the store and populate both directions on a hit. Absent labels are never
/// cached as negative entries.
///
/// Creation is deduplicated through a pending-assignment map: at most one
/// durable create is in flight per name, and concurrent callers for the same
/// name await the same outcome. The pending map's mutex never spans I/O.
#[derive(Clone)]
pub struct LabelCache {
    inner: Arc<Inner>,
}

struct Inner {
    kind: LabelKind,
    store: Arc<dyn LabelStore>,
    names: Mutex<LruCache<String, LabelId>>,
    ids: Mutex<LruCache<LabelId, String>>,
    pending: Mutex<HashMap<String, PendingAssignment>>,
    listeners: Vec<Arc<dyn LabelListener>>,
    name_counters: CacheCounters,
    id_counters: CacheCounters,
    created: prometheus_client::metrics::counter::Counter,
}

impl LabelCache {
    pub fn new(
        kind: LabelKind,
        store: Arc<dyn LabelStore>,
        capacity: NonZeroUsize,
        listeners: Vec<Arc<dyn LabelListener>>,
        metrics: &Metrics,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                kind,
                store,
                names: Mutex::new(LruCache::new(capacity)),
                ids: Mutex::new(LruCache::new(capacity)),
                pending: Mutex::new(HashMap::new()),
                listeners,
                name_counters: metrics.cache_counters(kind, CacheDirection::Names),
                id_counters: metrics.cache_counters(kind, CacheDirection::Ids),
                created: metrics.created_counter(kind),
            }),
        }
    }

    pub fn kind(&self) -> LabelKind {
        self.inner.kind
    }

    /// The id assigned to `name`, or `None` if no such label exists.
    pub async fn get_id(&self, name: &str) -> Result<Option<LabelId>, LabelError> {
        if let Some(id) = self.cached_id(name) {
            self.inner.name_counters.hits.inc();
            return Ok(Some(id));
        }
        self.inner.name_counters.misses.inc();

        match self.inner.store.get_id(name, self.inner.kind).await? {
            Some(id) => {
                self.inner.remember(name, id);
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// The name assigned to `id`, or `None` if no such label exists.
    pub async fn get_name(&self, id: LabelId) -> Result<Option<String>, LabelError> {
        if let Some(name) = self.cached_name(id) {
            self.inner.id_counters.hits.inc();
            return Ok(Some(name));
        }
        self.inner.id_counters.misses.inc();

        match self.inner.store.get_name(id, self.inner.kind).await? {
            Some(name) => {
                self.inner.remember(&name, id);
                Ok(Some(name))
            }
            None => Ok(None),
        }
    }

    /// True iff a label with this name exists.
    pub async fn check_exists(&self, name: &str) -> Result<bool, LabelError> {
        Ok(self.get_id(name).await?.is_some())
    }

    /// Durably creates a label for `name`, deduplicating concurrent calls.
    ///
    /// If a creation for the same name is already in flight the caller
    /// awaits its outcome instead of issuing a second durable create. The
    /// pending entry is removed once the create resolves, on success and on
    /// failure alike, so a later call after a failure reissues the create.
    pub async fn create_id(&self, name: &str) -> Result<LabelId, LabelError> {
        let assignment = {
            let mut pending = self.inner.pending.lock().unwrap();

            if let Some(outstanding) = pending.get(name) {
                debug!(
                    "Already waiting for an id to be assigned to the {} {:?}",
                    self.inner.kind, name
                );
                outstanding.clone()
            } else if let Some(id) = self.cached_id(name) {
                // Another path completed the creation while we were not
                // looking.
                return Ok(id);
            } else {
                let assignment = self.inner.clone().assign(name.to_string());
                pending.insert(name.to_string(), assignment.clone());
                // Drive the assignment to completion even if every caller
                // abandons its handle, so the pending entry is always
                // removed.
                tokio::spawn(assignment.clone());
                assignment
            }
        };

        assignment.await
    }

    /// Points the label behind `old_name` at `new_name`.
    ///
    /// Fails fast when the new name already resolves. The durable store is
    /// updated first; the cache only afterwards, so a failed write leaves
    /// the cache consistent with the store.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<(), LabelError> {
        if self.get_id(new_name).await?.is_some() {
            return Err(LabelError::NameTaken {
                name: new_name.to_string(),
                kind: self.inner.kind,
            });
        }

        let id = self
            .get_id(old_name)
            .await?
            .ok_or_else(|| LabelError::NoSuchName {
                name: old_name.to_string(),
                kind: self.inner.kind,
            })?;

        self.inner
            .store
            .rename_label(new_name, id, self.inner.kind)
            .await?;
        self.inner.store.delete_label(old_name, self.inner.kind).await?;

        {
            let mut names = self.inner.names.lock().unwrap();
            names.pop(old_name);
            names.push(new_name.to_string(), id);
        }
        {
            // Repoints the reverse mapping; this is the one place an id is
            // allowed to change names.
            let mut ids = self.inner.ids.lock().unwrap();
            ids.push(id, new_name.to_string());
        }

        let event = LabelEvent::Deleted {
            name: old_name.to_string(),
            kind: self.inner.kind,
        };
        for listener in &self.inner.listeners {
            listener.on_label_event(&event);
        }

        Ok(())
    }

    fn cached_id(&self, name: &str) -> Option<LabelId> {
        self.inner.names.lock().unwrap().get(name).copied()
    }

    fn cached_name(&self, id: LabelId) -> Option<String> {
        self.inner.ids.lock().unwrap().get(&id).cloned()
    }
}

impl Inner {
    /// Builds the shared future that performs one durable creation and its
    /// bookkeeping. The future owns an `Arc` to this cache so it can outlive
    /// the caller that started it.
    fn assign(self: Arc<Self>, name: String) -> PendingAssignment {
        async move {
            let result = self.store.create_label(&name, self.kind).await;

            {
                let mut pending = self.pending.lock().unwrap();
                pending.remove(&name);
            }

            let id = result?;
            self.remember(&name, id);
            self.created.inc();
            info!("Completed pending assignment of {} to the {} {:?}", id, self.kind, name);

            let event = LabelEvent::Created {
                id,
                name: name.clone(),
                kind: self.kind,
            };
            for listener in &self.listeners {
                listener.on_label_event(&event);
            }

            Ok(id)
        }
        .boxed()
        .shared()
    }

    /// Writes a confirmed mapping into both directions.
    ///
    /// A cached partner that disagrees with the store means the bijection
    /// between names and ids has been broken somewhere, which is a fatal
    /// consistency error and not something to paper over.
    fn remember(&self, name: &str, id: LabelId) {
        {
            let mut names = self.names.lock().unwrap();
            if let Some(existing) = names.peek(name) {
                assert!(
                    *existing == id,
                    "the {} {:?} is cached as {} but the store resolved it to {}",
                    self.kind,
                    name,
                    existing,
                    id
                );
            }
            if let Some((evicted, _)) = names.push(name.to_string(), id) {
                if evicted != name {
                    self.name_counters.evictions.inc();
                }
            }
        }
        {
            let mut ids = self.ids.lock().unwrap();
            if let Some(existing) = ids.peek(&id) {
                assert!(
                    existing == name,
                    "the {} id {} is cached as {:?} but the store resolved it to {:?}",
                    self.kind,
                    id,
                    existing,
                    name
                );
            }
            if let Some((evicted, _)) = ids.push(id, name.to_string()) {
                if evicted != id {
                    self.id_counters.evictions.inc();
                }
            }
        }
    }
}
