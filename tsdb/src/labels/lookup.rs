use async_trait::async_trait;

use super::cache::LabelCache;
use super::error::LabelError;
use super::id::LabelId;

/// The literal token that matches any value of its position in a query.
pub const WILDCARD_TOKEN: &str = "*";

/// The outcome of resolving a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Id(LabelId),
    /// The name imposes no constraint.
    Wildcard,
}

/// A policy for turning a label name into an id through a [`LabelCache`].
///
/// Which policy applies to metrics, tag keys and tag values is decided by
/// configuration; the resolvers themselves are interchangeable.
#[async_trait]
pub trait LookupStrategy: Send + Sync {
    async fn resolve(&self, cache: &LabelCache, name: &str) -> Result<Resolution, LabelError>;
}

/// Resolves existing labels only; an unknown name is an error.
pub struct StrictLookup;

#[async_trait]
impl LookupStrategy for StrictLookup {
    async fn resolve(&self, cache: &LabelCache, name: &str) -> Result<Resolution, LabelError> {
        match cache.get_id(name).await? {
            Some(id) => Ok(Resolution::Id(id)),
            None => Err(LabelError::NoSuchName {
                name: name.to_string(),
                kind: cache.kind(),
            }),
        }
    }
}

/// Resolves existing labels and creates unknown ones.
pub struct CreatingLookup;

#[async_trait]
impl LookupStrategy for CreatingLookup {
    async fn resolve(&self, cache: &LabelCache, name: &str) -> Result<Resolution, LabelError> {
        match cache.get_id(name).await? {
            Some(id) => Ok(Resolution::Id(id)),
            None => Ok(Resolution::Id(cache.create_id(name).await?)),
        }
    }
}

/// Treats the wildcard token as "no constraint" and everything else
/// strictly. The wildcard short-circuits without touching the cache.
pub struct WildcardLookup;

#[async_trait]
impl LookupStrategy for WildcardLookup {
    async fn resolve(&self, cache: &LabelCache, name: &str) -> Result<Resolution, LabelError> {
        if name == WILDCARD_TOKEN {
            return Ok(Resolution::Wildcard);
        }
        StrictLookup.resolve(cache, name).await
    }
}
