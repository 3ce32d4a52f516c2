use std::collections::HashMap;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tenancy_security::{TenantContext, TenantId};
use tracing::{debug, trace};

use crate::error::CacheError;

/// Process-wide cache holding one key/value partition per tenant.
///
/// Safe to share across tasks behind an `Arc`. A disabled cache misses on
/// every read and drops every write, so callers need no special casing.
#[derive(Debug)]
pub struct LocalCache {
    enabled: bool,
    partitions: DashMap<TenantId, HashMap<String, Vec<u8>>>,
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::with_enabled(false)
    }

    #[must_use]
    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            partitions: DashMap::new(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decode the value stored under `key` for `tenant`, if any.
    ///
    /// # Errors
    /// `CacheError::Corrupted` if the stored bytes are not a `T`.
    pub fn get<T: DeserializeOwned>(&self, tenant: &TenantId, key: &str) -> Result<Option<T>, CacheError> {
        if !self.enabled {
            return Ok(None);
        }
        let Some(partition) = self.partitions.get(tenant) else {
            trace!(tenant = %tenant, key, "cache miss (no partition)");
            return Ok(None);
        };
        let Some(bytes) = partition.get(key) else {
            trace!(tenant = %tenant, key, "cache miss");
            return Ok(None);
        };
        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|source| CacheError::Corrupted {
                key: key.to_owned(),
                source,
            })
    }

    /// Store `value` under `key` for `tenant`, creating the partition on first use.
    ///
    /// # Errors
    /// `CacheError::Serialize` if `value` cannot be encoded.
    pub fn set<T: Serialize + ?Sized>(&self, tenant: &TenantId, key: &str, value: &T) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }
        let bytes = serde_json::to_vec(value).map_err(|source| CacheError::Serialize {
            key: key.to_owned(),
            source,
        })?;
        self.partitions
            .entry(tenant.clone())
            .or_default()
            .insert(key.to_owned(), bytes);
        trace!(tenant = %tenant, key, "cache set");
        Ok(())
    }

    /// The cached value, or `T::default()` which is stored before being returned.
    ///
    /// # Errors
    /// See [`get`](Self::get) and [`set`](Self::set).
    pub fn get_or_default<T>(&self, tenant: &TenantId, key: &str) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        if let Some(value) = self.get(tenant, key)? {
            return Ok(value);
        }
        let value = T::default();
        self.set(tenant, key, &value)?;
        Ok(value)
    }

    /// Drop one key. Returns whether it was present.
    pub fn invalidate(&self, tenant: &TenantId, key: &str) -> bool {
        self.partitions
            .get_mut(tenant)
            .is_some_and(|mut partition| partition.remove(key).is_some())
    }

    /// Drop a tenant's whole partition.
    pub fn clear_tenant(&self, tenant: &TenantId) {
        if self.partitions.remove(tenant).is_some() {
            debug!(tenant = %tenant, "cache partition cleared");
        }
    }

    /// Number of keys held for `tenant`.
    #[must_use]
    pub fn len(&self, tenant: &TenantId) -> usize {
        self.partitions.get(tenant).map_or(0, |p| p.len())
    }

    #[must_use]
    pub fn is_empty(&self, tenant: &TenantId) -> bool {
        self.len(tenant) == 0
    }

    /// View bound to the tenant of `ctx`.
    ///
    /// # Errors
    /// `CacheError::MissingTenant` if the context has no tenant.
    pub fn for_context(&self, ctx: &TenantContext) -> Result<TenantCache<'_>, CacheError> {
        Ok(TenantCache {
            cache: self,
            tenant: ctx.resolve()?.clone(),
        })
    }
}

/// [`LocalCache`] operations for one tenant.
#[derive(Debug)]
pub struct TenantCache<'a> {
    cache: &'a LocalCache,
    tenant: TenantId,
}

impl TenantCache<'_> {
    #[must_use]
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// # Errors
    /// See [`LocalCache::get`].
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        self.cache.get(&self.tenant, key)
    }

    /// # Errors
    /// See [`LocalCache::set`].
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.cache.set(&self.tenant, key, value)
    }

    /// # Errors
    /// See [`LocalCache::get_or_default`].
    pub fn get_or_default<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        self.cache.get_or_default(&self.tenant, key)
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.cache.invalidate(&self.tenant, key)
    }
}
