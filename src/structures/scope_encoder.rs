//! Concurrent scope id assignment
//!
//! Maps opaque scope identifiers (cache partitions, tenants) to dense
//! integer ids small enough to be packed into a tag next to the
//! fingerprint. Ids are handed out in first-seen order starting at 0 and
//! are never reassigned or removed.

use std::hash::Hash;

use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::config::{ScopeConfig, MAX_FIELD_BITS};
use crate::core::error::{Error, Result};

/// Bijective, append-only mapping between scopes and scope ids.
///
/// Lookups on both directions go straight to the concurrent maps. Only the
/// first `encode` of a new scope takes the assignment lock.
pub struct ScopeEncoder<S: Eq + Hash + Clone> {
    bits_per_scope: usize,
    max_num_scopes: u64,
    scope_to_id: DashMap<S, u32, RandomState>,
    id_to_scope: DashMap<u32, S, RandomState>,
    /// Next id to hand out. Guards all inserts.
    next_id: Mutex<u64>,
}

impl<S: Eq + Hash + Clone> ScopeEncoder<S> {
    /// Create an encoder whose ids fit in `bits_per_scope` bits.
    pub fn new(bits_per_scope: usize) -> Result<Self> {
        if bits_per_scope == 0 || bits_per_scope > MAX_FIELD_BITS {
            return Err(Error::invalid_shape(format!(
                "bits_per_scope must be in 1..={}, got {}",
                MAX_FIELD_BITS, bits_per_scope
            )));
        }
        Ok(Self {
            bits_per_scope,
            max_num_scopes: 1u64 << bits_per_scope,
            scope_to_id: DashMap::with_hasher(RandomState::new()),
            id_to_scope: DashMap::with_hasher(RandomState::new()),
            next_id: Mutex::new(0),
        })
    }

    /// Create an encoder from configuration.
    pub fn from_config(config: &ScopeConfig) -> Result<Self> {
        Self::new(config.bits_per_scope)
    }

    /// Return the id of `scope`, assigning the next free id on first sight.
    ///
    /// Fails with [`Error::ScopeOverflow`] once every id representable in
    /// `bits_per_scope` bits has been assigned; scopes that already have an
    /// id keep encoding successfully.
    pub fn encode(&self, scope: &S) -> Result<u32> {
        if let Some(id) = self.scope_to_id.get(scope) {
            return Ok(*id);
        }

        let mut next_id = self.next_id.lock();
        // another thread may have assigned it while we waited
        if let Some(id) = self.scope_to_id.get(scope) {
            return Ok(*id);
        }
        if *next_id >= self.max_num_scopes {
            warn!(max_scopes = self.max_num_scopes, "scope ids exhausted, rejecting new scope");
            return Err(Error::ScopeOverflow { max_scopes: self.max_num_scopes });
        }

        // fits: next_id < 2^bits_per_scope <= 2^32
        let id = *next_id as u32;
        // reverse entry first so any id visible through encode decodes
        self.id_to_scope.insert(id, scope.clone());
        self.scope_to_id.insert(scope.clone(), id);
        *next_id += 1;
        debug!(id, "assigned scope id");
        Ok(id)
    }

    /// Scope that was assigned `id`, if any.
    pub fn decode(&self, id: u32) -> Option<S> {
        self.id_to_scope.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of scopes assigned so far.
    pub fn len(&self) -> usize {
        self.scope_to_id.len()
    }

    /// Whether no scope has been encoded yet.
    pub fn is_empty(&self) -> bool {
        self.scope_to_id.is_empty()
    }

    /// Width of a scope id in bits.
    pub fn bits_per_scope(&self) -> usize {
        self.bits_per_scope
    }

    /// Number of distinct scopes this encoder can represent.
    pub fn max_num_scopes(&self) -> u64 {
        self.max_num_scopes
    }
}

impl<S: Eq + Hash + Clone> std::fmt::Debug for ScopeEncoder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeEncoder")
            .field("bits_per_scope", &self.bits_per_scope)
            .field("len", &self.len())
            .finish()
    }
}
