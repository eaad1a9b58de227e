// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The lease registry: identifiers and aliases mapped onto allocated chunks.

use crate::{Lease, LeaseError, LeaseId, LeaseInfo, ObjectPath};
use buddy_pool::{size_class_for, BuddyAllocator, PoolStats};
use std::collections::HashMap;

/// Owns the allocator and every live lease.
///
/// Each lease occupies one entry in the identifier map and, when it carries
/// an alias, one entry in the alias map. Both maps are updated together.
pub struct LeaseRegistry {
    allocator: BuddyAllocator,
    leases: HashMap<LeaseId, Lease>,
    aliases: HashMap<String, LeaseId>,
}

impl LeaseRegistry {
    /// Wraps a freshly built allocator.
    pub fn new(allocator: BuddyAllocator) -> Self {
        Self {
            allocator,
            leases: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Leases a range of at least `requested` ids.
    ///
    /// An empty `alias` means no alias. Either the whole operation succeeds
    /// or nothing changes: a taken alias is refused before the pool is
    /// touched.
    pub fn allocate(
        &mut self,
        requested: u64,
        alias: &str,
        persistent: bool,
    ) -> Result<&Lease, LeaseError> {
        let alias = if alias.is_empty() {
            None
        } else {
            validate_alias(alias)?;
            if self.aliases.contains_key(alias) {
                tracing::warn!("alias '{alias}' already leased");
                return Err(LeaseError::AliasInUse(alias.to_string()));
            }
            Some(alias.to_string())
        };

        let size_class = size_class_for(requested)?;
        let chunk = self.allocator.get(size_class)?;
        let start = self.allocator.tree()[chunk].start();

        let id = LeaseId::new(size_class, start);
        let lease = Lease {
            id: id.clone(),
            alias: alias.clone(),
            chunk,
            start,
            size_class,
            persistent,
        };
        tracing::info!(
            "lease {id} created: start {start:#x}, {} ids for a request of {requested}{}",
            lease.size(),
            alias.as_deref().map(|a| format!(", alias '{a}'")).unwrap_or_default()
        );

        if let Some(alias) = alias {
            self.aliases.insert(alias, id.clone());
        }
        let lease: &Lease = self.leases.entry(id).or_insert(lease);
        Ok(lease)
    }

    /// Releases the lease named by `id_or_alias` (identifier first, then alias).
    pub fn release(&mut self, id_or_alias: &str) -> Result<LeaseInfo, LeaseError> {
        let id = self.resolve_key(id_or_alias)?;
        self.release_id(id.as_str())
    }

    /// Releases the lease with exactly this identifier.
    pub fn release_id(&mut self, id: &str) -> Result<LeaseInfo, LeaseError> {
        let lease = self
            .leases
            .remove(id)
            .ok_or_else(|| LeaseError::NotFound(id.to_string()))?;
        if let Some(alias) = &lease.alias {
            self.aliases.remove(alias);
        }
        let info = lease.info();
        self.allocator.put(lease.chunk);
        tracing::info!("lease {} released: {} ids back to the pool", info.id, info.size);
        Ok(info)
    }

    /// Lease with exactly this identifier.
    pub fn by_id(&self, id: &str) -> Option<&Lease> {
        self.leases.get(id)
    }

    /// Lease holding this alias.
    pub fn by_alias(&self, alias: &str) -> Option<&Lease> {
        self.aliases.get(alias).and_then(|id| self.leases.get(id))
    }

    /// Looks up by identifier, then by alias.
    pub fn lookup(&self, id_or_alias: &str) -> Result<&Lease, LeaseError> {
        self.by_id(id_or_alias)
            .or_else(|| self.by_alias(id_or_alias))
            .ok_or_else(|| LeaseError::NotFound(id_or_alias.to_string()))
    }

    /// Lease reached through an object path. The manager path names no lease.
    pub fn resolve(&self, path: &ObjectPath) -> Result<&Lease, LeaseError> {
        match path {
            ObjectPath::Lease(id) => self
                .by_id(id)
                .ok_or_else(|| LeaseError::NotFound(id.clone())),
            ObjectPath::Alias(alias) => self
                .by_alias(alias)
                .ok_or_else(|| LeaseError::NotFound(alias.clone())),
            ObjectPath::Manager => Err(LeaseError::InvalidPath("manager object".into())),
        }
    }

    /// Releases the lease reached through an object path.
    pub fn release_path(&mut self, path: &ObjectPath) -> Result<LeaseInfo, LeaseError> {
        let id = self.resolve(path)?.id.clone();
        self.release_id(id.as_str())
    }

    /// Live leases ordered by start address.
    pub fn leases(&self) -> Vec<&Lease> {
        let mut all: Vec<&Lease> = self.leases.values().collect();
        all.sort_unstable_by_key(|l| l.start);
        all
    }

    /// Number of live leases.
    pub fn len(&self) -> usize {
        self.leases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }

    /// Allocator statistics.
    pub fn stats(&self) -> PoolStats {
        self.allocator.stats()
    }

    /// The underlying allocator.
    pub fn allocator(&self) -> &BuddyAllocator {
        &self.allocator
    }

    fn resolve_key(&self, id_or_alias: &str) -> Result<LeaseId, LeaseError> {
        if let Some(lease) = self.leases.get(id_or_alias) {
            return Ok(lease.id.clone());
        }
        if let Some(id) = self.aliases.get(id_or_alias) {
            tracing::debug!("alias '{id_or_alias}' resolves to lease {id}");
            return Ok(id.clone());
        }
        tracing::warn!("release of unknown lease '{id_or_alias}'");
        Err(LeaseError::NotFound(id_or_alias.to_string()))
    }
}

/// Aliases become path segments, so `/` and NUL are refused.
pub fn validate_alias(alias: &str) -> Result<(), LeaseError> {
    if alias.is_empty() || alias.contains(['/', '\0']) {
        return Err(LeaseError::InvalidAlias(alias.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_pool::{PoolConfig, PoolError};

    fn registry() -> LeaseRegistry {
        LeaseRegistry::new(BuddyAllocator::new(PoolConfig::new(0, 1023, 9)).unwrap())
    }

    #[test]
    fn test_allocate_rounds_up() {
        let mut reg = registry();
        let lease = reg.allocate(100, "", false).unwrap();
        assert_eq!(lease.size(), 128);
        assert_eq!(lease.start(), 0);
        assert_eq!(lease.id().as_str(), "08_0000000000000000");
        assert_eq!(lease.alias(), None);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_errors_from_pool() {
        let mut reg = registry();
        assert_eq!(
            reg.allocate(0, "", false).unwrap_err(),
            LeaseError::Pool(PoolError::InvalidSize)
        );
        assert!(matches!(
            reg.allocate(1 << 20, "", false).unwrap_err(),
            LeaseError::Pool(PoolError::SizeTooLarge { .. })
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_alias_lookup_and_release() {
        let mut reg = registry();
        let id = reg.allocate(10, "web", true).unwrap().id().clone();
        assert_eq!(reg.lookup("web").unwrap().id(), &id);
        assert_eq!(reg.lookup(id.as_str()).unwrap().alias(), Some("web"));
        assert!(reg.by_alias("web").unwrap().persistent());

        let info = reg.release("web").unwrap();
        assert_eq!(info.id, id);
        assert!(reg.by_alias("web").is_none());
        assert!(reg.by_id(id.as_str()).is_none());
        // The alias is free again.
        reg.allocate(10, "web", false).unwrap();
    }

    #[test]
    fn test_id_wins_over_alias() {
        let mut reg = registry();
        let first = reg.allocate(1, "", false).unwrap().id().clone();
        let second = reg.allocate(1, first.as_str(), false).unwrap().id().clone();
        assert_eq!(reg.lookup(first.as_str()).unwrap().id(), &first);
        reg.release(first.as_str()).unwrap();
        // With the id gone the alias is reachable.
        assert_eq!(reg.lookup(first.as_str()).unwrap().id(), &second);
    }

    #[test]
    fn test_invalid_alias() {
        let mut reg = registry();
        let before = reg.allocator().free_counts();
        for bad in ["a/b", "nul\0"] {
            assert_eq!(
                reg.allocate(1, bad, false).unwrap_err(),
                LeaseError::InvalidAlias(bad.to_string())
            );
        }
        assert_eq!(reg.allocator().free_counts(), before);
    }

    #[test]
    fn test_resolve_path() {
        let mut reg = registry();
        let id = reg.allocate(4, "db", false).unwrap().id().clone();
        assert_eq!(
            reg.resolve(&ObjectPath::Lease(id.to_string())).unwrap().id(),
            &id
        );
        assert_eq!(reg.resolve(&ObjectPath::Alias("db".into())).unwrap().id(), &id);
        assert!(matches!(
            reg.resolve(&ObjectPath::Manager),
            Err(LeaseError::InvalidPath(_))
        ));
        // Lease paths do not fall back to aliases.
        assert!(matches!(
            reg.resolve(&ObjectPath::Lease("db".into())),
            Err(LeaseError::NotFound(_))
        ));
        reg.release_path(&ObjectPath::Alias("db".into())).unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn test_leases_sorted_by_start() {
        let mut reg = registry();
        let big = reg.allocate(128, "", false).unwrap().start();
        let small = reg.allocate(1, "", false).unwrap().start();
        let mid = reg.allocate(16, "", false).unwrap().start();
        let starts: Vec<u64> = reg.leases().iter().map(|l| l.start()).collect();
        let mut expected = vec![big, small, mid];
        expected.sort_unstable();
        assert_eq!(starts, expected);
    }
}
