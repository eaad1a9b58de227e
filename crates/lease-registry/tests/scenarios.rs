// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! End-to-end lease scenarios against the default pool.

use buddy_pool::{BuddyAllocator, PoolConfig, PoolError};
use lease_registry::{LeaseError, LeaseProperty, LeaseRegistry, PathScheme, PropertyValue};

const POOL_START: u64 = 1 << 31;

fn registry() -> LeaseRegistry {
    LeaseRegistry::new(BuddyAllocator::new(PoolConfig::default()).unwrap())
}

#[test]
fn two_small_leases_coalesce_back_to_root() {
    let mut reg = registry();

    let a = reg.allocate(100, "", false).unwrap();
    assert_eq!(a.size_class(), 8);
    assert_eq!(a.start(), POOL_START);
    assert_eq!(a.size(), 128);
    let a = a.id().clone();

    let b = reg.allocate(100, "", false).unwrap();
    assert_eq!(b.start(), POOL_START + 128);
    let b = b.id().clone();

    reg.release(a.as_str()).unwrap();
    reg.release(b.as_str()).unwrap();

    let pool = reg.allocator();
    assert_eq!(pool.free_blocks(28), 16);
    for class in 1..28 {
        assert_eq!(pool.free_blocks(class), 0, "class {class}");
    }
    let root = pool.chunk(pool.tree().roots()[0]).unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.start(), POOL_START);
}

#[test]
fn duplicate_alias_leaves_pool_untouched() {
    let mut reg = registry();
    reg.allocate(1000, "web", false).unwrap();
    let counts = reg.allocator().free_counts();
    let stats = reg.stats();

    assert_eq!(
        reg.allocate(1000, "web", false).unwrap_err(),
        LeaseError::AliasInUse("web".into())
    );
    assert_eq!(reg.allocator().free_counts(), counts);
    assert_eq!(reg.stats(), stats);
    assert_eq!(reg.len(), 1);
}

#[test]
fn unknown_release_changes_nothing() {
    let mut reg = registry();
    reg.allocate(7, "", false).unwrap();
    let counts = reg.allocator().free_counts();

    assert_eq!(
        reg.release("1c_0000000000000000").unwrap_err(),
        LeaseError::NotFound("1c_0000000000000000".into())
    );
    assert_eq!(reg.allocator().free_counts(), counts);
    assert_eq!(reg.len(), 1);
}

#[test]
fn release_by_alias_frees_both_names() {
    let mut reg = registry();
    let id = reg.allocate(64, "ci", true).unwrap().id().clone();
    let info = reg.release("ci").unwrap();
    assert_eq!(info.id, id);
    assert!(info.persistent);
    assert!(reg.lookup(id.as_str()).is_err());
    assert!(reg.lookup("ci").is_err());
    assert_eq!(reg.stats().allocated_ids, 0);
}

#[test]
fn exhausting_the_pool() {
    let mut reg = registry();
    for _ in 0..16 {
        reg.allocate(1 << 27, "", false).unwrap();
    }
    assert_eq!(
        reg.allocate(1, "", false).unwrap_err(),
        LeaseError::Pool(PoolError::PoolExhausted { size_class: 1 })
    );
    assert_eq!(reg.stats().free_ids, 0);
}

#[test]
fn properties_through_paths() {
    let mut reg = registry();
    let paths = PathScheme::default();
    let id = reg.allocate(300, "db", false).unwrap().id().clone();

    let by_alias = paths.parse("/uidalloc/aliases/db").unwrap();
    let lease = reg.resolve(&by_alias).unwrap();
    assert_eq!(lease.property(LeaseProperty::Size), PropertyValue::U64(512));
    assert_eq!(
        lease.property(LeaseProperty::End),
        PropertyValue::U64(POOL_START + 511)
    );
    assert_eq!(
        lease.property(LeaseProperty::Id),
        PropertyValue::Str(id.to_string())
    );

    let by_id = paths.parse(&paths.lease_path(&id)).unwrap();
    reg.release_path(&by_id).unwrap();
    assert!(reg.is_empty());
}
