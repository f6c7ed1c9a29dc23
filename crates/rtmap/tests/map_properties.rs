// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Randomized operation sequences checked against std's HashMap.
//
// Each run drives a MapStore and a HashMap with the same insert / update /
// delete stream and compares length, contents and traversal after every
// step. Seeds are fixed so failures reproduce.

#![allow(clippy::float_cmp)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::missing_panics_doc)]

use rtmap::layout::align_to;
use rtmap::types::{builtin, TypeBuilder};
use rtmap::{Kind, MapStore, TypeRef};
use std::collections::{HashMap, HashSet};

fn p<T>(v: &T) -> *const u8 {
    (v as *const T).cast()
}

fn u32_u64_map() -> TypeRef {
    TypeBuilder::map(builtin(Kind::Uint32).unwrap(), builtin(Kind::Uint64).unwrap())
        .build()
        .unwrap()
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_ne_bytes(bytes[..4].try_into().unwrap())
}

fn read_u64(bytes: &[u8]) -> u64 {
    u64::from_ne_bytes(bytes[..8].try_into().unwrap())
}

fn check_against_model(store: &MapStore, model: &HashMap<u32, u64>) {
    assert_eq!(store.len(), model.len());

    // Iteration completeness: every live entry exactly once.
    let mut seen = HashSet::new();
    for entry in store.iter() {
        let key = read_u32(entry.key_bytes());
        assert!(seen.insert(key), "key {} visited twice", key);
        assert_eq!(Some(&read_u64(entry.value_bytes())), model.get(&key));
    }
    assert_eq!(seen.len(), model.len());

    for (key, value) in model {
        // SAFETY: key is a local u32.
        let slot = unsafe { store.lookup(p(key)) }.unwrap().unwrap();
        // SAFETY: slot points at an 8-byte value in a live entry.
        let stored = unsafe { std::ptr::read_unaligned(slot.as_ptr().cast::<u64>()) };
        assert_eq!(stored, *value);
    }
}

#[test]
fn randomized_sequences_match_model() {
    for seed in [1u64, 7, 42, 2026] {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut store = MapStore::new(u32_u64_map()).unwrap();
        let mut model: HashMap<u32, u64> = HashMap::new();

        for _ in 0..400 {
            // Small key space so updates and deletes hit existing keys.
            let key = rng.u32(..64);
            if rng.u8(..10) < 7 {
                let value = rng.u64(..);
                // SAFETY: key and value are locals of the descriptor's types.
                unsafe { store.assign(p(&key), Some(p(&value))).unwrap() };
                model.insert(key, value);
            } else {
                // SAFETY: key is a local u32.
                let removed = unsafe { store.delete(p(&key)) }.unwrap();
                assert_eq!(removed, model.remove(&key).is_some());
            }
            assert_eq!(store.len(), model.len());
        }
        check_against_model(&store, &model);
    }
}

#[test]
fn delete_then_lookup_misses() {
    let mut rng = fastrand::Rng::with_seed(99);
    let mut store = MapStore::new(u32_u64_map()).unwrap();
    let keys: Vec<u32> = (0..100).map(|_| rng.u32(..)).collect();
    for k in &keys {
        // SAFETY: key and value are locals of the descriptor's types.
        unsafe { store.assign(p(k), Some(p(&u64::from(*k)))).unwrap() };
    }
    let mut shuffled = keys.clone();
    rng.shuffle(&mut shuffled);
    for k in shuffled {
        // SAFETY: key is a local u32.
        unsafe {
            store.delete(p(&k)).unwrap();
            assert!(store.lookup(p(&k)).unwrap().is_none());
        }
    }
    assert!(store.is_empty());
}

#[test]
fn int32_float64_entry_layout() {
    let ty = TypeBuilder::map(builtin(Kind::Int32).unwrap(), builtin(Kind::Float64).unwrap())
        .build()
        .unwrap();
    let store = MapStore::new(ty).unwrap();
    let layout = store.entry_layout();
    let f64_align = std::mem::align_of::<f64>();
    assert_eq!(layout.key_offset, 0);
    assert_eq!(layout.value_offset, align_to(4, f64_align));
    assert_eq!(layout.size, layout.value_offset + 8);
}

#[test]
fn entry_offsets_are_aligned() {
    let kinds = [
        Kind::Bool,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Float32,
        Kind::Complex128,
        Kind::String,
        Kind::Uintptr,
    ];
    for _ in 0..50 {
        let key = builtin(kinds[fastrand::usize(..kinds.len())]).unwrap();
        let elem = builtin(kinds[fastrand::usize(..kinds.len())]).unwrap();
        let ty = TypeBuilder::map(key, elem).build().unwrap();
        let mut store = MapStore::new(ty).unwrap();
        let layout = *store.entry_layout();

        assert_eq!(layout.key_offset % key.align(), 0);
        assert_eq!(layout.value_offset % elem.align(), 0);
        assert!(layout.value_offset >= layout.key_offset + key.size());
        // Smallest aligned offset past the key.
        assert_eq!(
            layout.value_offset,
            align_to(layout.key_offset + key.size(), elem.align())
        );

        let zero = [0u8; 16];
        // SAFETY: zero is large enough for any listed key kind; an all-zero
        // string header is the empty string.
        let slot = unsafe { store.lookup_or_insert(zero.as_ptr(), true) }
            .unwrap()
            .unwrap();
        assert_eq!(slot.as_ptr() as usize % elem.align(), 0);
        let entry = store.entry_at(0).unwrap();
        assert_eq!(entry.key_ptr() as usize % key.align(), 0);
    }
}

#[test]
fn struct_keys_with_padding() {
    let ty_key = TypeBuilder::structure()
        .field("tag", builtin(Kind::Uint8).unwrap())
        .field("id", builtin(Kind::Uint32).unwrap())
        .build()
        .unwrap();
    let ty = TypeBuilder::map(ty_key, builtin(Kind::Bool).unwrap())
        .build()
        .unwrap();
    let mut store = MapStore::new(ty).unwrap();

    let mut a = [0u8; 8];
    let mut b = [0xFFu8; 8];
    a[0] = 3;
    b[0] = 3;
    a[4..].copy_from_slice(&9u32.to_ne_bytes());
    b[4..].copy_from_slice(&9u32.to_ne_bytes());
    // SAFETY: both buffers are valid 8-byte struct values.
    unsafe {
        store.assign(a.as_ptr(), Some(p(&true))).unwrap();
        store.assign(b.as_ptr(), Some(p(&false))).unwrap();
    }
    assert_eq!(store.len(), 1);
}
