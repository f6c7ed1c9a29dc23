// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Introspection path: descriptor-per-call access and the reflection
// iteration protocol, including the small-value optimization.

#![allow(clippy::missing_panics_doc)]

use rtmap::reflect::{self, IWord};
use rtmap::types::{builtin, TypeBuilder};
use rtmap::{Error, Kind, MapStore, TypeRef, POINTER_SIZE};

fn p<T>(v: &T) -> *const u8 {
    (v as *const T).cast()
}

fn big_key() -> TypeRef {
    // 5 x 8 bytes = 40 bytes, larger than a word on every target.
    TypeBuilder::structure()
        .field("a", builtin(Kind::Uint64).unwrap())
        .field("b", builtin(Kind::Uint64).unwrap())
        .field("c", builtin(Kind::Uint64).unwrap())
        .field("d", builtin(Kind::Uint64).unwrap())
        .field("e", builtin(Kind::Uint64).unwrap())
        .build()
        .unwrap()
}

#[test]
fn bool_key_returned_by_value() {
    let ty = TypeBuilder::map(builtin(Kind::Bool).unwrap(), builtin(Kind::String).unwrap())
        .build()
        .unwrap();
    let mut m = reflect::makemap(ty).unwrap();
    let value = [0usize; 2];
    // SAFETY: key is a bool, value a zeroed string header.
    unsafe { reflect::mapassign(ty, Some(&mut m), p(&true), Some(p(&value))).unwrap() };

    let it = reflect::mapiterinit(ty, Some(&m)).unwrap();
    match reflect::mapiterkey(&it) {
        Some(IWord::Value(word)) => {
            let bytes = word.to_ne_bytes();
            assert_eq!(bytes[0], 1);
            assert!(bytes[1..].iter().all(|&b| b == 0));
        }
        other => panic!("expected a direct word, got {:?}", other),
    }
    // 2-word string values come back by address.
    assert!(reflect::mapiterelem(&it).unwrap().is_indirect());
}

#[test]
fn large_struct_key_returned_by_address() {
    let key_ty = big_key();
    assert_eq!(key_ty.size(), 40);
    assert!(key_ty.size() > POINTER_SIZE);
    let ty = TypeBuilder::map(key_ty, builtin(Kind::Int32).unwrap())
        .build()
        .unwrap();
    let mut m = reflect::makemap(ty).unwrap();
    let key = [1u64, 2, 3, 4, 5];
    // SAFETY: key is 40 bytes laid out like the struct.
    unsafe { reflect::mapassign(ty, Some(&mut m), p(&key), Some(p(&7i32))).unwrap() };

    let it = reflect::mapiterinit(ty, Some(&m)).unwrap();
    let entry = it.current().unwrap();
    match reflect::mapiterkey(&it) {
        Some(IWord::Addr(addr)) => {
            assert_eq!(addr.as_ptr(), entry.key_ptr());
            let mut copy = [0u64; 5];
            // SAFETY: copy is 40 bytes; addr points into a live entry.
            unsafe {
                reflect::store_iword(key_ty, IWord::Addr(addr), (&mut copy as *mut [u64; 5]).cast());
            }
            assert_eq!(copy, key);
        }
        other => panic!("expected an address, got {:?}", other),
    }
    match reflect::mapiterelem(&it) {
        Some(IWord::Value(word)) => assert_eq!(word.to_ne_bytes()[..4], 7i32.to_ne_bytes()),
        other => panic!("expected a direct word, got {:?}", other),
    }
}

#[test]
fn iteration_protocol_visits_all() {
    let ty = TypeBuilder::map(builtin(Kind::Int16).unwrap(), builtin(Kind::Int16).unwrap())
        .build()
        .unwrap();
    let mut m = reflect::makemap(ty).unwrap();
    for k in 0i16..5 {
        // SAFETY: key and value are int16 locals.
        unsafe { reflect::mapassign(ty, Some(&mut m), p(&k), Some(p(&(k * 2)))).unwrap() };
    }
    assert_eq!(reflect::maplen(Some(&m)), 5);

    let mut it = reflect::mapiterinit(ty, Some(&m)).unwrap();
    let mut keys = Vec::new();
    while let Some(word) = reflect::mapiterkey(&it) {
        let IWord::Value(w) = word else {
            panic!("int16 keys fit in a word")
        };
        keys.push(i16::from_ne_bytes([w.to_ne_bytes()[0], w.to_ne_bytes()[1]]));
        reflect::mapiternext(&mut it);
    }
    assert_eq!(keys, vec![0, 1, 2, 3, 4]);
    assert!(it.is_exhausted());
    reflect::mapiternext(&mut it);
    assert!(reflect::mapiterkey(&it).is_none());
}

#[test]
fn access_and_delete() {
    let ty = TypeBuilder::map(builtin(Kind::Uint8).unwrap(), builtin(Kind::Float32).unwrap())
        .build()
        .unwrap();
    let mut m = reflect::makemap(ty).unwrap();
    // SAFETY: uint8 keys, float32 values.
    unsafe {
        reflect::mapassign(ty, Some(&mut m), p(&9u8), Some(p(&1.25f32))).unwrap();
        let slot = reflect::mapaccess(ty, Some(&m), p(&9u8)).unwrap().unwrap();
        assert_eq!(std::ptr::read_unaligned(slot.as_ptr().cast::<f32>()), 1.25);
        assert!(reflect::mapaccess(ty, Some(&m), p(&8u8)).unwrap().is_none());

        reflect::mapassign(ty, Some(&mut m), p(&9u8), None).unwrap();
        assert!(reflect::mapaccess(ty, Some(&m), p(&9u8)).unwrap().is_none());
    }
    assert_eq!(reflect::maplen(Some(&m)), 0);
}

#[test]
fn nil_map_semantics() {
    let ty = TypeBuilder::map(builtin(Kind::Int).unwrap(), builtin(Kind::Int).unwrap())
        .build()
        .unwrap();
    let key = 1usize;
    assert_eq!(reflect::maplen(None), 0);
    // SAFETY: key and value are int locals.
    unsafe {
        assert!(reflect::mapaccess(ty, None, p(&key)).unwrap().is_none());
        assert_eq!(
            reflect::mapassign(ty, None, p(&key), Some(p(&key))),
            Err(Error::NilMap)
        );
        assert_eq!(reflect::mapassign(ty, None, p(&key), None), Ok(()));
    }
    let it = reflect::mapiterinit(ty, None).unwrap();
    assert!(reflect::mapiterkey(&it).is_none());
}

#[test]
fn descriptor_must_match_store() {
    let a = TypeBuilder::map(builtin(Kind::Int).unwrap(), builtin(Kind::Int).unwrap())
        .build()
        .unwrap();
    let b = TypeBuilder::map(builtin(Kind::Int).unwrap(), builtin(Kind::Int).unwrap())
        .named("main", "Counts")
        .build()
        .unwrap();
    let m = MapStore::new(a).unwrap();
    let key = 0usize;
    // SAFETY: key is an int local.
    let err = unsafe { reflect::mapaccess(b, Some(&m), p(&key)) }.unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    let not_map = builtin(Kind::Int).unwrap();
    assert!(matches!(
        reflect::mapiterinit(not_map, Some(&m)),
        Err(Error::NotAMap { .. })
    ));
}
