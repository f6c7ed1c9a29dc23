// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Drive the C surface the way generated code and a foreign reflection layer
// would: build descriptors, read the entry layout, then access the map
// through both the direct and the descriptor-checked entry points.

use rtmap::types::abi::RawInterface;
use rtmap::types::{builtin, TypeBuilder};
use rtmap::{Kind, TypeDescriptor, TypeRef};
use rtmap_c::*;
use std::ffi::{c_void, CString};
use std::ptr;

fn p<T>(v: &T) -> *const c_void {
    (v as *const T).cast()
}

fn handle(ty: TypeRef) -> *const RtmapType {
    (ty as *const TypeDescriptor).cast()
}

#[test]
fn int32_float64_through_c_abi() {
    unsafe {
        let i32_ty = rtmap_type_builtin(RTMAP_KIND_INT32);
        let f64_ty = rtmap_type_builtin(RTMAP_KIND_FLOAT64);
        assert!(!i32_ty.is_null() && !f64_ty.is_null());
        let map_ty = rtmap_type_map(i32_ty, f64_ty);
        assert!(!map_ty.is_null());

        let mut layout = RtmapEntryLayout::default();
        assert_eq!(rtmap_type_entry_layout(map_ty, &mut layout), RtmapError::RtmapOk);
        assert_eq!(layout.key_offset, 0);
        assert_eq!(layout.value_offset, 8);
        assert_eq!(layout.size, 16);

        let m = rtmap_makemap(map_ty);
        assert!(!m.is_null());

        // Insert 7 -> 0.0 and write through the returned slot.
        let mut slot: *mut c_void = ptr::null_mut();
        assert_eq!(rtmap_maplookup(m, p(&7i32), true, &mut slot), RtmapError::RtmapOk);
        assert!(!slot.is_null());
        assert_eq!(*slot.cast::<f64>(), 0.0);
        *slot.cast::<f64>() = 3.5;
        assert_eq!(rtmap_maplen(m), 1);

        // Re-lookup without insert finds the same slot.
        let mut again: *mut c_void = ptr::null_mut();
        assert_eq!(rtmap_maplookup(m, p(&7i32), false, &mut again), RtmapError::RtmapOk);
        assert_eq!(again, slot);
        assert_eq!(
            rtmap_maplookup(m, p(&8i32), false, &mut again),
            RtmapError::RtmapNotFound
        );
        assert!(again.is_null());
        assert_eq!(rtmap_maplen(m), 1);

        // Descriptor-checked access sees the same value.
        let mut out: *mut c_void = ptr::null_mut();
        assert_eq!(rtmap_mapaccess(map_ty, m, p(&7i32), &mut out), RtmapError::RtmapOk);
        assert_eq!(*out.cast::<f64>(), 3.5);

        assert_eq!(rtmap_mapdelete(m, p(&7i32)), RtmapError::RtmapOk);
        assert_eq!(rtmap_mapdelete(m, p(&7i32)), RtmapError::RtmapNotFound);
        assert_eq!(rtmap_maplen(m), 0);

        rtmap_map_free(m);
    }
}

#[test]
fn mapnext_walks_in_insertion_order() {
    unsafe {
        let u16_ty = rtmap_type_builtin(RTMAP_KIND_UINT16);
        let map_ty = rtmap_type_map(u16_ty, u16_ty);
        let m = rtmap_makemap(map_ty);
        for k in [5u16, 1, 9] {
            let v = k * 10;
            assert_eq!(rtmap_mapassign(map_ty, m, p(&k), p(&v)), RtmapError::RtmapOk);
        }

        let mut seen = Vec::new();
        let mut cursor = 0usize;
        loop {
            let mut key: *mut c_void = ptr::null_mut();
            let mut value: *mut c_void = ptr::null_mut();
            cursor = rtmap_mapnext(m, cursor, &mut key, &mut value);
            if cursor == 0 {
                assert!(key.is_null() && value.is_null());
                break;
            }
            seen.push((*key.cast::<u16>(), *value.cast::<u16>()));
        }
        assert_eq!(seen, vec![(5, 50), (1, 10), (9, 90)]);

        rtmap_map_free(m);
    }
}

#[test]
fn reflection_iterator_words() {
    unsafe {
        let u8_ty = rtmap_type_builtin(RTMAP_KIND_UINT8);
        let big = rtmap_type_array(rtmap_type_builtin(RTMAP_KIND_UINT64), 4);
        assert_eq!(rtmap_type_size(big), 32);
        let map_ty = rtmap_type_map(u8_ty, big);
        let m = rtmap_makemap(map_ty);
        let value = [1u64, 2, 3, 4];
        assert_eq!(rtmap_mapassign(map_ty, m, p(&42u8), p(&value)), RtmapError::RtmapOk);

        let it = rtmap_mapiterinit(map_ty, m);
        assert!(!it.is_null());

        let mut key = RtmapIWord::default();
        assert!(rtmap_mapiterkey(it, &mut key));
        assert!(!key.indirect);
        assert_eq!(key.word.to_ne_bytes()[0], 42);

        let mut elem = RtmapIWord::default();
        assert!(rtmap_mapiterelem(it, &mut elem));
        assert!(elem.indirect);
        let mut copy = [0u64; 4];
        assert_eq!(
            rtmap_iword_store(big, elem, (&mut copy as *mut [u64; 4]).cast()),
            RtmapError::RtmapOk
        );
        assert_eq!(copy, value);

        rtmap_mapiternext(it);
        assert!(!rtmap_mapiterkey(it, &mut key));
        assert_eq!(key, RtmapIWord::default());

        rtmap_mapiter_free(it);
        rtmap_map_free(m);
    }
}

#[test]
fn null_map_and_bad_descriptors() {
    unsafe {
        let int_ty = rtmap_type_builtin(RTMAP_KIND_INT);
        let map_ty = rtmap_type_map(int_ty, int_ty);
        let key = 3isize;

        assert_eq!(rtmap_maplen(ptr::null()), 0);
        let mut slot: *mut c_void = ptr::null_mut();
        assert_eq!(
            rtmap_maplookup(ptr::null_mut(), p(&key), false, &mut slot),
            RtmapError::RtmapNotFound
        );
        assert_eq!(
            rtmap_maplookup(ptr::null_mut(), p(&key), true, &mut slot),
            RtmapError::RtmapNilMap
        );
        assert!(slot.is_null());
        assert_eq!(rtmap_mapdelete(ptr::null_mut(), p(&key)), RtmapError::RtmapNotFound);
        assert_eq!(
            rtmap_mapassign(map_ty, ptr::null_mut(), p(&key), p(&key)),
            RtmapError::RtmapNilMap
        );
        assert_eq!(
            rtmap_mapassign(map_ty, ptr::null_mut(), p(&key), ptr::null()),
            RtmapError::RtmapOk
        );
        assert_eq!(rtmap_mapnext(ptr::null(), 0, ptr::null_mut(), ptr::null_mut()), 0);

        // Not a map.
        assert!(rtmap_makemap(int_ty).is_null());
        let mut layout = RtmapEntryLayout::default();
        assert_eq!(rtmap_type_entry_layout(int_ty, &mut layout), RtmapError::RtmapNotAMap);

        // Slice keys are not comparable.
        let slice_map = rtmap_type_map(rtmap_type_slice(int_ty), int_ty);
        assert!(!slice_map.is_null());
        assert!(rtmap_makemap(slice_map).is_null());

        assert!(rtmap_type_builtin(200).is_null());
        assert!(rtmap_type_pointer(ptr::null()).is_null());
    }
}

#[test]
fn struct_builder_layout() {
    unsafe {
        let sb = rtmap_struct_builder_new();
        let a = CString::new("flag").unwrap();
        let b = CString::new("count").unwrap();
        assert_eq!(
            rtmap_struct_builder_add_field(sb, a.as_ptr(), rtmap_type_builtin(RTMAP_KIND_BOOL)),
            RtmapError::RtmapOk
        );
        assert_eq!(
            rtmap_struct_builder_add_field(sb, b.as_ptr(), rtmap_type_builtin(RTMAP_KIND_INT64)),
            RtmapError::RtmapOk
        );
        let mut ty = ptr::null();
        assert_eq!(rtmap_struct_builder_build(sb, &mut ty), RtmapError::RtmapOk);
        assert!(!ty.is_null());
        assert_eq!(rtmap_type_size(ty), 16);
        assert_eq!(rtmap_type_align(ty), 8);
        assert_eq!(rtmap_type_kind(ty), 25);

        let mut offset = 0usize;
        assert_eq!(rtmap_type_field_offset(ty, b.as_ptr(), &mut offset), RtmapError::RtmapOk);
        assert_eq!(offset, 8);
        let missing = CString::new("nope").unwrap();
        assert_eq!(
            rtmap_type_field_offset(ty, missing.as_ptr(), &mut offset),
            RtmapError::RtmapNotFound
        );

        rtmap_struct_builder_destroy(rtmap_struct_builder_new());
    }
}

#[test]
fn maplookup_reports_comparison_errors() {
    let iface = TypeBuilder::interface(vec![]).build().unwrap();
    let int = builtin(Kind::Int).unwrap();
    let map_ty = TypeBuilder::map(iface, builtin(Kind::Int32).unwrap())
        .build()
        .unwrap();
    let slice = TypeBuilder::slice(int).build().unwrap();
    let header = [0usize; 3];
    let bad = RawInterface::new(slice, header.as_ptr().cast());
    let n = 4usize;
    let good = RawInterface::new(int, p(&n).cast());

    unsafe {
        let m = rtmap_makemap(handle(map_ty));
        assert!(!m.is_null());
        let mut slot: *mut c_void = ptr::null_mut();

        // Neither a miss nor an insert: the key cannot be compared.
        assert_eq!(
            rtmap_maplookup(m, p(&bad), true, &mut slot),
            RtmapError::RtmapIncomparable
        );
        assert!(slot.is_null());
        assert_eq!(rtmap_maplen(m), 0);

        assert_eq!(rtmap_maplookup(m, p(&good), true, &mut slot), RtmapError::RtmapOk);
        assert!(!slot.is_null());
        assert_eq!(
            rtmap_maplookup(m, p(&bad), false, &mut slot),
            RtmapError::RtmapIncomparable
        );
        assert_eq!(rtmap_maplen(m), 1);

        rtmap_map_free(m);
    }
}
