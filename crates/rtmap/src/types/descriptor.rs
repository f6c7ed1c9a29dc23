// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use super::{ChanDir, Kind};
use crate::alg::AlgTable;
use crate::config::POINTER_SIZE;
use crate::error::{Error, Result};
use std::fmt;
use std::mem::align_of;
use std::sync::OnceLock;

/// Descriptors are immutable process-wide data, shared by reference.
pub type TypeRef = &'static TypeDescriptor;

/// Opaque garbage-collection metadata. Carried, never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GcData(pub usize);

/// Opaque code address (method entry points).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FnAddr(pub usize);

/// Method on a named, non-interface type.
#[derive(Debug, Clone)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Import path for unexported names.
    pub pkg_path: Option<String>,
    /// Method type without receiver.
    pub mtyp: Option<TypeRef>,
    /// Function type with receiver.
    pub typ: Option<TypeRef>,
    /// Entry used for interface calls.
    pub ifn: Option<FnAddr>,
    /// Entry used for direct calls.
    pub tfn: Option<FnAddr>,
}

impl Method {
    /// Create a method entry with no code addresses.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pkg_path: None,
            mtyp: None,
            typ: None,
            ifn: None,
            tfn: None,
        }
    }
}

/// Extra information present only for named or methoded types.
#[derive(Debug, Clone, Default)]
pub struct UncommonType {
    pub name: Option<String>,
    pub pkg_path: Option<String>,
    pub methods: Vec<Method>,
}

/// Method of an interface type.
#[derive(Debug, Clone)]
pub struct IMethod {
    pub name: String,
    pub pkg_path: Option<String>,
    /// Function type of the method.
    pub typ: TypeRef,
}

impl IMethod {
    /// Create an exported interface method.
    pub fn new(name: impl Into<String>, typ: TypeRef) -> Self {
        Self {
            name: name.into(),
            pkg_path: None,
            typ,
        }
    }

    /// Stable ordering key.
    pub fn hash(&self) -> u32 {
        fnv1a(self.name.as_bytes())
    }
}

/// Struct member.
#[derive(Debug, Clone)]
pub struct StructField {
    /// `None` for embedded fields.
    pub name: Option<String>,
    pub pkg_path: Option<String>,
    pub typ: TypeRef,
    pub tag: Option<String>,
    /// Byte offset within the struct.
    pub offset: usize,
}

impl StructField {
    /// Embedded fields carry no name of their own.
    pub fn is_embedded(&self) -> bool {
        self.name.is_none()
    }
}

/// Fixed-length array payload.
#[derive(Debug, Clone)]
pub struct ArrayType {
    pub elem: TypeRef,
    /// `[]elem`, the slice type obtained by slicing this array.
    pub slice: TypeRef,
    pub len: usize,
}

/// Channel payload.
#[derive(Debug, Clone)]
pub struct ChanType {
    pub elem: TypeRef,
    pub dir: ChanDir,
}

/// Function payload.
#[derive(Debug, Clone)]
pub struct FuncType {
    /// Last parameter is `...T`.
    pub variadic: bool,
    pub params: Vec<TypeRef>,
    pub results: Vec<TypeRef>,
}

/// Interface payload.
#[derive(Debug, Clone)]
pub struct InterfaceType {
    /// Sorted by [`IMethod::hash`], then name.
    pub methods: Vec<IMethod>,
}

/// Map payload: the pair that drives every entry layout computation.
#[derive(Debug, Clone, Copy)]
pub struct MapType {
    pub key: TypeRef,
    pub elem: TypeRef,
}

/// Struct payload.
#[derive(Debug, Clone)]
pub struct StructType {
    /// Sorted by offset.
    pub fields: Vec<StructField>,
}

/// Kind-specific payload.
#[derive(Debug, Clone)]
pub enum KindDetail {
    /// Numbers, bool, string, unsafe pointer.
    Basic,
    Array(ArrayType),
    Chan(ChanType),
    Func(FuncType),
    Interface(InterfaceType),
    Map(MapType),
    Ptr { elem: TypeRef },
    Slice { elem: TypeRef },
    Struct(StructType),
}

impl KindDetail {
    /// Kind implied by the payload, `None` for [`KindDetail::Basic`].
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Self::Basic => None,
            Self::Array(_) => Some(Kind::Array),
            Self::Chan(_) => Some(Kind::Chan),
            Self::Func(_) => Some(Kind::Func),
            Self::Interface(_) => Some(Kind::Interface),
            Self::Map(_) => Some(Kind::Map),
            Self::Ptr { .. } => Some(Kind::Ptr),
            Self::Slice { .. } => Some(Kind::Slice),
            Self::Struct(_) => Some(Kind::Struct),
        }
    }
}

/// A complete type descriptor.
///
/// Descriptors are built once (see [`super::TypeBuilder`]), validated, and
/// leaked; afterwards they are only read, except for the pointer-to-this
/// cache which is filled at most once.
pub struct TypeDescriptor {
    pub(crate) size: usize,
    pub(crate) hash: u32,
    pub(crate) align: u8,
    pub(crate) field_align: u8,
    pub(crate) kind: Kind,
    pub(crate) alg: AlgTable,
    pub(crate) gc: GcData,
    pub(crate) string: String,
    pub(crate) uncommon: Option<Box<UncommonType>>,
    pub(crate) ptr_to_this: OnceLock<TypeRef>,
    pub(crate) detail: KindDetail,
}

impl TypeDescriptor {
    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Hash of the display name.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Alignment of a variable of this type.
    #[inline]
    pub fn align(&self) -> usize {
        usize::from(self.align)
    }

    /// Alignment of a struct field of this type.
    #[inline]
    pub fn field_align(&self) -> usize {
        usize::from(self.field_align)
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Algorithm table selected for this type.
    #[inline]
    pub fn alg(&self) -> AlgTable {
        self.alg
    }

    #[inline]
    pub fn gc(&self) -> GcData {
        self.gc
    }

    /// Display name (`map[string]int`, `main.Point`, ...).
    #[inline]
    pub fn string(&self) -> &str {
        &self.string
    }

    pub fn uncommon(&self) -> Option<&UncommonType> {
        self.uncommon.as_deref()
    }

    /// Declared name for named types.
    pub fn name(&self) -> Option<&str> {
        self.uncommon()?.name.as_deref()
    }

    /// Import path for named types.
    pub fn pkg_path(&self) -> Option<&str> {
        self.uncommon()?.pkg_path.as_deref()
    }

    pub fn methods(&self) -> &[Method] {
        self.uncommon().map_or(&[], |u| u.methods.as_slice())
    }

    /// Returns true if this type was declared with a name.
    pub fn is_named(&self) -> bool {
        self.name().is_some()
    }

    pub fn detail(&self) -> &KindDetail {
        &self.detail
    }

    /// Element type for array, chan, map, ptr and slice kinds.
    pub fn elem(&self) -> Option<TypeRef> {
        match &self.detail {
            KindDetail::Array(a) => Some(a.elem),
            KindDetail::Chan(c) => Some(c.elem),
            KindDetail::Map(m) => Some(m.elem),
            KindDetail::Ptr { elem } | KindDetail::Slice { elem } => Some(*elem),
            _ => None,
        }
    }

    /// Key and element pair for map kinds.
    pub fn map_type(&self) -> Option<MapType> {
        match &self.detail {
            KindDetail::Map(m) => Some(*m),
            _ => None,
        }
    }

    /// Array length.
    pub fn array_len(&self) -> Option<usize> {
        match &self.detail {
            KindDetail::Array(a) => Some(a.len),
            _ => None,
        }
    }

    /// Struct fields, sorted by offset.
    pub fn fields(&self) -> Option<&[StructField]> {
        match &self.detail {
            KindDetail::Struct(s) => Some(&s.fields),
            _ => None,
        }
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields()?
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
    }

    /// Descriptor of `*Self`, created on first use and cached.
    pub fn ptr_to(&'static self) -> TypeRef {
        self.ptr_to_this.get_or_init(|| {
            log::trace!("[types] creating *{}", self.string);
            Self::pointer_to(self).leak()
        })
    }

    /// Unnamed pointer descriptor, uncached. Prefer [`TypeDescriptor::ptr_to`].
    pub(crate) fn pointer_to(elem: TypeRef) -> Self {
        let detail = KindDetail::Ptr { elem };
        Self::assemble(
            Kind::Ptr,
            POINTER_SIZE,
            POINTER_SIZE,
            format!("*{}", elem.string),
            None,
            GcData::default(),
            detail,
        )
    }

    /// Unnamed slice descriptor.
    pub(crate) fn slice_of(elem: TypeRef) -> Self {
        let detail = KindDetail::Slice { elem };
        Self::assemble(
            Kind::Slice,
            3 * POINTER_SIZE,
            POINTER_SIZE,
            format!("[]{}", elem.string),
            None,
            GcData::default(),
            detail,
        )
    }

    /// Fill in the derived fields (hash, algorithm table) around a layout
    /// that has already been decided.
    pub(crate) fn assemble(
        kind: Kind,
        size: usize,
        align: usize,
        string: String,
        uncommon: Option<Box<UncommonType>>,
        gc: GcData,
        detail: KindDetail,
    ) -> Self {
        let alg = AlgTable::resolve(kind, &detail, size);
        let align = u8::try_from(align).unwrap_or(u8::MAX);
        Self {
            size,
            hash: fnv1a(string.as_bytes()),
            align,
            field_align: align,
            kind,
            alg,
            gc,
            string,
            uncommon,
            ptr_to_this: OnceLock::new(),
            detail,
        }
    }

    /// Move to the heap for the rest of the process.
    #[must_use]
    pub fn leak(self) -> TypeRef {
        Box::leak(Box::new(self))
    }

    /// Check that size and alignment agree with the kind's layout rule and
    /// that the payload matches the kind.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Error::InvalidLayout {
            type_name: self.string.clone(),
            reason,
        };

        if self.kind == Kind::Invalid {
            return Err(fail("invalid kind".into()));
        }
        let align = self.align();
        if !align.is_power_of_two() {
            return Err(Error::InvalidAlignment(align));
        }
        if !self.field_align().is_power_of_two() {
            return Err(Error::InvalidAlignment(self.field_align()));
        }
        if self.size % align != 0 {
            return Err(fail(format!(
                "size {} is not a multiple of alignment {}",
                self.size, align
            )));
        }
        match self.detail.kind() {
            None if !self.kind.is_basic() => {
                return Err(fail(format!("kind {} requires a payload", self.kind)));
            }
            Some(k) if k != self.kind => {
                return Err(fail(format!("{} payload on {} kind", k, self.kind)));
            }
            _ => {}
        }

        if let Some((size, align)) = fixed_layout(self.kind) {
            if self.size != size || self.align() != align {
                return Err(fail(format!(
                    "{} must be {} bytes aligned to {}, got {} aligned to {}",
                    self.kind,
                    size,
                    align,
                    self.size,
                    self.align()
                )));
            }
            return Ok(());
        }

        match &self.detail {
            KindDetail::Array(a) => {
                let expected = a.elem.size.checked_mul(a.len).ok_or_else(|| {
                    fail(format!("{} x {} overflows", a.elem.size, a.len))
                })?;
                if self.size != expected || self.align() != a.elem.align() {
                    return Err(fail(format!(
                        "array must be {} bytes aligned to {}",
                        expected,
                        a.elem.align()
                    )));
                }
            }
            KindDetail::Struct(s) => {
                let mut end = 0usize;
                let mut max_align = 1usize;
                for field in &s.fields {
                    let fa = field.typ.field_align();
                    if field.offset < end || field.offset % fa != 0 {
                        return Err(fail(format!(
                            "field {} at offset {} overlaps or is misaligned",
                            field.name.as_deref().unwrap_or(field.typ.string()),
                            field.offset
                        )));
                    }
                    end = field.offset + field.typ.size;
                    max_align = max_align.max(fa);
                }
                if end > self.size || self.align() != max_align {
                    return Err(fail(format!(
                        "struct fields end at {} aligned to {}, descriptor says {} aligned to {}",
                        end,
                        max_align,
                        self.size,
                        self.align()
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Size and alignment for kinds whose layout does not depend on a payload.
pub fn fixed_layout(kind: Kind) -> Option<(usize, usize)> {
    let word = (POINTER_SIZE, POINTER_SIZE);
    match kind {
        Kind::Bool | Kind::Int8 | Kind::Uint8 => Some((1, 1)),
        Kind::Int16 | Kind::Uint16 => Some((2, 2)),
        Kind::Int32 | Kind::Uint32 | Kind::Float32 => Some((4, 4)),
        Kind::Int64 | Kind::Uint64 => Some((8, align_of::<u64>())),
        Kind::Float64 => Some((8, align_of::<f64>())),
        Kind::Complex64 => Some((8, 4)),
        Kind::Complex128 => Some((16, align_of::<f64>())),
        Kind::Int
        | Kind::Uint
        | Kind::Uintptr
        | Kind::Ptr
        | Kind::UnsafePointer
        | Kind::Map
        | Kind::Chan
        | Kind::Func => Some(word),
        Kind::String | Kind::Interface => Some((2 * POINTER_SIZE, POINTER_SIZE)),
        Kind::Slice => Some((3 * POINTER_SIZE, POINTER_SIZE)),
        Kind::Array | Kind::Struct | Kind::Invalid => None,
    }
}

/// 32-bit FNV-1a.
pub(crate) fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for &b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

impl fmt::Debug for TypeDescriptor {
    // The pointer-to-this cache points back at this descriptor, so a derived
    // Debug would recurse forever.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("string", &self.string)
            .field("kind", &self.kind)
            .field("size", &self.size)
            .field("align", &self.align)
            .field("alg", &self.alg)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtin;

    #[test]
    fn test_fixed_layouts() {
        assert_eq!(fixed_layout(Kind::Bool), Some((1, 1)));
        assert_eq!(fixed_layout(Kind::Int32), Some((4, 4)));
        assert_eq!(fixed_layout(Kind::Ptr), Some((POINTER_SIZE, POINTER_SIZE)));
        assert_eq!(
            fixed_layout(Kind::String),
            Some((2 * POINTER_SIZE, POINTER_SIZE))
        );
        assert_eq!(fixed_layout(Kind::Struct), None);
    }

    #[test]
    fn test_ptr_to_is_cached() {
        let int32 = builtin(Kind::Int32).unwrap();
        let p1 = int32.ptr_to();
        let p2 = int32.ptr_to();
        assert!(std::ptr::eq(p1, p2));
        assert_eq!(p1.kind(), Kind::Ptr);
        assert_eq!(p1.size(), POINTER_SIZE);
        assert_eq!(p1.string(), "*int32");
        assert!(std::ptr::eq(p1.elem().unwrap(), int32));
        assert!(p1.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_pointer() {
        let int32 = builtin(Kind::Int32).unwrap();
        let mut bad = TypeDescriptor::pointer_to(int32);
        bad.size = 4;
        bad.align = 4;
        assert!(matches!(
            bad.validate(),
            Err(Error::InvalidLayout { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_payload_mismatch() {
        let int32 = builtin(Kind::Int32).unwrap();
        let mut bad = TypeDescriptor::slice_of(int32);
        bad.kind = Kind::Ptr;
        bad.size = POINTER_SIZE;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_debug_does_not_recurse() {
        let int64 = builtin(Kind::Int64).unwrap();
        let _ = int64.ptr_to();
        let text = format!("{:?}", int64);
        assert!(text.contains("int64"));
    }
}
