// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.
//!
//! Stands in for the code generator: every descriptor the runtime sees in
//! tests and through the C surface is produced here, laid out by
//! [`crate::layout`], validated, and leaked.

use super::descriptor::{
    ArrayType, ChanType, FuncType, GcData, IMethod, InterfaceType, KindDetail, MapType, Method,
    StructField, StructType, TypeDescriptor, TypeRef, UncommonType,
};
use super::{fixed_layout, ChanDir, Kind};
use crate::error::{Error, Result};
use crate::layout;

#[derive(Debug)]
struct PendingField {
    name: Option<String>,
    pkg_path: Option<String>,
    typ: TypeRef,
    tag: Option<String>,
}

#[derive(Debug)]
enum Shape {
    Basic(Kind),
    Array { elem: TypeRef, len: usize },
    Chan { elem: TypeRef, dir: ChanDir },
    Func(FuncType),
    Interface(Vec<IMethod>),
    Map { key: TypeRef, elem: TypeRef },
    Ptr(TypeRef),
    Slice(TypeRef),
    Struct(Vec<PendingField>),
}

impl Shape {
    fn kind(&self) -> Kind {
        match self {
            Self::Basic(kind) => *kind,
            Self::Array { .. } => Kind::Array,
            Self::Chan { .. } => Kind::Chan,
            Self::Func(_) => Kind::Func,
            Self::Interface(_) => Kind::Interface,
            Self::Map { .. } => Kind::Map,
            Self::Ptr(_) => Kind::Ptr,
            Self::Slice(_) => Kind::Slice,
            Self::Struct(_) => Kind::Struct,
        }
    }
}

/// Builder for creating TypeDescriptor instances.
///
/// # Example
///
/// ```rust
/// use rtmap::types::{builtin, TypeBuilder};
/// use rtmap::Kind;
///
/// let point = TypeBuilder::structure()
///     .field("x", builtin(Kind::Int32).unwrap())
///     .field("y", builtin(Kind::Float64).unwrap())
///     .named("main", "Point")
///     .build()
///     .unwrap();
/// assert_eq!(point.size(), 16);
/// assert_eq!(point.field("y").unwrap().offset, 8);
/// assert_eq!(point.string(), "main.Point");
/// ```
#[derive(Debug)]
pub struct TypeBuilder {
    shape: Shape,
    name: Option<(String, String)>,
    methods: Vec<Method>,
    gc: GcData,
    layout: Option<(usize, usize)>,
    misuse: Option<String>,
}

impl TypeBuilder {
    fn with_shape(shape: Shape) -> Self {
        Self {
            shape,
            name: None,
            methods: Vec::new(),
            gc: GcData::default(),
            layout: None,
            misuse: None,
        }
    }

    /// Basic type of `kind`. Prefer [`super::builtin`] for unnamed ones.
    pub fn basic(kind: Kind) -> Self {
        Self::with_shape(Shape::Basic(kind))
    }

    /// `*elem`.
    pub fn pointer(elem: TypeRef) -> Self {
        Self::with_shape(Shape::Ptr(elem))
    }

    /// `[]elem`.
    pub fn slice(elem: TypeRef) -> Self {
        Self::with_shape(Shape::Slice(elem))
    }

    /// `[len]elem`.
    pub fn array(elem: TypeRef, len: usize) -> Self {
        Self::with_shape(Shape::Array { elem, len })
    }

    /// `chan elem` in the given direction.
    pub fn chan(elem: TypeRef, dir: ChanDir) -> Self {
        Self::with_shape(Shape::Chan { elem, dir })
    }

    /// `func(params) results`.
    pub fn func(params: Vec<TypeRef>, results: Vec<TypeRef>, variadic: bool) -> Self {
        Self::with_shape(Shape::Func(FuncType {
            variadic,
            params,
            results,
        }))
    }

    /// Interface with the given method set (any order).
    pub fn interface(methods: Vec<IMethod>) -> Self {
        Self::with_shape(Shape::Interface(methods))
    }

    /// `map[key]elem`.
    pub fn map(key: TypeRef, elem: TypeRef) -> Self {
        Self::with_shape(Shape::Map { key, elem })
    }

    /// Empty struct; add members with [`TypeBuilder::field`] and friends.
    pub fn structure() -> Self {
        Self::with_shape(Shape::Struct(Vec::new()))
    }

    fn push_field(mut self, field: PendingField) -> Self {
        match &mut self.shape {
            Shape::Struct(fields) => fields.push(field),
            other => {
                self.misuse = Some(format!("field added to {} type", other.kind()));
            }
        }
        self
    }

    /// Append an exported field.
    pub fn field(self, name: impl Into<String>, typ: TypeRef) -> Self {
        self.push_field(PendingField {
            name: Some(name.into()),
            pkg_path: None,
            typ,
            tag: None,
        })
    }

    /// Append a field with a struct tag.
    pub fn tagged_field(self, name: impl Into<String>, typ: TypeRef, tag: impl Into<String>) -> Self {
        self.push_field(PendingField {
            name: Some(name.into()),
            pkg_path: None,
            typ,
            tag: Some(tag.into()),
        })
    }

    /// Append an unexported field belonging to `pkg_path`.
    pub fn private_field(
        self,
        pkg_path: impl Into<String>,
        name: impl Into<String>,
        typ: TypeRef,
    ) -> Self {
        self.push_field(PendingField {
            name: Some(name.into()),
            pkg_path: Some(pkg_path.into()),
            typ,
            tag: None,
        })
    }

    /// Append an embedded field.
    pub fn embedded(self, typ: TypeRef) -> Self {
        self.push_field(PendingField {
            name: None,
            pkg_path: None,
            typ,
            tag: None,
        })
    }

    /// Give the type a declared name in package `pkg_path`.
    pub fn named(mut self, pkg_path: impl Into<String>, name: impl Into<String>) -> Self {
        self.name = Some((pkg_path.into(), name.into()));
        self
    }

    /// Attach a method (kept in declaration order).
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Attach opaque GC metadata.
    pub fn gc(mut self, gc: GcData) -> Self {
        self.gc = gc;
        self
    }

    /// Force a size and alignment instead of computing them. The result is
    /// still validated against the kind's layout rule.
    pub fn layout(mut self, size: usize, align: usize) -> Self {
        self.layout = Some((size, align));
        self
    }

    /// Lay out, validate and leak the descriptor.
    pub fn build(self) -> Result<TypeRef> {
        let kind = self.shape.kind();
        let display = self.display_name();
        if let Some(reason) = self.misuse {
            return Err(Error::InvalidLayout {
                type_name: display,
                reason,
            });
        }

        // Plain unnamed pointers share the element's cached pointer type.
        if let Shape::Ptr(elem) = self.shape {
            if self.name.is_none()
                && self.methods.is_empty()
                && self.gc == GcData::default()
                && self.layout.is_none()
            {
                return Ok(elem.ptr_to());
            }
        }

        let (detail, computed) = match self.shape {
            Shape::Basic(kind) => (KindDetail::Basic, fixed_layout(kind).unwrap_or((0, 1))),
            Shape::Ptr(elem) => (KindDetail::Ptr { elem }, header_layout(kind)),
            Shape::Slice(elem) => (KindDetail::Slice { elem }, header_layout(kind)),
            Shape::Chan { elem, dir } => (KindDetail::Chan(ChanType { elem, dir }), header_layout(kind)),
            Shape::Func(func) => (KindDetail::Func(func), header_layout(kind)),
            Shape::Map { key, elem } => (KindDetail::Map(MapType { key, elem }), header_layout(kind)),
            Shape::Interface(mut methods) => {
                methods.sort_by(|a, b| a.hash().cmp(&b.hash()).then_with(|| a.name.cmp(&b.name)));
                (KindDetail::Interface(InterfaceType { methods }), header_layout(kind))
            }
            Shape::Array { elem, len } => {
                let size = elem.size().checked_mul(len).ok_or_else(|| Error::InvalidLayout {
                    type_name: display.clone(),
                    reason: format!("{} x {} overflows", elem.size(), len),
                })?;
                let slice = TypeDescriptor::slice_of(elem).leak();
                (
                    KindDetail::Array(ArrayType { elem, slice, len }),
                    (size, elem.align()),
                )
            }
            Shape::Struct(pending) => {
                let items: Vec<(usize, usize)> = pending
                    .iter()
                    .map(|f| (f.typ.size(), f.typ.field_align()))
                    .collect();
                let placed = layout::layout(0, &items).map_err(|e| rename(e, &display))?;
                let size = placed.padded_size().map_err(|e| rename(e, &display))?;
                let fields = pending
                    .into_iter()
                    .zip(placed.offsets)
                    .map(|(f, offset)| StructField {
                        name: f.name,
                        pkg_path: f.pkg_path,
                        typ: f.typ,
                        tag: f.tag,
                        offset,
                    })
                    .collect();
                (KindDetail::Struct(StructType { fields }), (size, placed.align))
            }
        };

        let (size, align) = self.layout.unwrap_or(computed);
        if !align.is_power_of_two() || align > usize::from(u8::MAX) {
            return Err(Error::InvalidAlignment(align));
        }

        let uncommon = if self.name.is_some() || !self.methods.is_empty() {
            let (pkg_path, name) = match self.name {
                Some((pkg, name)) => (Some(pkg), Some(name)),
                None => (None, None),
            };
            Some(Box::new(UncommonType {
                name,
                pkg_path,
                methods: self.methods,
            }))
        } else {
            None
        };

        let desc = TypeDescriptor::assemble(kind, size, align, display, uncommon, self.gc, detail);
        desc.validate()?;
        log::trace!(
            "[types] built {} (size={} align={} alg={:?})",
            desc.string(),
            desc.size(),
            desc.align(),
            desc.alg().equal
        );
        Ok(desc.leak())
    }

    fn display_name(&self) -> String {
        if let Some((pkg, name)) = &self.name {
            let pkg = pkg.rsplit('/').next().unwrap_or(pkg);
            return if pkg.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", pkg, name)
            };
        }
        match &self.shape {
            Shape::Basic(kind) => kind.name().to_string(),
            Shape::Ptr(elem) => format!("*{}", elem.string()),
            Shape::Slice(elem) => format!("[]{}", elem.string()),
            Shape::Array { elem, len } => format!("[{}]{}", len, elem.string()),
            Shape::Chan { elem, dir } => match dir {
                ChanDir::Both => format!("chan {}", elem.string()),
                ChanDir::Recv => format!("<-chan {}", elem.string()),
                ChanDir::Send => format!("chan<- {}", elem.string()),
            },
            Shape::Map { key, elem } => format!("map[{}]{}", key.string(), elem.string()),
            Shape::Func(func) => format!("func{}", signature(func)),
            Shape::Interface(methods) if methods.is_empty() => "interface {}".to_string(),
            Shape::Interface(methods) => {
                let parts: Vec<String> = methods
                    .iter()
                    .map(|m| {
                        let sig = m.typ.string().strip_prefix("func").unwrap_or("()");
                        format!("{}{}", m.name, sig)
                    })
                    .collect();
                format!("interface {{ {} }}", parts.join("; "))
            }
            Shape::Struct(fields) if fields.is_empty() => "struct {}".to_string(),
            Shape::Struct(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        let mut part = match &f.name {
                            Some(name) => format!("{} {}", name, f.typ.string()),
                            None => f.typ.string().to_string(),
                        };
                        if let Some(tag) = &f.tag {
                            part.push_str(&format!(" {:?}", tag));
                        }
                        part
                    })
                    .collect();
                format!("struct {{ {} }}", parts.join("; "))
            }
        }
    }
}

fn header_layout(kind: Kind) -> (usize, usize) {
    fixed_layout(kind).unwrap_or((0, 1))
}

fn rename(err: Error, type_name: &str) -> Error {
    match err {
        Error::InvalidLayout { reason, .. } => Error::InvalidLayout {
            type_name: type_name.to_string(),
            reason,
        },
        other => other,
    }
}

/// `(A, ...B) R` / `(A) (R1, R2)`.
fn signature(func: &FuncType) -> String {
    let last = func.params.len().saturating_sub(1);
    let params: Vec<String> = func
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if func.variadic && i == last {
                // Variadic parameters are declared as slices.
                let elem = p.elem().map_or(p.string(), |e| e.string());
                format!("...{}", elem)
            } else {
                p.string().to_string()
            }
        })
        .collect();
    let results: Vec<&str> = func.results.iter().map(|r| r.string()).collect();
    match results.len() {
        0 => format!("({})", params.join(", ")),
        1 => format!("({}) {}", params.join(", "), results[0]),
        _ => format!("({}) ({})", params.join(", "), results.join(", ")),
    }
}
