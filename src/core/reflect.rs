//! Field reflection for model and structure types
//!
//! Every schema type carries a static table of [`FieldDescriptor`]s generated
//! by the `xmp_model!` / `xmp_struct!` macros. [`describe_fields`] resolves
//! that table into [`FieldInfo`] entries (wire prefix and name, modifiers,
//! container kind, codec capabilities), validates it and caches the result
//! once per type for the lifetime of the process.

use crate::core::error::{XmpError, XmpResult};
use crate::core::field::Field;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

static FIELD_CACHE: OnceLock<RwLock<HashMap<TypeId, &'static [FieldInfo]>>> = OnceLock::new();

/// Container kind of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single text value
    Scalar,
    /// Ordered array (rdf:Seq)
    Ordered,
    /// Unordered array (rdf:Bag)
    Unordered,
    /// Alternative array keyed by language (rdf:Alt)
    Alternative,
    /// Structure with named fields
    Struct,
    /// Verbatim catch-all nodes
    Raw,
}

macro_rules! bitset {
    ($(#[$meta:meta])* $name:ident { $($(#[$cmeta:meta])* $flag:ident = $bit:expr,)* }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u32);

        impl $name {
            /// No bits set
            pub const NONE: $name = $name(0);
            $($(#[$cmeta])* pub const $flag: $name = $name($bit);)*

            /// Whether all bits of `other` are set
            pub const fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            /// Whether any bit of `other` is set
            pub const fn intersects(self, other: $name) -> bool {
                self.0 & other.0 != 0
            }

            /// Union of two sets
            pub const fn union(self, other: $name) -> $name {
                $name(self.0 | other.0)
            }

            /// Set difference
            pub const fn without(self, other: $name) -> $name {
                $name(self.0 & !other.0)
            }

            /// Whether no bit is set
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Names of the set flags in declaration order
            pub fn names(self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(if self.contains($name::$flag) && !$name::$flag.is_empty() {
                    names.push(stringify!($flag));
                })*
                names
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                self.union(rhs)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.names().join(" | "))
            }
        }
    };
}

pub(crate) use bitset;

bitset! {
    /// Modifiers declared on a field
    FieldFlags {
        /// Skip the field on encode when it is empty
        OMIT_EMPTY = 1,
        /// Encode as an attribute instead of an element
        ATTR = 1 << 1,
        /// Catch-all for unknown properties of the namespace
        ANY = 1 << 2,
        /// Decode and address, but never encode
        OMIT = 1 << 3,
    }
}

bitset! {
    /// Codec capabilities of a field type
    Capabilities {
        /// Value can be written as text
        TEXT_MARSHAL = 1,
        /// Value can be read from text
        TEXT_UNMARSHAL = 1 << 1,
        /// Value can be written as a node tree
        TREE_MARSHAL = 1 << 2,
        /// Value can be read from a node tree
        TREE_UNMARSHAL = 1 << 3,
        /// Value can be written as attributes
        ATTR_MARSHAL = 1 << 4,
        /// Value can be read from attributes
        ATTR_UNMARSHAL = 1 << 5,
    }
}

impl Capabilities {
    /// Text marshal and unmarshal
    pub const TEXT: Capabilities = Capabilities(0b11);
    /// Tree marshal and unmarshal
    pub const TREE: Capabilities = Capabilities(0b1100);
    /// Attribute marshal and unmarshal
    pub const ATTR: Capabilities = Capabilities(0b110000);
}

impl FieldFlags {
    /// Parse one modifier keyword
    pub fn from_modifier(modifier: &str) -> Option<FieldFlags> {
        match modifier {
            "omitempty" => Some(FieldFlags::OMIT_EMPTY),
            "attr" => Some(FieldFlags::ATTR),
            "any" => Some(FieldFlags::ANY),
            "omit" => Some(FieldFlags::OMIT),
            _ => None,
        }
    }
}

/// Static per-field metadata emitted by the schema macros
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Rust field name
    pub name: &'static str,
    /// Wire specification: `[prefix:]name[,modifier...]`
    pub xmp: &'static str,
    /// Native tag used by non-XMP containers
    pub tag: Option<&'static str>,
    /// Container kind of the field type
    pub kind: FieldKind,
    /// Codec capabilities of the field type
    pub caps: Capabilities,
}

/// Resolved and validated field metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Rust field name
    pub name: &'static str,
    /// Namespace prefix (inherited from the schema when unqualified)
    pub prefix: &'static str,
    /// Local wire name
    pub local: &'static str,
    /// Native tag
    pub tag: Option<&'static str>,
    /// Container kind
    pub kind: FieldKind,
    /// Modifiers
    pub flags: FieldFlags,
    /// Codec capabilities
    pub caps: Capabilities,
}

impl FieldInfo {
    /// Qualified wire name (`prefix:local`)
    pub fn wire_name(&self) -> String {
        format!("{}:{}", self.prefix, self.local)
    }

    /// Whether the field answers to `prefix:local`
    pub fn matches(&self, prefix: &str, local: &str) -> bool {
        self.prefix == prefix && self.local == local
    }

    /// Whether the field is encoded as an attribute
    pub fn is_attr(&self) -> bool {
        self.flags.contains(FieldFlags::ATTR)
    }

    /// Whether the field is the namespace catch-all
    pub fn is_any(&self) -> bool {
        self.flags.contains(FieldFlags::ANY)
    }

    /// Whether the field is never encoded
    pub fn is_omitted(&self) -> bool {
        self.flags.contains(FieldFlags::OMIT)
    }
}

/// A type with reflected fields (namespace models and structures)
pub trait Schema {
    /// Identity used to cache the resolved field table
    fn type_key(&self) -> TypeId;

    /// Default namespace prefix for unqualified field names
    fn prefix(&self) -> &'static str;

    /// Field table in declaration order
    fn descriptors(&self) -> &'static [FieldDescriptor];

    /// Access a field by its Rust name
    fn field(&self, name: &str) -> Option<&dyn Field>;

    /// Mutable access to a field by its Rust name
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Field>;
}

/// Describe the fields of a schema instance in declaration order
///
/// The result is computed once per type and cached process-wide.
pub fn describe_fields<S: Schema + ?Sized>(schema: &S) -> XmpResult<&'static [FieldInfo]> {
    let key = schema.type_key();
    let cache = FIELD_CACHE.get_or_init(|| RwLock::new(HashMap::new()));

    if let Some(fields) = cache
        .read()
        .map_err(|_| XmpError::InternalError("Field cache lock poisoned".to_string()))?
        .get(&key)
    {
        return Ok(fields);
    }

    let resolved = resolve_fields(schema.prefix(), schema.descriptors())?;
    let mut guard = cache
        .write()
        .map_err(|_| XmpError::InternalError("Field cache lock poisoned".to_string()))?;
    // another thread may have won the race while we resolved
    let fields = *guard
        .entry(key)
        .or_insert_with(|| Box::leak(resolved.into_boxed_slice()));
    Ok(fields)
}

/// Find a field by wire name
pub fn find_field<S: Schema + ?Sized>(
    schema: &S,
    prefix: &str,
    local: &str,
) -> XmpResult<Option<&'static FieldInfo>> {
    Ok(describe_fields(schema)?
        .iter()
        .find(|f| !f.is_any() && f.matches(prefix, local)))
}

/// Find a field by native tag
pub fn find_tag<S: Schema + ?Sized>(
    schema: &S,
    tag: &str,
) -> XmpResult<Option<&'static FieldInfo>> {
    Ok(describe_fields(schema)?
        .iter()
        .find(|f| f.tag == Some(tag)))
}

fn resolve_fields(
    default_prefix: &'static str,
    descriptors: &'static [FieldDescriptor],
) -> XmpResult<Vec<FieldInfo>> {
    let mut fields: Vec<FieldInfo> = Vec::with_capacity(descriptors.len());

    for desc in descriptors {
        let info = resolve_field(default_prefix, desc)?;

        if let Some(dup) = fields
            .iter()
            .find(|f| !f.is_any() && !info.is_any() && f.matches(info.prefix, info.local))
        {
            return Err(XmpError::Schema(format!(
                "fields '{}' and '{}' share the wire name '{}'",
                dup.name,
                info.name,
                info.wire_name()
            )));
        }
        if let Some(tag) = info.tag {
            if let Some(dup) = fields.iter().find(|f| f.tag == Some(tag)) {
                return Err(XmpError::Schema(format!(
                    "fields '{}' and '{}' share the tag '{}'",
                    dup.name, info.name, tag
                )));
            }
        }
        if info.is_any() && fields.iter().any(|f| f.is_any()) {
            return Err(XmpError::Schema(format!(
                "field '{}' is a second catch-all field",
                info.name
            )));
        }
        fields.push(info);
    }
    Ok(fields)
}

fn resolve_field(
    default_prefix: &'static str,
    desc: &FieldDescriptor,
) -> XmpResult<FieldInfo> {
    let mut parts = desc.xmp.split(',');
    let wire = parts.next().unwrap_or_default().trim();
    let (prefix, local) = match wire.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => (default_prefix, wire),
    };
    if prefix.is_empty() || local.is_empty() || local.contains(':') {
        return Err(XmpError::Schema(format!(
            "field '{}' has malformed wire name '{}'",
            desc.name, wire
        )));
    }

    let mut flags = FieldFlags::NONE;
    for modifier in parts.map(str::trim).filter(|m| !m.is_empty()) {
        let flag = FieldFlags::from_modifier(modifier).ok_or_else(|| {
            XmpError::Schema(format!(
                "field '{}' has unknown modifier '{}'",
                desc.name, modifier
            ))
        })?;
        flags = flags | flag;
    }

    let conflict = |reason: &str| {
        Err(XmpError::Schema(format!(
            "field '{}' ({}): {}",
            desc.name, desc.xmp, reason
        )))
    };
    if flags.contains(FieldFlags::ANY) {
        if desc.kind != FieldKind::Raw {
            return conflict("'any' requires a raw node field");
        }
        if flags.intersects(FieldFlags::ATTR | FieldFlags::OMIT) {
            return conflict("'any' cannot be combined with 'attr' or 'omit'");
        }
    } else if desc.kind == FieldKind::Raw {
        return conflict("raw node fields must be declared 'any'");
    }
    if flags.contains(FieldFlags::ATTR) && !desc.caps.contains(Capabilities::ATTR_MARSHAL) {
        return conflict("'attr' on a type that cannot be encoded as attributes");
    }
    if desc.tag.map(str::is_empty).unwrap_or(false) {
        return conflict("empty native tag");
    }

    Ok(FieldInfo {
        name: desc.name,
        prefix,
        local,
        tag: desc.tag,
        kind: desc.kind,
        flags,
        caps: desc.caps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(name: &'static str, xmp: &'static str, kind: FieldKind) -> FieldDescriptor {
        FieldDescriptor {
            name,
            xmp,
            tag: None,
            kind,
            caps: Capabilities::TEXT | Capabilities::ATTR,
        }
    }

    #[test]
    fn test_resolve_prefix_inheritance() {
        static DESCS: [FieldDescriptor; 2] = [
            FieldDescriptor {
                name: "format",
                xmp: "format,omitempty",
                tag: Some("FMT"),
                kind: FieldKind::Scalar,
                caps: Capabilities::TEXT,
            },
            FieldDescriptor {
                name: "artist",
                xmp: "tiff:Artist,attr",
                tag: None,
                kind: FieldKind::Scalar,
                caps: Capabilities::ATTR,
            },
        ];
        let fields = resolve_fields("dc", &DESCS).unwrap();
        assert_eq!(fields[0].wire_name(), "dc:format");
        assert_eq!(fields[0].flags, FieldFlags::OMIT_EMPTY);
        assert_eq!(fields[0].tag, Some("FMT"));
        assert_eq!(fields[1].wire_name(), "tiff:Artist");
        assert!(fields[1].is_attr());
    }

    #[test]
    fn test_unknown_modifier_is_schema_error() {
        let d = desc("x", "dc:x,sometimes", FieldKind::Scalar);
        let err = resolve_field("dc", &d).unwrap_err();
        assert!(matches!(err, XmpError::Schema(_)));
    }

    #[test]
    fn test_conflicting_modifiers() {
        let d = desc("x", "dc:x,any", FieldKind::Scalar);
        assert!(resolve_field("dc", &d).is_err());

        let d = FieldDescriptor {
            caps: Capabilities::TREE,
            ..desc("x", "dc:x,attr", FieldKind::Ordered)
        };
        assert!(resolve_field("dc", &d).is_err());

        let d = desc("x", "dc:x,any,omit", FieldKind::Raw);
        assert!(resolve_field("dc", &d).is_err());
    }

    #[test]
    fn test_malformed_wire_name() {
        assert!(resolve_field("dc", &desc("x", ":x", FieldKind::Scalar)).is_err());
        assert!(resolve_field("dc", &desc("x", "dc:", FieldKind::Scalar)).is_err());
        assert!(resolve_field("dc", &desc("x", "a:b:c", FieldKind::Scalar)).is_err());
    }

    #[test]
    fn test_duplicate_wire_names() {
        static DESCS: [FieldDescriptor; 2] = [
            FieldDescriptor {
                name: "a",
                xmp: "dc:title",
                tag: None,
                kind: FieldKind::Scalar,
                caps: Capabilities::TEXT,
            },
            FieldDescriptor {
                name: "b",
                xmp: "title",
                tag: None,
                kind: FieldKind::Scalar,
                caps: Capabilities::TEXT,
            },
        ];
        assert!(matches!(
            resolve_fields("dc", &DESCS),
            Err(XmpError::Schema(_))
        ));
    }

    #[test]
    fn test_flags_debug() {
        let flags = FieldFlags::OMIT_EMPTY | FieldFlags::ATTR;
        assert_eq!(format!("{:?}", flags), "FieldFlags(OMIT_EMPTY | ATTR)");
        assert!(flags.contains(FieldFlags::ATTR));
        assert!(!flags.contains(FieldFlags::ANY));
    }
}
