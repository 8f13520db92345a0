//! Path addressed reads and writes
//!
//! [`PathValue`] carries a path, a value and the [`SetFlags`] selecting the
//! write semantics. Paths are resolved one segment at a time: the first
//! segment against the document's models, later segments against the
//! structure or pantry extension held by the previous slot.
//!
//! | flags            | slot exists         | slot missing        |
//! |------------------|---------------------|---------------------|
//! | `CREATE`         | conflict            | create              |
//! | `REPLACE`        | overwrite           | conflict            |
//! | `MERGE`/`DEFAULT`| overwrite           | create              |
//! | `APPEND`         | add element         | add element         |
//! | `DELETE`         | remove              | no-op               |
//!
//! `APPEND` without a `[lang]` selector on alternative text targets the
//! default entry, so it only succeeds while the field is empty (or, with
//! `UNIQUE`, when the default already holds the same text).
//!
//! A write that fails leaves the document as it was: models and containers
//! created for it are removed again.

use super::ModelSet;
use crate::core::error::{XmpError, XmpResult};
use crate::core::field::{schema_lookup_mut, Field, Navigable};
use crate::core::namespace::Registry;
use crate::core::reflect::bitset;
use crate::core::xpath::{Path, PathSegment, Selector};
use log::trace;
use std::collections::HashMap;
use std::str::FromStr;

bitset! {
    /// Semantics of a path write
    SetFlags {
        /// Create the slot; fail if it holds a value
        CREATE = 1,
        /// Overwrite the slot; fail if it is empty
        REPLACE = 1 << 1,
        /// Add an element to an array or alternative text
        APPEND = 1 << 2,
        /// With `APPEND`, skip elements that are already present
        UNIQUE = 1 << 3,
        /// Remove the slot
        DELETE = 1 << 4,
    }
}

impl SetFlags {
    /// Create if absent, overwrite otherwise
    pub const MERGE: SetFlags = SetFlags::CREATE.union(SetFlags::REPLACE);
    /// Semantics used when no flag is given
    pub const DEFAULT: SetFlags = SetFlags::MERGE;

    /// The flags, or [`DEFAULT`](Self::DEFAULT) when none is set
    pub fn effective(self) -> SetFlags {
        if self.is_empty() {
            SetFlags::DEFAULT
        } else {
            self
        }
    }
}

impl FromStr for SetFlags {
    type Err = XmpError;

    /// Parse a list such as `create,replace` or `append|unique`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = SetFlags::NONE;
        for name in s
            .split(|c| c == ',' || c == '|')
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            flags = flags
                | match name.to_ascii_lowercase().as_str() {
                    "create" => SetFlags::CREATE,
                    "replace" => SetFlags::REPLACE,
                    "append" => SetFlags::APPEND,
                    "unique" => SetFlags::UNIQUE,
                    "delete" => SetFlags::DELETE,
                    "merge" | "default" => SetFlags::MERGE,
                    _ => return Err(XmpError::BadParam(format!("unknown set flag '{}'", name))),
                };
        }
        Ok(flags)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SetFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

#[cfg(feature = "serde")]
fn no_flags(flags: &SetFlags) -> bool {
    flags.is_empty()
}

/// A value addressed by path
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PathValue {
    /// Path expression, e.g. `dc:title[en]`
    pub path: String,
    /// Namespace (prefix or URI) of the model that owns the first segment
    ///
    /// Used to place foreign-qualified fields (`tiff:Artist` held by the
    /// `exif` model) and to create models that are not attached yet.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub namespace: Option<String>,
    /// Text value
    pub value: String,
    /// Write semantics; empty means [`SetFlags::DEFAULT`]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "no_flags"))]
    pub flags: SetFlags,
}

impl PathValue {
    /// Value with default (merge) semantics
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace: None,
            value: value.into(),
            flags: SetFlags::NONE,
        }
    }

    /// Removal of the addressed slot
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(path, "").with_flags(SetFlags::DELETE)
    }

    /// Replace the write semantics
    pub fn with_flags(mut self, flags: SetFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the owning namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Flattened document content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct PathValueList(Vec<PathValue>);

impl PathValueList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries
    pub fn iter(&self) -> std::slice::Iter<'_, PathValue> {
        self.0.iter()
    }

    /// Entry for a path
    pub fn get(&self, path: &str) -> Option<&PathValue> {
        self.0.iter().find(|v| v.path == path)
    }

    /// Add an entry
    pub fn push(&mut self, value: PathValue) {
        self.0.push(value);
    }

    /// Consume into the entries
    pub fn into_inner(self) -> Vec<PathValue> {
        self.0
    }

    /// Changes turning `self` into `other`
    ///
    /// Added entries carry `CREATE`, changed entries `REPLACE` and removed
    /// entries `DELETE`. Removals come last, in reverse order, so that
    /// applying the result in order never shifts an index still to be removed.
    pub fn diff(&self, other: &PathValueList) -> PathValueList {
        let before: HashMap<&str, &PathValue> =
            self.0.iter().map(|v| (v.path.as_str(), v)).collect();
        let after: HashMap<&str, &PathValue> =
            other.0.iter().map(|v| (v.path.as_str(), v)).collect();

        let mut changes = PathValueList::new();
        for value in &other.0 {
            match before.get(value.path.as_str()) {
                None => changes.push(value.clone().with_flags(SetFlags::CREATE)),
                Some(old) if old.value != value.value => {
                    changes.push(value.clone().with_flags(SetFlags::REPLACE))
                }
                Some(_) => {}
            }
        }
        for value in self.0.iter().rev() {
            if !after.contains_key(value.path.as_str()) {
                changes.push(value.clone().with_flags(SetFlags::DELETE));
            }
        }
        changes
    }

    /// JSON array of the entries
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> XmpResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| XmpError::SerializationError(format!("JSON encoding error: {}", e)))
    }
}

impl IntoIterator for PathValueList {
    type Item = PathValue;
    type IntoIter = std::vec::IntoIter<PathValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PathValueList {
    type Item = &'a PathValue;
    type IntoIter = std::slice::Iter<'a, PathValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<PathValue> for PathValueList {
    fn from_iter<I: IntoIterator<Item = PathValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn not_found(path: &Path) -> XmpError {
    XmpError::PathNotFound(path.to_string())
}

/// Read the text addressed by `path`
pub(crate) fn get_value(root: &dyn Navigable, path: &Path) -> XmpResult<String> {
    if path.is_namespace() {
        return Err(XmpError::BadXPath(format!(
            "'{}' addresses a namespace, not a value",
            path
        )));
    }
    let segments = path.segments();
    let mut current = root;
    for (i, segment) in segments.iter().enumerate() {
        let field = current
            .lookup(&segment.prefix, &segment.name)?
            .ok_or_else(|| not_found(path))?;
        if i + 1 == segments.len() {
            return field.get(&segment.selector)?.ok_or_else(|| not_found(path));
        }
        current = field.child(&segment.selector).ok_or_else(|| not_found(path))?;
    }
    Err(not_found(path))
}

/// Write a value into a model set
pub(crate) fn set_value(
    models: &mut ModelSet,
    registry: &Registry,
    value: &PathValue,
) -> XmpResult<()> {
    let path: Path = value.path.parse()?;
    let flags = value.flags.effective();
    trace!("set {} = '{}' {:?}", path, value.value, flags);

    let result = match value.namespace.as_deref() {
        Some(owner) if !path.first().is_namespace() => {
            let owner = resolve_owner(registry, owner)?;
            set_owned(models, registry, &owner, path.segments(), &value.value, flags)
        }
        _ => set_in(models, registry, path.segments(), &value.value, flags),
    };
    result.map_err(|e| e.in_namespace(path.namespace()))
}

fn resolve_owner(registry: &Registry, namespace: &str) -> XmpResult<String> {
    if registry.contains(namespace) {
        return Ok(namespace.to_string());
    }
    registry
        .namespace_by_uri(namespace)
        .map(|n| n.prefix().to_string())
        .ok_or_else(|| XmpError::NotFound(format!("Unknown namespace '{}'", namespace)))
}

fn creates_owner(flags: SetFlags) -> bool {
    !flags.contains(SetFlags::DELETE) && flags.intersects(SetFlags::CREATE | SetFlags::APPEND)
}

fn missing(flags: SetFlags, segment: &PathSegment) -> XmpResult<()> {
    if flags.contains(SetFlags::DELETE) {
        return Ok(());
    }
    Err(XmpError::Conflict(format!("'{}' does not exist", segment)))
}

fn set_owned(
    models: &mut ModelSet,
    registry: &Registry,
    owner: &str,
    segments: &[PathSegment],
    value: &str,
    flags: SetFlags,
) -> XmpResult<()> {
    let Some((segment, rest)) = segments.split_first() else {
        return Err(XmpError::BadXPath("Empty path".to_string()));
    };
    let checkpoint = models.checkpoint();
    let result = match models.owner_mut(registry, owner, creates_owner(flags)) {
        Ok(Some(model)) => schema_lookup_mut(model, &segment.prefix, &segment.name)
            .and_then(|field| apply_segment(field, registry, segment, rest, value, flags)),
        Ok(None) => missing(flags, segment),
        Err(err) => Err(err),
    };
    if result.is_err() {
        models.rollback(checkpoint);
    }
    result
}

fn set_in(
    nav: &mut dyn Navigable,
    registry: &Registry,
    segments: &[PathSegment],
    value: &str,
    flags: SetFlags,
) -> XmpResult<()> {
    let Some((segment, rest)) = segments.split_first() else {
        return Err(XmpError::BadXPath("Empty path".to_string()));
    };
    if segment.is_namespace() {
        if !flags.contains(SetFlags::DELETE) {
            return Err(XmpError::BadXPath(format!(
                "'{}' addresses a namespace, which can only be deleted",
                segment
            )));
        }
        nav.remove_namespace(&segment.prefix)?;
        return Ok(());
    }
    let checkpoint = nav.checkpoint();
    let result = match nav.lookup_mut(registry, &segment.prefix, &segment.name, creates_owner(flags)) {
        Ok(Some(field)) => apply_segment(field, registry, segment, rest, value, flags),
        Ok(None) => missing(flags, segment),
        Err(err) => Err(err),
    };
    if result.is_err() {
        nav.rollback(checkpoint);
    }
    result
}

fn apply_segment(
    field: &mut dyn Field,
    registry: &Registry,
    segment: &PathSegment,
    rest: &[PathSegment],
    value: &str,
    flags: SetFlags,
) -> XmpResult<()> {
    if rest.is_empty() {
        return apply_leaf(field, segment, value, flags);
    }
    let create = !flags.contains(SetFlags::DELETE) && flags.contains(SetFlags::CREATE);
    let was_empty = field.is_empty();
    let len = field.len();
    let result = match field.child_mut(&segment.selector, create) {
        Some(child) => set_in(child, registry, rest, value, flags),
        None => missing(flags, segment),
    };
    // drop the container created for a write that failed further down
    if result.is_err() {
        if was_empty {
            field.clear();
        } else if field.len() > len {
            field.remove(&Selector::Index(len));
        }
    }
    result
}

fn apply_leaf(
    field: &mut dyn Field,
    segment: &PathSegment,
    value: &str,
    flags: SetFlags,
) -> XmpResult<()> {
    let selector = &segment.selector;
    if flags.contains(SetFlags::DELETE) {
        field.remove(selector);
        return Ok(());
    }
    if flags.contains(SetFlags::APPEND) {
        let lang = match selector {
            Selector::Lang(lang) => Some(lang.as_str()),
            _ => None,
        };
        field.append(value, lang, flags.contains(SetFlags::UNIQUE))?;
        return Ok(());
    }

    let exists = field.contains(selector);
    if exists && !flags.contains(SetFlags::REPLACE) {
        return Err(XmpError::Conflict(format!("'{}' already has a value", segment)));
    }
    if !exists && !flags.contains(SetFlags::CREATE) {
        return Err(XmpError::Conflict(format!("'{}' does not exist", segment)));
    }
    field.set(selector, value)
}
