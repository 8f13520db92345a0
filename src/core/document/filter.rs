//! Namespace filters
//!
//! A filter expression is a comma separated list of `+prefix` (include),
//! `-prefix` (exclude) and bare group names (include every namespace of the
//! group), e.g. `+dc,-exif,image`.

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{parse_namespace_group, NamespaceGroup, Registry};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Include/exclude criteria for namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
    groups: Vec<NamespaceGroup>,
}

impl Filter {
    /// Parse a filter expression
    pub fn parse(expr: &str) -> XmpResult<Self> {
        let mut filter = Filter::default();
        for item in expr.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some(prefix) = item.strip_prefix('+') {
                filter.include.insert(prefix.trim().to_string());
            } else if let Some(prefix) = item.strip_prefix('-') {
                filter.exclude.insert(prefix.trim().to_string());
            } else {
                let group = parse_namespace_group(item).ok_or_else(|| {
                    XmpError::BadParam(format!("unknown namespace group '{}'", item))
                })?;
                if !filter.groups.contains(&group) {
                    filter.groups.push(group);
                }
            }
        }
        Ok(filter)
    }

    /// Include a namespace prefix
    pub fn include(mut self, prefix: impl Into<String>) -> Self {
        self.include.insert(prefix.into());
        self
    }

    /// Exclude a namespace prefix
    pub fn exclude(mut self, prefix: impl Into<String>) -> Self {
        self.exclude.insert(prefix.into());
        self
    }

    /// Include every namespace of a group
    pub fn group(mut self, group: NamespaceGroup) -> Self {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
        self
    }

    /// Whether no criteria are set
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && self.groups.is_empty()
    }

    /// Whether a namespace passes the filter
    pub fn accepts(&self, registry: &Registry, prefix: &str) -> bool {
        if self.exclude.contains(prefix) {
            return false;
        }
        if self.include.is_empty() && self.groups.is_empty() {
            return true;
        }
        if self.include.contains(prefix) {
            return true;
        }
        registry
            .get_namespace(prefix)
            .map(|ns| self.groups.iter().any(|g| ns.in_group(*g)))
            .unwrap_or(false)
    }
}

impl FromStr for Filter {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::parse(s)
    }
}
