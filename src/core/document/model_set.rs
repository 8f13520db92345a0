//! Ordered set of namespace models
//!
//! A [`ModelSet`] holds at most one model per namespace prefix, in the order
//! the models were attached, plus the properties no model claimed. It is the
//! content of a [`Document`](crate::Document) and of every pantry
//! [`Extension`](super::Extension).
//!
//! Properties are routed to models by prefix first. A property qualified with
//! a foreign prefix (`tiff:Artist` inside the EXIF model) is routed to the
//! model that declares it.

use crate::core::codec::{decode_property, encode_fields, is_syntax_attr, DecodeContext};
use crate::core::error::{XmpError, XmpResult};
use crate::core::field::{schema_lookup, schema_lookup_mut, Field, Navigable, PathEntries};
use crate::core::model::Model;
use crate::core::namespace::Registry;
use crate::core::node::{split_name, XmlNode};
use crate::core::reflect::{describe_fields, find_field};
use log::debug;

/// Namespace models attached to a document
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    models: Vec<Box<dyn Model>>,
    unknown: Vec<XmlNode>,
}

fn declares(model: &dyn Model, prefix: &str, local: &str) -> bool {
    matches!(find_field(model, prefix, local), Ok(Some(_)))
}

/// Whether every field of a model is empty
pub(crate) fn is_empty_model(model: &dyn Model) -> bool {
    match describe_fields(model) {
        Ok(fields) => fields
            .iter()
            .all(|info| model.field(info.name).map_or(true, |f| f.is_empty())),
        Err(_) => false,
    }
}

impl ModelSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no model is attached and no unknown property is kept
    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.unknown.is_empty()
    }

    /// Models in attachment order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Model> + '_ {
        self.models.iter().map(|m| m.as_ref())
    }

    /// Prefixes of the attached models in attachment order
    pub fn prefixes(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.namespace()).collect()
    }

    fn index_of(&self, prefix: &str) -> Option<usize> {
        self.models.iter().position(|m| m.namespace() == prefix)
    }

    /// Model attached for a namespace prefix
    pub fn find(&self, prefix: &str) -> Option<&dyn Model> {
        self.index_of(prefix).map(|i| self.models[i].as_ref())
    }

    /// Mutable model attached for a namespace prefix
    pub fn find_mut(&mut self, prefix: &str) -> Option<&mut dyn Model> {
        let index = self.index_of(prefix)?;
        Some(self.models[index].as_mut())
    }

    /// Attached model of type `T`
    pub fn find_as<T: Model>(&self) -> Option<&T> {
        self.models.iter().find_map(|m| m.downcast_ref::<T>())
    }

    /// Mutable attached model of type `T`
    pub fn find_as_mut<T: Model>(&mut self) -> Option<&mut T> {
        self.models.iter_mut().find_map(|m| m.downcast_mut::<T>())
    }

    /// Attach a model, replacing (and returning) the model of the same namespace
    pub fn add(&mut self, model: Box<dyn Model>) -> Option<Box<dyn Model>> {
        match self.index_of(model.namespace()) {
            Some(index) => Some(std::mem::replace(&mut self.models[index], model)),
            None => {
                self.push(model);
                None
            }
        }
    }

    fn push(&mut self, model: Box<dyn Model>) -> usize {
        debug!("attaching model '{}'", model.namespace());
        self.models.push(model);
        self.models.len() - 1
    }

    /// Find the model for a prefix, creating it from the registry if absent
    pub fn make(&mut self, registry: &Registry, prefix: &str) -> XmpResult<&mut dyn Model> {
        let index = match self.index_of(prefix) {
            Some(index) => index,
            None => {
                let model = registry.get_namespace(prefix)?.new_model()?;
                self.push(model)
            }
        };
        Ok(self.models[index].as_mut())
    }

    /// Find the model of type `T`, attaching a default instance if absent
    ///
    /// Fails with a conflict when another type already owns `T`'s namespace.
    pub fn make_as<T: Model + Default>(&mut self) -> XmpResult<&mut T> {
        let index = match self.models.iter().position(|m| m.is::<T>()) {
            Some(index) => index,
            None => {
                let model = T::default();
                if self.index_of(model.namespace()).is_some() {
                    return Err(XmpError::Conflict(format!(
                        "namespace '{}' is owned by another model type",
                        model.namespace()
                    )));
                }
                self.push(Box::new(model))
            }
        };
        self.models[index]
            .downcast_mut::<T>()
            .ok_or_else(|| XmpError::InternalError("model type changed while attaching".to_string()))
    }

    /// Detach the model of a namespace
    pub fn remove(&mut self, prefix: &str) -> Option<Box<dyn Model>> {
        let index = self.index_of(prefix)?;
        debug!("removing model '{}'", prefix);
        Some(self.models.remove(index))
    }

    /// Keep only the models for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&dyn Model) -> bool) {
        self.models.retain(|m| keep(m.as_ref()));
    }

    /// Properties no model claimed, kept verbatim
    pub fn unknown(&self) -> &[XmlNode] {
        &self.unknown
    }

    pub(crate) fn unknown_mut(&mut self) -> &mut Vec<XmlNode> {
        &mut self.unknown
    }

    /// Temporarily detach a model, remembering its position
    pub(crate) fn take(&mut self, prefix: &str) -> Option<(usize, Box<dyn Model>)> {
        let index = self.index_of(prefix)?;
        Some((index, self.models.remove(index)))
    }

    /// Re-attach a model detached with [`take`](Self::take)
    pub(crate) fn restore(&mut self, index: usize, model: Box<dyn Model>) {
        match self.index_of(model.namespace()) {
            // a hook attached a fresh instance meanwhile; the detached one wins
            Some(existing) => self.models[existing] = model,
            None => self.models.insert(index.min(self.models.len()), model),
        }
    }

    /// Model owning `prefix:local` without creating anything
    fn owner_of(&self, prefix: &str, local: &str) -> Option<usize> {
        self.index_of(prefix).or_else(|| {
            self.models
                .iter()
                .position(|m| declares(m.as_ref(), prefix, local))
        })
    }

    /// Model owning `prefix:local`, creating it from the registry when `create` is set
    fn position_for(
        &mut self,
        registry: &Registry,
        prefix: &str,
        local: &str,
        create: bool,
    ) -> XmpResult<Option<usize>> {
        if let Some(index) = self.index_of(prefix) {
            return Ok(Some(index));
        }
        if let Some(namespace) = registry
            .get_namespace(prefix)
            .ok()
            .filter(|n| n.has_model())
        {
            if !create {
                return Ok(None);
            }
            let model = namespace.new_model()?;
            return Ok(Some(self.push(model)));
        }
        if let Some(index) = self.owner_of(prefix, local) {
            return Ok(Some(index));
        }
        if !create {
            return Ok(None);
        }
        for namespace in registry.namespaces().filter(|n| n.has_model()) {
            if self.index_of(namespace.prefix()).is_some() {
                continue;
            }
            let model = namespace.new_model()?;
            if declares(model.as_ref(), prefix, local) {
                return Ok(Some(self.push(model)));
            }
        }
        Ok(None)
    }

    /// Model for an explicit owner namespace, creating it when `create` is set
    pub(crate) fn owner_mut(
        &mut self,
        registry: &Registry,
        owner: &str,
        create: bool,
    ) -> XmpResult<Option<&mut dyn Model>> {
        let index = match self.index_of(owner) {
            Some(index) => index,
            None if create => {
                let model = registry.get_namespace(owner)?.new_model()?;
                self.push(model)
            }
            None => return Ok(None),
        };
        Ok(Some(self.models[index].as_mut()))
    }

    /// Decode the properties (attributes and children) of an `rdf:Description`
    pub fn decode_description(
        &mut self,
        description: &XmlNode,
        cx: &mut DecodeContext<'_>,
    ) -> XmpResult<()> {
        for attr in &description.attrs {
            if is_syntax_attr(&attr.name) {
                continue;
            }
            let prop = XmlNode::with_value(attr.name.clone(), attr.value.clone());
            self.decode_one(&prop, cx)?;
        }
        for child in &description.children {
            self.decode_one(child, cx)?;
        }
        Ok(())
    }

    fn decode_one(&mut self, prop: &XmlNode, cx: &mut DecodeContext<'_>) -> XmpResult<()> {
        let (prefix, local) = split_name(&prop.name);
        let registry = cx.registry();
        let leftover = match self.position_for(registry, prefix, local, true)? {
            Some(index) => {
                let model = self.models[index].as_mut();
                let previous = cx.set_namespace(Some(model.namespace()));
                let result = decode_property(model, prop, cx);
                cx.set_namespace(previous);
                result?
            }
            None => Some(prop.clone()),
        };
        if let Some(node) = leftover {
            if cx.options().skip_unknown {
                debug!("dropping unknown property '{}'", node.name);
            } else {
                self.unknown.push(node);
            }
        }
        Ok(())
    }

    /// Encode every model and the unknown properties as children of `target`
    pub fn encode_into(&self, target: &mut XmlNode) -> XmpResult<()> {
        for model in &self.models {
            encode_fields(model.as_ref(), target, false)
                .map_err(|e| e.in_namespace(model.namespace()))?;
        }
        target.children.extend(self.unknown.iter().cloned());
        Ok(())
    }
}

impl Navigable for ModelSet {
    fn lookup(&self, prefix: &str, name: &str) -> XmpResult<Option<&dyn Field>> {
        match self.owner_of(prefix, name) {
            Some(index) => schema_lookup(self.models[index].as_ref(), prefix, name).map(Some),
            None => Ok(None),
        }
    }

    fn lookup_mut(
        &mut self,
        registry: &Registry,
        prefix: &str,
        name: &str,
        create: bool,
    ) -> XmpResult<Option<&mut dyn Field>> {
        match self.position_for(registry, prefix, name, create)? {
            Some(index) => schema_lookup_mut(self.models[index].as_mut(), prefix, name).map(Some),
            None if create => Err(XmpError::PathNotFound(format!(
                "no model for namespace '{}'",
                prefix
            ))),
            None => Ok(None),
        }
    }

    fn remove_namespace(&mut self, prefix: &str) -> XmpResult<bool> {
        Ok(self.remove(prefix).is_some())
    }

    fn checkpoint(&self) -> usize {
        self.models.len()
    }

    fn rollback(&mut self, checkpoint: usize) {
        for model in self.models.drain(checkpoint.min(self.models.len())..) {
            debug!("detaching model '{}' of a failed write", model.namespace());
        }
    }

    fn list(&self, base: &str, out: &mut PathEntries) -> XmpResult<()> {
        for model in &self.models {
            Navigable::list(model.as_ref(), base, out)
                .map_err(|e| e.in_namespace(model.namespace()))?;
        }
        Ok(())
    }
}

/// Equal when both hold equal non-empty models and the same unknown properties
impl PartialEq for ModelSet {
    fn eq(&self, other: &Self) -> bool {
        let populated = |set: &ModelSet| {
            set.models
                .iter()
                .filter(|m| !is_empty_model(m.as_ref()))
                .count()
        };
        populated(self) == populated(other)
            && self
                .models
                .iter()
                .filter(|m| !is_empty_model(m.as_ref()))
                .all(|m| {
                    other
                        .find(m.namespace())
                        .map_or(false, |o| m.eq_model(o))
                })
            && self.unknown == other.unknown
    }
}
