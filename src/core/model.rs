//! Namespace models
//!
//! A model is the typed schema of one metadata namespace (Dublin Core, EXIF,
//! ...). Models are declared with [`xmp_model!`](crate::xmp_model), which
//! generates the reflection and plumbing traits; the type then implements
//! [`Model`] itself, overriding the hooks it needs.

use crate::core::document::ModelSet;
use crate::core::error::XmpResult;
use crate::core::field::Navigable;
use crate::core::reflect::Schema;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;

/// Plumbing generated by `xmp_model!`
pub trait ModelBase {
    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Boxed deep copy
    fn clone_model(&self) -> Box<dyn Model>;

    /// Structural equality with another model
    fn eq_model(&self, other: &dyn Model) -> bool;
}

/// The typed schema of one namespace
pub trait Model: ModelBase + Schema + Navigable + fmt::Debug + Send + Sync + 'static {
    /// Namespace prefix of the model
    fn namespace(&self) -> &'static str {
        self.prefix()
    }

    /// Normalise a native tag before lookup (e.g. legacy frame ids, letter case)
    fn map_native_tag<'t>(&self, tag: &'t str) -> Cow<'t, str> {
        Cow::Borrowed(tag)
    }

    /// Inbound sync: pull values derived from sibling models into this one
    ///
    /// Implementations fill fields only when they are empty.
    fn sync_models(&mut self, _models: &ModelSet) -> XmpResult<()> {
        Ok(())
    }

    /// Outbound sync: push this model's values into the shared base namespaces
    ///
    /// Implementations fill target fields only when they are empty.
    fn sync_to_xmp(&self, _models: &mut ModelSet) -> XmpResult<()> {
        Ok(())
    }
}

impl dyn Model {
    /// Downcast to a concrete model type
    pub fn downcast_ref<T: Model>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably downcast to a concrete model type
    pub fn downcast_mut<T: Model>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Whether the model is of type `T`
    pub fn is<T: Model>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl Clone for Box<dyn Model> {
    fn clone(&self) -> Self {
        self.clone_model()
    }
}

impl PartialEq for dyn Model {
    fn eq(&self, other: &Self) -> bool {
        self.eq_model(other)
    }
}
