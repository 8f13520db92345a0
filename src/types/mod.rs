//! XMP value types
//!
//! This module defines the value types stored in model fields beyond plain
//! scalars: alternative text, arrays, rationals, structured resources and
//! verbatim catch-all storage.

pub mod alt;
pub mod array;
pub mod rational;
pub mod raw;
pub mod resource;

pub use alt::{AltItem, AltString, X_DEFAULT};
pub use array::{Bag, Seq, StringArray, StringList};
pub use rational::Rational;
pub use raw::RawNodes;
pub use resource::{ResourceEvent, ResourceRef};
