//! Schema declaration macros
//!
//! [`xmp_model!`](crate::xmp_model) declares a namespace model and
//! [`xmp_struct!`](crate::xmp_struct) a structure used as a field element.
//! Each field is written as `name: Type => "prefix:WireName,modifiers"`,
//! optionally followed by `tag "NATIVE"`. An unqualified wire name inherits
//! the prefix of the declaration; modifiers are `omitempty`, `attr`, `any`
//! and `omit`.
//!
//! ```rust
//! use xmpmodel::core::model::Model;
//! use xmpmodel::types::AltString;
//! use xmpmodel::xmp_model;
//!
//! xmp_model! {
//!     /// Photo ratings
//!     pub struct Ratings("xmp") {
//!         pub rating: Option<i64> => "Rating" tag "RATE",
//!         pub label: Option<String> => "xmp:Label,omitempty",
//!         pub title: AltString => "xmp:Title",
//!     }
//! }
//!
//! impl Model for Ratings {}
//! ```

/// Declare a namespace model
///
/// Generates the struct (deriving `Debug`, `Clone`, `Default`, `PartialEq`)
/// together with its `Schema`, `Navigable` and `ModelBase` implementations.
/// The `Model` implementation is written by hand.
#[macro_export]
macro_rules! xmp_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($prefix:literal) {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty => $xmp:literal $(tag $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $name {
            /// Namespace prefix of this model
            pub const PREFIX: &'static str = $prefix;
        }

        $crate::__xmp_schema! { $name, $prefix, [ $( $field : $ty => $xmp $(tag $tag)? ),* ] }

        impl $crate::core::model::ModelBase for $name {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn clone_model(&self) -> ::std::boxed::Box<dyn $crate::core::model::Model> {
                ::std::boxed::Box::new(self.clone())
            }

            fn eq_model(&self, other: &dyn $crate::core::model::Model) -> bool {
                other
                    .as_any()
                    .downcast_ref::<Self>()
                    .map_or(false, |other| other == self)
            }
        }
    };
}

/// Declare a structure element
///
/// Generates the struct with its `Schema` and `Navigable` implementations
/// and an `Element` implementation using the generic structure codec.
/// With a leading `@custom` the `Element` implementation is left to the
/// caller, for types with their own element encoding.
#[macro_export]
macro_rules! xmp_struct {
    (
        @custom
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($prefix:literal) {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty => $xmp:literal $(tag $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        $crate::__xmp_schema! { $name, $prefix, [ $( $field : $ty => $xmp $(tag $tag)? ),* ] }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($prefix:literal) {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty => $xmp:literal $(tag $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $crate::xmp_struct! {
            @custom
            $(#[$meta])*
            $vis struct $name($prefix) {
                $( $(#[$fmeta])* $fvis $field : $ty => $xmp $(tag $tag)? ),*
            }
        }

        impl $crate::core::field::Element for $name {
            const KIND: $crate::core::reflect::FieldKind = $crate::core::reflect::FieldKind::Struct;
            const CAPABILITIES: $crate::core::reflect::Capabilities =
                $crate::core::reflect::Capabilities::TREE
                    .union($crate::core::reflect::Capabilities::ATTR);

            fn to_text(&self) -> $crate::XmpResult<::std::string::String> {
                ::std::result::Result::Err($crate::XmpError::Marshal(::std::format!(
                    "{} is a structure without a text form",
                    ::std::stringify!($name)
                )))
            }

            fn from_text(_text: &str) -> $crate::XmpResult<Self> {
                ::std::result::Result::Err($crate::XmpError::Unmarshal(::std::format!(
                    "{} cannot be read from text",
                    ::std::stringify!($name)
                )))
            }

            fn encode_element(
                &self,
                name: &str,
                as_attr: bool,
            ) -> $crate::XmpResult<$crate::core::node::XmlNode> {
                $crate::core::codec::encode_struct(self, name, as_attr)
            }

            fn decode_element(
                node: &$crate::core::node::XmlNode,
                cx: &mut $crate::core::codec::DecodeContext<'_>,
            ) -> $crate::XmpResult<Self> {
                $crate::core::codec::decode_struct(node, cx)
            }

            fn navigable(&self) -> ::std::option::Option<&dyn $crate::core::field::Navigable> {
                ::std::option::Option::Some(self)
            }

            fn navigable_mut(
                &mut self,
            ) -> ::std::option::Option<&mut dyn $crate::core::field::Navigable> {
                ::std::option::Option::Some(self)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xmp_tag {
    () => {
        ::std::option::Option::None
    };
    ($tag:literal) => {
        ::std::option::Option::Some($tag)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __xmp_schema {
    ($name:ident, $prefix:literal, [ $( $field:ident : $ty:ty => $xmp:literal $(tag $tag:literal)? ),* ]) => {
        impl $crate::core::reflect::Schema for $name {
            fn type_key(&self) -> ::std::any::TypeId {
                ::std::any::TypeId::of::<Self>()
            }

            fn prefix(&self) -> &'static str {
                $prefix
            }

            fn descriptors(&self) -> &'static [$crate::core::reflect::FieldDescriptor] {
                const DESCRIPTORS: &[$crate::core::reflect::FieldDescriptor] = &[
                    $(
                        $crate::core::reflect::FieldDescriptor {
                            name: ::std::stringify!($field),
                            xmp: $xmp,
                            tag: $crate::__xmp_tag!($($tag)?),
                            kind: <$ty as $crate::core::field::FieldType>::KIND,
                            caps: <$ty as $crate::core::field::FieldType>::CAPABILITIES,
                        },
                    )*
                ];
                DESCRIPTORS
            }

            #[allow(unused_variables)]
            fn field(&self, name: &str) -> ::std::option::Option<&dyn $crate::core::field::Field> {
                match name {
                    $(
                        ::std::stringify!($field) => ::std::option::Option::Some(
                            &self.$field as &dyn $crate::core::field::Field,
                        ),
                    )*
                    _ => ::std::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::std::option::Option<&mut dyn $crate::core::field::Field> {
                match name {
                    $(
                        ::std::stringify!($field) => ::std::option::Option::Some(
                            &mut self.$field as &mut dyn $crate::core::field::Field,
                        ),
                    )*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl $crate::core::field::Navigable for $name {
            fn lookup(
                &self,
                prefix: &str,
                name: &str,
            ) -> $crate::XmpResult<::std::option::Option<&dyn $crate::core::field::Field>> {
                $crate::core::field::schema_lookup(self, prefix, name).map(::std::option::Option::Some)
            }

            fn lookup_mut(
                &mut self,
                _registry: &$crate::core::namespace::Registry,
                prefix: &str,
                name: &str,
                _create: bool,
            ) -> $crate::XmpResult<::std::option::Option<&mut dyn $crate::core::field::Field>> {
                $crate::core::field::schema_lookup_mut(self, prefix, name)
                    .map(::std::option::Option::Some)
            }

            fn list(
                &self,
                base: &str,
                out: &mut $crate::core::field::PathEntries,
            ) -> $crate::XmpResult<()> {
                $crate::core::field::schema_list(self, base, out)
            }
        }
    };
}
