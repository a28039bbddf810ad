//! Built-in [`Reflect`](crate::Reflect) implementations.
//!
//! Scalars and `String` are leaf codecs, the containers in
//! [`containers`](self) are generic shapes, and
//! [`impl_reflect_enum!`](crate::impl_reflect_enum) covers unit-variant
//! enums. [`AnyValue`](crate::AnyValue) gets a name-tagged dynamic codec.

mod any_value;
mod containers;
mod enums;
mod scalar;
mod string;
