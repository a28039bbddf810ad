//! Type descriptors: the data model the registry hands out.
//!
//! [`TypeInfo`] is the immutable identity of a type, [`TypeDescriptor`] wraps
//! it with the mutable description (display name, [`MemberDescriptor`] list,
//! [`PropertyBag`], custom codecs) and the erased dispatch table.

mod descriptor;
mod member;
mod property_bag;
mod type_info;

pub use descriptor::{TypeDescriptor, TypeRef, prop};
pub use member::{MemberAccess, MemberDescriptor};
pub use property_bag::PropertyBag;
pub use type_info::TypeInfo;

pub(crate) use member::FieldAccess;
