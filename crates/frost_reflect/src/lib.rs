#![doc = include_str!("../README.md")]

pub mod impls;
pub mod info;
pub mod registry;
pub mod serial;
pub mod value;

mod reflection;

pub use reflection::{PING_REGISTER_STORAGE, Reflect};
pub use registry::{Describe, TypeRegistry, TypeRegistryArc};
pub use value::{AnyBox, AnyMut, AnyRef, AnyValue, CastError, Walker};

#[cfg(feature = "auto_register")]
pub use inventory;
