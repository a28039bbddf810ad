#![doc = include_str!("../README.md")]

pub use frost_reflect as reflect;
