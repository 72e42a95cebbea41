//! Core types shared across ehrtest facilities
//!
//! This crate provides foundational types used by the comparator, the
//! configuration layer and the logging facility:
//!
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
pub mod sensitive;

pub use sensitive::Sensitive;
