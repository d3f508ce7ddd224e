//! Syntax layer for mgql.
//!
//! This crate provides:
//! - `ast`: Operation, field, selection set and argument types
//! - `generator`: Rendering an operation to query text

pub mod ast;
pub mod generator;

pub use ast::*;
pub use generator::{generate, Generator};
