//! Query planning for mgql.
//!
//! This crate provides:
//! - `planner`: Building the field tree for a model and its relationships
//! - `compiler`: Planning and rendering in one call
//! - `request`: Operation options for the standard store requests

pub mod compiler;
pub mod planner;
pub mod request;

pub use compiler::compile;
pub use planner::{OperationOptions, Planner};
pub use request::Request;
