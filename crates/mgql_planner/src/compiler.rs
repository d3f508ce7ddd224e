//! Model to query text compilation.

use crate::planner::{OperationOptions, Planner};
use mgql_core::{Config, ModelDescription, ModelRegistry, Result};

/// Plans an operation for `model` and renders it.
pub fn compile<R: ModelRegistry + ?Sized>(
    model: &ModelDescription,
    registry: &R,
    options: &OperationOptions,
    config: &Config,
) -> Result<String> {
    let operation = Planner::new(registry, config).plan(model, options)?;
    Ok(mgql_syntax::generate(&operation))
}
