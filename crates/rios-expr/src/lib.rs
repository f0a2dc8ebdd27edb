//! Text-level transpiler for calculation and branching logic expressions.
//!
//! REDCap formulas (`[field]`, `round(...)`, `(a)^(b)`, `<>`) are rewritten
//! into RIOS python expressions (`assessment["field"]`,
//! `rios.conversion.redcap.math.round_(...)`, `math.pow(a, b)`, `!=`) and
//! back. Expressions are never evaluated.
//!
//! Bare references resolve against a [`CalculationScope`]: a name already
//! registered as a calculation becomes `calculations["name"]`, anything
//! else `assessment["name"]`. Conversion must therefore run in row order.

mod error;
mod forward;
mod functions;
mod lexical;
mod power;
mod reverse;
mod scope;

pub use error::{ExpressionError, Result};
pub use forward::{calculation_to_target, trigger_to_target};
pub use functions::{FUNCTIONS, source_function, target_function};
pub use power::{rewrite_exponentiation, rewrite_power_calls};
pub use reverse::{expression_to_source, trigger_to_source};
pub use scope::{ASSESSMENT_SCOPE, CALCULATION_SCOPE, CalculationScope};
