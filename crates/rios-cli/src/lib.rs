//! Library components of the `rios` command line converter.

pub mod documents;
pub mod logging;
pub mod pipeline;
