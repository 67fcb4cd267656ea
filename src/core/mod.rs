//! Core batch operator module
//!
//! Provides the verify/copy/delete/move operator, its audit logs and
//! status snapshot, and JSON batch plans that drive it.

mod log;
mod operator;
mod plan;
#[cfg(test)]
mod testing;

pub use log::*;
pub use operator::*;
pub use plan::*;
