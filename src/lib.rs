//! # FileBatch - Audited Batch File Operations
//!
//! FileBatch verifies, copies, deletes and moves explicit lists of files
//! between two directories. Every call appends per-file records and status
//! messages to logs owned by the operator, and every call resolves to a
//! status instead of an error: a failure on one file never aborts the rest
//! of the batch.
//!
//! ## Quick Start
//!
//! ```no_run
//! use filebatch::core::FileBatchOperator;
//!
//! let mut operator = FileBatchOperator::new();
//! let files = ["report.csv", "summary.pdf"];
//!
//! if operator.move_files(&files, "/data/outbox", "/data/archive", false) {
//!     println!("moved");
//! }
//!
//! print!("{}", operator.status().summary());
//! ```
//!
//! ## Verification
//!
//! Verify distinguishes "checked and failed" from "could not check":
//!
//! ```no_run
//! use filebatch::core::{FileBatchOperator, VerifyOutcome};
//!
//! let mut operator = FileBatchOperator::new();
//! match operator.verify(&["a.txt", "b.txt"], "/data/inbox", true) {
//!     VerifyOutcome::Checked { passed, found, total } => {
//!         println!("{found}/{total} present, passed = {passed}");
//!     }
//!     VerifyOutcome::ParamsMissing => println!("nothing to check"),
//! }
//! ```
//!
//! ## Batch Plans
//!
//! ```no_run
//! use filebatch::core::{BatchPlan, FileBatchOperator};
//! use std::path::Path;
//!
//! let plan = BatchPlan::load(Path::new("nightly.json")).unwrap();
//! let report = FileBatchOperator::new().run_plan(&plan);
//! println!("plan success: {}", report.success);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;

// Re-export commonly used types
pub use crate::core::{FileBatchOperator, StatusSnapshot, VerifyOutcome};
pub use error::{FileBatchError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use filebatch::prelude::*;
    //! ```

    pub use crate::config::Settings;
    pub use crate::core::{
        Action, BatchPlan, BatchStep, FileBatchOperator, OperationRecord, PlanReport,
        StatusFiles, StatusSnapshot, VerifyOutcome,
    };
    pub use crate::error::{FileBatchError, Result};
    pub use crate::fs::{CopyOptions, FileSystem, LocalFileSystem};
}
