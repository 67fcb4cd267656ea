//! Batch plans
//!
//! A plan is a JSON list of operations run in order on one operator, so a
//! single status snapshot covers the whole sequence:
//!
//! ```json
//! {
//!   "continue_on_failure": false,
//!   "steps": [
//!     { "op": "verify", "files": ["a.csv"], "source": "/inbox", "require_all": true },
//!     { "op": "move", "files": ["a.csv"], "source": "/inbox", "destination": "/archive" }
//!   ]
//! }
//! ```

use crate::core::operator::FileBatchOperator;
use crate::error::{FileBatchError, IoResultExt, Result};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One operation in a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum BatchStep {
    /// Existence check
    Verify {
        /// File names to look for
        files: Vec<String>,
        /// Directory the names are resolved against
        source: PathBuf,
        /// Pass only when every file is present
        #[serde(default)]
        require_all: bool,
    },
    /// Copy between directories
    Copy {
        /// File names to copy
        files: Vec<String>,
        /// Directory to copy from
        source: PathBuf,
        /// Directory to copy into
        destination: PathBuf,
        /// Replace files already present in `destination`
        #[serde(default)]
        overwrite: bool,
    },
    /// Delete from a directory
    Delete {
        /// File names to delete
        files: Vec<String>,
        /// Directory holding the files
        source: PathBuf,
    },
    /// Copy, confirm, then delete the originals
    Move {
        /// File names to move
        files: Vec<String>,
        /// Directory to move from
        source: PathBuf,
        /// Directory to move into
        destination: PathBuf,
        /// Replace files already present in `destination`
        #[serde(default)]
        overwrite: bool,
    },
}

impl BatchStep {
    /// Operation name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Verify { .. } => "verify",
            Self::Copy { .. } => "copy",
            Self::Delete { .. } => "delete",
            Self::Move { .. } => "move",
        }
    }
}

/// Ordered list of operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    /// Keep going after a step that does not pass
    #[serde(default)]
    pub continue_on_failure: bool,
    /// Steps in execution order
    pub steps: Vec<BatchStep>,
}

impl BatchPlan {
    /// Parse a plan from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let plan: Self =
            serde_json::from_str(json).map_err(|e| FileBatchError::plan(e.to_string()))?;
        if plan.steps.is_empty() {
            return Err(FileBatchError::plan("plan has no steps"));
        }
        Ok(plan)
    }

    /// Load a plan from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        Self::from_json(&content)
    }
}

/// Outcome of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Position in the plan
    pub index: usize,
    /// Operation name
    pub op: String,
    /// `None` when a verify step could not be determined
    pub passed: Option<bool>,
}

/// Outcome of a whole plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    /// Executed steps
    pub steps: Vec<StepReport>,
    /// Every executed step passed and none were skipped
    pub success: bool,
    /// Steps not run because an earlier one failed
    pub skipped: usize,
}

impl<F: FileSystem> FileBatchOperator<F> {
    /// Run one plan step; `None` for an undetermined verify
    pub fn run_step(&mut self, step: &BatchStep) -> Option<bool> {
        match step {
            BatchStep::Verify {
                files,
                source,
                require_all,
            } => self.verify(files, source, *require_all).passed(),
            BatchStep::Copy {
                files,
                source,
                destination,
                overwrite,
            } => Some(self.copy(files, source, destination, *overwrite)),
            BatchStep::Delete { files, source } => Some(self.delete(files, source)),
            BatchStep::Move {
                files,
                source,
                destination,
                overwrite,
            } => Some(self.move_files(files, source, destination, *overwrite)),
        }
    }

    /// Run every step of `plan` in order
    pub fn run_plan(&mut self, plan: &BatchPlan) -> PlanReport {
        let mut steps = Vec::with_capacity(plan.steps.len());
        let mut success = true;

        for (index, step) in plan.steps.iter().enumerate() {
            let passed = self.run_step(step);
            steps.push(StepReport {
                index,
                op: step.name().to_string(),
                passed,
            });

            if passed != Some(true) {
                success = false;
                warn!(index, op = step.name(), "plan step did not pass");
                if !plan.continue_on_failure {
                    break;
                }
            }
        }

        let skipped = plan.steps.len() - steps.len();
        info!(executed = steps.len(), skipped, success, "plan finished");

        PlanReport {
            steps,
            success,
            skipped,
        }
    }
}
