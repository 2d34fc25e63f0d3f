//! Pipeline stages and the rules for moving between them.

use std::fmt;

use crate::{EngineError, EngineResult};

/// Where a context sits in the pipeline. Ordered: a later stage compares
/// greater.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Stage {
    Parsed,
    Checked,
    BinaryGenerated,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Parsed, Stage::Checked, Stage::BinaryGenerated];

    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Parsed => "parsed",
            Stage::Checked => "checked",
            Stage::BinaryGenerated => "binary-generated",
        }
    }

    /// Trees may be rewritten at every stage before emission.
    pub const fn allows_edits(self) -> bool {
        !matches!(self, Stage::BinaryGenerated)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The current stage plus the transition rules.
///
/// Forward moves go through [`plan`](Self::plan) one step at a time;
/// nothing moves a context backward. A recheck stays at `Checked`.
#[derive(Debug)]
pub struct StageController {
    current: Stage,
}

impl Default for StageController {
    fn default() -> Self {
        StageController::new()
    }
}

impl StageController {
    pub fn new() -> Self {
        StageController {
            current: Stage::Parsed,
        }
    }

    #[inline]
    pub fn current(&self) -> Stage {
        self.current
    }

    /// Stages to pass through, in order, to reach `target`. Empty when
    /// already there.
    pub fn plan(&self, target: Stage) -> EngineResult<Vec<Stage>> {
        if target < self.current {
            return Err(self.violation("move back to an earlier stage"));
        }
        Ok(Stage::ALL
            .into_iter()
            .filter(|&stage| stage > self.current && stage <= target)
            .collect())
    }

    /// Reject `operation` unless the tree may still be rewritten.
    pub fn ensure_editable(&self, operation: &'static str) -> EngineResult<()> {
        if self.current.allows_edits() {
            Ok(())
        } else {
            Err(self.violation(operation))
        }
    }

    /// Recheck redoes semantic analysis, so there must be a completed one
    /// to redo, and emission must not have happened yet.
    pub fn ensure_recheckable(&self) -> EngineResult<()> {
        if self.current == Stage::Checked {
            Ok(())
        } else {
            Err(self.violation("recheck"))
        }
    }

    pub(crate) fn enter(&mut self, stage: Stage) {
        if stage != self.current {
            tracing::debug!(from = %self.current, to = %stage, "stage transition");
        }
        self.current = stage;
    }

    fn violation(&self, operation: &'static str) -> EngineError {
        EngineError::StageViolation {
            operation,
            stage: self.current,
        }
    }
}

#[cfg(test)]
mod tests;
