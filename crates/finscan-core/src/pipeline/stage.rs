//! Pipeline stages and per-stage timing.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Stage of a pipeline run, in execution order.
///
/// A run moves `Received → Preprocessing → Recognizing → Extracting →
/// Normalized`; a failure names the stage it stopped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Preprocessing,
    Recognizing,
    Extracting,
    Normalized,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Preprocessing => "preprocessing",
            Stage::Recognizing => "recognizing",
            Stage::Extracting => "extracting",
            Stage::Normalized => "normalized",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall time spent in one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: Stage,
    pub elapsed_ms: u64,
}

impl StageTiming {
    pub(crate) fn since(stage: Stage, start: Instant) -> Self {
        Self {
            stage,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert!(Stage::Received < Stage::Preprocessing);
        assert!(Stage::Preprocessing < Stage::Recognizing);
        assert!(Stage::Extracting < Stage::Normalized);
        assert_eq!(Stage::Recognizing.to_string(), "recognizing");
    }
}
