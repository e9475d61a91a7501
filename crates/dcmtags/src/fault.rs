//! Fault injection
//!
//! With `--inject-errors`, the file `./dcm_inject_error` holds the id of one
//! [`Stage`] that is forced to fail. This exercises the recovery paths
//! without crafting broken input.

use crate::error::{Result, Stage, TagsError};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultInjector {
    armed: Option<Stage>,
}

impl FaultInjector {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn failing(stage: Stage) -> Self {
        Self { armed: Some(stage) }
    }

    /// Read the stage id from `path`. A missing file or an id that names no
    /// stage leaves every stage alone.
    pub fn from_file(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "No fault injection file");
                return Self::disabled();
            },
        };
        let armed = text.trim().parse::<u8>().ok().and_then(Stage::from_id);
        match armed {
            Some(stage) => warn!(stage = %stage, id = stage.id(), "Fault injection armed"),
            None => debug!(content = text.trim(), "Fault injection file names no stage"),
        }
        Self { armed }
    }

    pub fn triggers(&self, stage: Stage) -> bool {
        self.armed == Some(stage)
    }

    /// Fail with [`TagsError::Injected`] when `stage` is armed.
    pub fn check(&self, stage: Stage) -> Result<()> {
        if self.triggers(stage) {
            return Err(TagsError::injected(stage));
        }
        Ok(())
    }
}
