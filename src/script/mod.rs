//! Gesture scripts for replaying input against a scroller.
//!
//! A script is a JSON-lines file, one event per line:
//!
//! ```text
//! # fling toward the top, then grab the content again
//! {"event": "flick", "velocity": 2225}
//! {"event": "wait", "ms": 300}
//! {"event": "down"}
//! {"event": "drag", "delta": -12.5}
//! {"event": "up"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Time only moves on
//! `wait`; every other event is applied at the current instant.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to read or parse a gesture script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("Failed to read script {}: {source}", path.display())]
    Io {
        /// Script path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line is not a valid event.
    #[error("{}: line {line}: {reason}", path.display())]
    Parse {
        /// Script path.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// The script contains no events.
    #[error("Script {} contains no events", path.display())]
    Empty {
        /// Script path.
        path: PathBuf,
    },
}

/// One input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", deny_unknown_fields)]
pub enum ScriptEvent {
    /// Finger touches the content.
    Down,
    /// Finger lifts.
    Up,
    /// Finger drags the content.
    Drag {
        /// Offset change requested by the drag.
        delta: f64,
    },
    /// Finger releases with a raw flick velocity.
    Flick {
        /// Raw input-device velocity; positive scrolls toward lower offsets.
        velocity: f64,
    },
    /// Stop all motion.
    Stop,
    /// Spring back now if overscrolled.
    Correct,
    /// Replace the scroll range.
    Bounds {
        /// New lower bound.
        min: f64,
        /// New upper bound.
        max: f64,
    },
    /// Let `ms` milliseconds pass.
    Wait {
        /// Duration in milliseconds.
        ms: f64,
    },
}

/// An ordered list of [`ScriptEvent`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    events: Vec<ScriptEvent>,
}

impl Script {
    /// Script playing `events` in order.
    pub fn new(events: Vec<ScriptEvent>) -> Self {
        Self { events }
    }

    /// Events in playback order.
    pub fn events(&self) -> &[ScriptEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the script has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of all `wait` durations.
    pub fn total_wait_ms(&self) -> f64 {
        self.events
            .iter()
            .map(|event| match event {
                ScriptEvent::Wait { ms } => *ms,
                _ => 0.0,
            })
            .sum()
    }

    /// Read and parse the script at `path`.
    ///
    /// # Errors
    /// Returns `ScriptError::Io` if the file cannot be read, otherwise see
    /// [`Script::parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source, path)
    }

    /// Parse JSON-lines `source`; `path` is only used in error messages.
    ///
    /// # Errors
    /// Returns `ScriptError::Parse` for the first malformed line, or
    /// `ScriptError::Empty` if no event was found.
    pub fn parse(source: &str, path: &Path) -> Result<Self, ScriptError> {
        let mut events = Vec::new();

        for (index, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parse_error = |reason: String| ScriptError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                reason,
            };

            let event: ScriptEvent =
                serde_json::from_str(line).map_err(|e| parse_error(e.to_string()))?;
            validate_event(&event).map_err(parse_error)?;
            events.push(event);
        }

        if events.is_empty() {
            return Err(ScriptError::Empty {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(path = %path.display(), events = events.len(), "Parsed gesture script");
        Ok(Self { events })
    }
}

fn validate_event(event: &ScriptEvent) -> Result<(), String> {
    match *event {
        ScriptEvent::Wait { ms } if !ms.is_finite() || ms < 0.0 => {
            Err(format!("wait must be a non-negative duration (got {ms})"))
        }
        ScriptEvent::Drag { delta } if !delta.is_finite() => {
            Err(format!("drag delta must be finite (got {delta})"))
        }
        ScriptEvent::Flick { velocity } if !velocity.is_finite() => {
            Err(format!("flick velocity must be finite (got {velocity})"))
        }
        _ => Ok(()),
    }
}
