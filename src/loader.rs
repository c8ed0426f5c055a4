//! Bulk loader
//!
//! Populates a VFS from a line-oriented script:
//!
//! ```text
//! # comment
//! mkdir /home/docs
//! mkfile /home/docs/readme.txt ./files/readme.txt
//! ```
//!
//! Each command becomes one facade call. A failing line is logged,
//! recorded in the [`LoadReport`] and skipped; it never stops the script.

use crate::error::{ApiError, VfsError};
use crate::path;
use crate::vfs::Vfs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const COMMENT_PREFIX: char = '#';
const MKDIR_CMD: &str = "mkdir";
const MKFILE_CMD: &str = "mkfile";

/// One parsed script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Mkdir { path: String },
    Mkfile { path: String, physical: PathBuf },
}

/// Why a line could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

/// Parse a single script line. Blank lines and comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>, LineError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
        return Ok(None);
    }
    let mut tokens = trimmed.split_whitespace();
    let command = tokens.next().unwrap_or_default();
    match command {
        MKDIR_CMD => {
            let path = tokens.next().ok_or(LineError::MissingArgument("virtual_path"))?;
            Ok(Some(ScriptCommand::Mkdir {
                path: path.to_string(),
            }))
        }
        MKFILE_CMD => {
            let path = tokens.next().ok_or(LineError::MissingArgument("virtual_path"))?;
            let physical = tokens
                .next()
                .ok_or(LineError::MissingArgument("physical_path"))?;
            Ok(Some(ScriptCommand::Mkfile {
                path: path.to_string(),
                physical: PathBuf::from(physical),
            }))
        }
        other => Err(LineError::UnknownCommand(other.to_string())),
    }
}

/// A line that was skipped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineFailure {
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Summary of one script run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub directories: usize,
    pub files: usize,
    pub failures: Vec<LineFailure>,
}

impl LoadReport {
    pub fn applied(&self) -> usize {
        self.directories + self.files
    }

    fn merge(&mut self, other: LoadReport) {
        self.directories += other.directories;
        self.files += other.files;
        self.failures.extend(other.failures);
    }
}

/// Applies scripts to a VFS.
#[derive(Debug, Clone, Default)]
pub struct ScriptLoader {
    base_dir: Option<PathBuf>,
}

impl ScriptLoader {
    /// Loader resolving relative physical paths against the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader resolving relative physical paths against `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// Run every script in order, accumulating one report.
    pub fn load_files(vfs: &mut Vfs, scripts: &[PathBuf]) -> Result<LoadReport, ApiError> {
        let mut total = LoadReport::default();
        for script in scripts {
            total.merge(Self::load_file(vfs, script)?);
        }
        Ok(total)
    }

    /// Run the script at `script`. Only an unreadable script is an error;
    /// relative physical paths resolve against the script's directory.
    pub fn load_file(vfs: &mut Vfs, script: &Path) -> Result<LoadReport, ApiError> {
        let text = std::fs::read_to_string(script).map_err(|e| {
            ApiError::Io(std::io::Error::new(
                e.kind(),
                format!("Cannot read script {}: {}", script.display(), e),
            ))
        })?;
        let loader = match script.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => Self::with_base_dir(dir),
            None => Self::new(),
        };
        let report = loader.load_str(vfs, &text);
        info!(
            script = %script.display(),
            directories = report.directories,
            files = report.files,
            failed = report.failures.len(),
            "script loaded"
        );
        Ok(report)
    }

    /// Apply every line of `script`.
    pub fn load_str(&self, vfs: &mut Vfs, script: &str) -> LoadReport {
        let mut report = LoadReport::default();
        for (index, line) in script.lines().enumerate() {
            let line_no = index + 1;
            let outcome = parse_line(line).and_then(|command| match command {
                Some(command) => self.apply(vfs, &command).map(Some),
                None => Ok(None),
            });
            match outcome {
                Ok(Some(ScriptCommand::Mkdir { .. })) => report.directories += 1,
                Ok(Some(ScriptCommand::Mkfile { .. })) => report.files += 1,
                Ok(None) => {}
                Err(err) => {
                    warn!(line = line_no, text = %line.trim(), error = %err, "script line skipped");
                    report.failures.push(LineFailure {
                        line: line_no,
                        text: line.trim().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        report
    }

    fn apply(&self, vfs: &mut Vfs, command: &ScriptCommand) -> Result<ScriptCommand, LineError> {
        match command {
            ScriptCommand::Mkdir { path: target } => {
                vfs.create_directory(&path::parent_path(target), path::leaf_name(target))?;
            }
            ScriptCommand::Mkfile {
                path: target,
                physical,
            } => {
                let physical = self.resolve_physical(physical);
                vfs.create_file(&path::parent_path(target), path::leaf_name(target), physical)?;
            }
        }
        Ok(command.clone())
    }

    fn resolve_physical(&self, physical: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if physical.is_relative() => base.join(physical),
            _ => physical.to_path_buf(),
        }
    }
}
