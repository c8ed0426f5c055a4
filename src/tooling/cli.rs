//! CLI Tooling
//!
//! Command-line interface over a VFS populated from bulk-loader scripts.
//! Every invocation builds a fresh in-memory tree, applies the configured
//! scripts, then runs one read-only command against it.

use crate::config::ArborConfig;
use crate::error::ApiError;
use crate::harness;
use crate::loader::{LoadReport, ScriptLoader};
use crate::logging::LoggingConfig;
use crate::tooling::format::{self, OutputFormat};
use crate::tree::LocalStore;
use crate::vfs::Vfs;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

/// Arbor CLI - in-memory virtual file system with indexed name search
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(about = "In-memory virtual file system with hashed name lookup and prefix completion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config file)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bulk-loader script applied before the command (repeatable)
    #[arg(long = "script")]
    pub scripts: Vec<PathBuf>,

    /// Enable verbose logging (debug level unless --log-level is given)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Layer the logging flags over `logging`.
    pub fn apply_logging_overrides(&self, logging: &mut LoggingConfig) {
        if self.verbose {
            logging.enabled = true;
            logging.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the tree below a path
    Tree {
        /// Virtual path of the subtree root
        #[arg(default_value = "/")]
        path: String,
    },
    /// Find every node with an exact name
    Search {
        name: String,
        /// Search strategy: index, traversal, or both
        #[arg(long, default_value = "both")]
        strategy: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List names starting with a prefix
    Suggest {
        #[arg(default_value = "")]
        prefix: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show details of one node
    Stat {
        path: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show tree and index counters
    Stats {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Check tree and index invariants; fails when any is violated
    Verify {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Time traversal against index search on the loaded tree
    Compare {
        name: String,
        /// Calls per strategy (default: benchmark.iterations)
        #[arg(long)]
        iterations: Option<usize>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Generate a random dataset and compare both strategies on it
    Bench {
        /// Files to generate (default: benchmark.file_count)
        #[arg(long)]
        files: Option<usize>,
        /// Targets to sample (default: benchmark.iterations)
        #[arg(long)]
        iterations: Option<usize>,
        /// RNG seed (default: benchmark.seed, else random)
        #[arg(long)]
        seed: Option<u64>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Tree { .. } => "tree",
        Commands::Search { .. } => "search",
        Commands::Suggest { .. } => "suggest",
        Commands::Stat { .. } => "stat",
        Commands::Stats { .. } => "stats",
        Commands::Verify { .. } => "verify",
        Commands::Compare { .. } => "compare",
        Commands::Bench { .. } => "bench",
        Commands::Config => "config",
    }
}

/// Which search strategies `search` runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    Index,
    Traversal,
    Both,
}

impl SearchStrategy {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "index" => Ok(SearchStrategy::Index),
            "traversal" => Ok(SearchStrategy::Traversal),
            "both" => Ok(SearchStrategy::Both),
            other => Err(ApiError::InvalidArgument(format!(
                "Invalid strategy: {} (must be 'index', 'traversal', or 'both')",
                other
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchOutput {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<Vec<format::SearchHit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    traversal: Option<Vec<format::SearchHit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    consistent: Option<bool>,
}

/// CLI context: the loaded VFS plus the configuration it was built from
pub struct CliContext {
    vfs: Vfs,
    config: ArborConfig,
    load_report: LoadReport,
}

impl CliContext {
    /// Build the VFS described by an already loaded configuration.
    pub fn from_config(config: ArborConfig) -> Result<Self, ApiError> {
        let mut vfs = Vfs::with_capacity(Box::new(LocalStore), config.index.initial_capacity);
        let load_report = ScriptLoader::load_files(&mut vfs, &config.loader.scripts)?;
        Ok(Self {
            vfs,
            config,
            load_report,
        })
    }

    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    pub fn config(&self) -> &ArborConfig {
        &self.config
    }

    /// What the startup scripts did
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        debug!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Tree { path } => {
                let id = self.vfs.resolve(path.as_str())?;
                Ok(format::format_tree(&self.vfs, id).trim_end().to_string())
            }
            Commands::Search {
                name,
                strategy,
                format,
            } => self.handle_search(
                name,
                SearchStrategy::parse(strategy)?,
                OutputFormat::parse(format)?,
            ),
            Commands::Suggest { prefix, format } => {
                let suggestions = self.vfs.get_suggestions(prefix);
                match OutputFormat::parse(format)? {
                    OutputFormat::Json => format::to_json(&suggestions),
                    OutputFormat::Text => Ok(format::format_suggestions(prefix, &suggestions)),
                }
            }
            Commands::Stat { path, format } => {
                let id = self.vfs.resolve(path.as_str())?;
                let details = format::node_details(&self.vfs, id)?;
                match OutputFormat::parse(format)? {
                    OutputFormat::Json => format::to_json(&details),
                    OutputFormat::Text => Ok(format::format_node_details(&details)),
                }
            }
            Commands::Stats { format } => {
                let stats = self.vfs.stats();
                match OutputFormat::parse(format)? {
                    OutputFormat::Json => format::to_json(&stats),
                    OutputFormat::Text => Ok(format::format_stats(&stats)),
                }
            }
            Commands::Verify { format } => {
                let report = self.vfs.verify();
                let rendered = match OutputFormat::parse(format)? {
                    OutputFormat::Json => format::to_json(&report)?,
                    OutputFormat::Text => format::format_consistency_report(&report),
                };
                if report.is_consistent() {
                    Ok(rendered)
                } else {
                    Err(ApiError::Inconsistent(rendered))
                }
            }
            Commands::Compare {
                name,
                iterations,
                format,
            } => {
                let output = OutputFormat::parse(format)?;
                let iterations = iterations.unwrap_or(self.config.benchmark.iterations);
                let comparison = harness::compare(&self.vfs, name, iterations);
                match output {
                    OutputFormat::Json => format::to_json(&comparison),
                    OutputFormat::Text => Ok(format::format_comparison(&comparison)),
                }
            }
            Commands::Bench {
                files,
                iterations,
                seed,
                format,
            } => {
                let output = OutputFormat::parse(format)?;
                let mut bench = self.config.benchmark.clone();
                if let Some(files) = files {
                    bench.file_count = *files;
                }
                if let Some(iterations) = iterations {
                    bench.iterations = *iterations;
                }
                if seed.is_some() {
                    bench.seed = *seed;
                }
                let report = harness::run(&bench)?;
                match output {
                    OutputFormat::Json => format::to_json(&report),
                    OutputFormat::Text => Ok(format::format_benchmark(&report)),
                }
            }
            Commands::Config => Ok(toml::to_string_pretty(&self.config)?),
        }
    }

    fn handle_search(
        &self,
        name: &str,
        strategy: SearchStrategy,
        output: OutputFormat,
    ) -> Result<String, ApiError> {
        let index = matches!(strategy, SearchStrategy::Index | SearchStrategy::Both)
            .then(|| format::search_hits(&self.vfs, self.vfs.search_by_index(name)));
        let traversal = matches!(strategy, SearchStrategy::Traversal | SearchStrategy::Both)
            .then(|| format::search_hits(&self.vfs, &self.vfs.search_by_traversal(name)));
        let consistent = match (&index, &traversal) {
            (Some(a), Some(b)) => Some(
                a.iter().map(|h| &h.id).eq(b.iter().map(|h| &h.id)),
            ),
            _ => None,
        };

        if output == OutputFormat::Json {
            return format::to_json(&SearchOutput {
                name: name.to_string(),
                index,
                traversal,
                consistent,
            });
        }

        let mut out = String::new();
        if let Some(hits) = &index {
            out.push_str(&format::format_search_hits("Index search", hits));
        }
        if let Some(hits) = &traversal {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format::format_search_hits("Traversal search", hits));
        }
        match consistent {
            Some(true) => out.push_str("\nStrategies agree: yes"),
            Some(false) => out.push_str("\nStrategies agree: no"),
            None => {}
        }
        Ok(out.trim_end().to_string())
    }
}
