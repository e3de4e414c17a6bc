//! # wf2ls
//!
//! Convert a Workflowy backup into a Logseq graph.
//!
//! This crate ties the workspace together: it layers the configuration sources,
//! reads the backup, runs the Source Parser and the converter, and writes the
//! resulting pages with the [`GraphWriter`]. The `wf2ls` binary is a thin
//! command-line front end over [`load_config`] and [`run`].
//!
//! ```
//! use wf2ls::convert_backup;
//! use wf2ls_core::AppConfig;
//!
//! let backup = r#"[{"id": "a", "nm": "Hello", "metadata": {"layoutMode": "todo"}}]"#;
//! let state = convert_backup(&AppConfig::default(), backup, None).unwrap();
//! assert_eq!(state.get_document("Workflowy Imports").unwrap().text(), "- TODO Hello");
//! ```

pub mod output;

pub use output::{GraphWriter, WriteSummary, is_journal_page, page_file_name};

use std::path::{Path, PathBuf};
use wf2ls_core::{AppConfig, ConversionState, Error, ProgressSink, Result};

/// Default location of the implicit configuration file
pub const DEFAULT_CONFIG_FILE: &str = "./config.json";

/// Where configuration comes from, lowest precedence first
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Optional file read when it exists
    pub local_file: PathBuf,
    /// File given on the command line; must exist
    pub config_file: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub dest: Option<PathBuf>,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            local_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            config_file: None,
            source: None,
            dest: None,
        }
    }
}

/// Expand `~` and environment variables in a path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| Error::config_error(format!("Path is not valid UTF-8: {}", path.display())))?;
    let expanded = shellexpand::full(raw)
        .map_err(|e| Error::config_error(format!("Failed to expand path {}: {}", raw, e)))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Build the configuration: defaults, then the local file, then the
/// command-line file, then the command-line paths
pub fn load_config(sources: &ConfigSources) -> Result<AppConfig> {
    let mut config = AppConfig::new();

    let local = expand_path(&sources.local_file)?;
    if local.is_file() {
        config.update_from_file(&local)?;
        config.conf_file_location = local;
    }

    let custom = sources.config_file.as_deref().map(expand_path).transpose()?;
    if let Some(path) = &custom {
        if !path.is_file() {
            return Err(Error::file_not_found(path));
        }
        config.update_from_file(path)?;
    }

    config.apply_cli(sources.source.clone(), sources.dest.clone(), custom);
    config.source_file = expand_path(&config.source_file)?;
    config.dest_dir = expand_path(&config.dest_dir)?;

    config.validate()?;
    config.require_source()?;
    Ok(config)
}

/// Parse and convert a backup held in memory
pub fn convert_backup(
    config: &AppConfig,
    backup: &str,
    sink: Option<Box<dyn ProgressSink>>,
) -> Result<ConversionState> {
    let raw = wf2ls_parser::parse_backup(backup)?;
    let mut state = ConversionState::new();
    if let Some(sink) = sink {
        state.jobs.attach(sink);
    }
    let nodes = wf2ls_parser::parse_source(&raw, &mut state);
    wf2ls_convert::convert_tree(config, &mut state, &nodes);
    Ok(state)
}

/// Read the configured source file, convert it and write the graph
pub fn run(config: &AppConfig, sink: Option<Box<dyn ProgressSink>>) -> Result<WriteSummary> {
    let source = config.require_source()?;
    if !source.is_file() {
        return Err(Error::file_not_found(source));
    }
    log::info!("Reading {}", source.display());
    let backup = std::fs::read_to_string(source)?;

    let state = convert_backup(config, &backup, sink)?;
    let documents = state.into_documents();
    GraphWriter::new(&config.dest_dir).write_all(&documents)
}

/// Progress sink that logs every tenth of the work
#[derive(Debug, Default)]
pub struct LogProgress {
    reported: u64,
}

impl ProgressSink for LogProgress {
    fn start(&mut self, total: u64) {
        self.reported = 0;
        log::info!("Converting {} nodes", total);
    }

    fn update(&mut self, completed: u64, total: u64) {
        if total == 0 {
            return;
        }
        let tenth = completed.min(total) * 10 / total;
        if tenth > self.reported {
            self.reported = tenth;
            log::info!("{}% converted", tenth * 10);
        }
    }

    fn stop(&mut self, completed: u64, total: u64) {
        log::info!("Converted {} of {} nodes", completed, total);
    }
}
