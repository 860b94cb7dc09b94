//! Command-line flags and the settings resolved from them.

use std::path::PathBuf;

use cahier_core::runner::ShellRunner;
use clap::Parser;
use directories::ProjectDirs;

pub const DEFAULT_DB_PATH: &str = "./cahier.db";

#[derive(Parser, Debug)]
#[command(name = "cahier", version, about = "Cahier - a terminal notebook for shell commands")]
pub struct Cli {
    /// Command log database
    #[arg(long, env = "CAHIER_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Shell used to run cells (defaults to `bash`, then `sh`; `cmd` on Windows)
    #[arg(long, env = "CAHIER_SHELL")]
    pub shell: Option<String>,

    /// Where `cahier.log` is written
    #[arg(long, env = "CAHIER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print every cell as one JSON object per line and exit
    #[arg(long)]
    pub export: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub shell: Option<String>,
    pub log_dir: PathBuf,
    pub export: bool,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            db_path: cli.db,
            shell: cli.shell.filter(|s| !s.trim().is_empty()),
            log_dir: cli.log_dir.unwrap_or_else(default_log_dir),
            export: cli.export,
        }
    }

    pub fn runner(&self) -> ShellRunner {
        match &self.shell {
            Some(program) => ShellRunner::with_program(program.clone()),
            None => ShellRunner::default(),
        }
    }
}

/// Platform data dir (e.g. `~/.local/share/cahier`), or the working
/// directory when none can be determined.
pub fn default_log_dir() -> PathBuf {
    ProjectDirs::from("", "", "cahier")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
