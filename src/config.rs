use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

use crate::data::fetch::{DEFAULT_BASE_URL, FetchOptions};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "methane_dash.toml";

pub const EMISSIONS_TABLE: &str = "ghg.EF_W_EMISSIONS_SOURCE_GHG";
pub const FACILITIES_TABLE: &str = "ghg.rlps_ghg_emitter_facilities";

const USAGE: &str = "\
Usage: methane-dash [OPTIONS]

Options:
  --config <PATH>     TOML config file (default: ./methane_dash.toml if present)
  --refresh           Re-download tables even when a cache file exists
  --max-pages <N>     Stop each download after N pages (0: no limit)
  --cache-dir <DIR>   Folder holding the CSV caches
  --fetch-only        Load/refresh the caches and exit without opening a window
  -h, --help          Print this help";

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub cache_folder: PathBuf,
    pub emissions_table: String,
    pub facilities_table: String,
    pub page_size: usize,
    pub pause_ms: u64,
    pub max_pages: Option<usize>,
    pub timeout_secs: u64,
    pub force_refresh: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            cache_folder: PathBuf::from("epa"),
            emissions_table: EMISSIONS_TABLE.to_string(),
            facilities_table: FACILITIES_TABLE.to_string(),
            page_size: 1000,
            pause_ms: 500,
            max_pages: None,
            timeout_secs: 30,
            force_refresh: false,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("parsing config")?;
        if config.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            page_size: self.page_size,
            pause: Duration::from_millis(self.pause_ms),
            max_pages: self.max_pages,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// What the process should do after start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Dashboard,
    FetchOnly,
    Help,
}

/// Flags that override the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub refresh: bool,
    pub max_pages: Option<usize>,
    pub cache_dir: Option<PathBuf>,
    pub fetch_only: bool,
    pub help: bool,
}

impl CliArgs {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut out = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(a) = args.next() {
            match a.as_str() {
                "--config" => {
                    let v = args.next().ok_or_else(|| anyhow!("Missing value for --config"))?;
                    out.config = Some(PathBuf::from(v));
                }
                "--refresh" => out.refresh = true,
                "--max-pages" => {
                    let v = args.next().ok_or_else(|| anyhow!("Missing value for --max-pages"))?;
                    let n: usize = v.parse().with_context(|| format!("Invalid --max-pages: {v}"))?;
                    out.max_pages = Some(n);
                }
                "--cache-dir" => {
                    let v = args.next().ok_or_else(|| anyhow!("Missing value for --cache-dir"))?;
                    out.cache_dir = Some(PathBuf::from(v));
                }
                "--fetch-only" => out.fetch_only = true,
                "-h" | "--help" => out.help = true,
                other => bail!("Unknown arg: {other}\n\n{USAGE}"),
            }
        }
        Ok(out)
    }

    pub fn mode(&self) -> Mode {
        if self.help {
            Mode::Help
        } else if self.fetch_only {
            Mode::FetchOnly
        } else {
            Mode::Dashboard
        }
    }

    /// Config file named on the command line, else the default file when it
    /// exists, else built-in defaults; then apply the flags.
    pub fn resolve(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Config::load(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Config::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut Config) {
        if self.refresh {
            config.force_refresh = true;
        }
        if let Some(n) = self.max_pages {
            config.max_pages = Some(n);
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_folder = dir.clone();
        }
    }
}

pub fn usage() -> &'static str {
    USAGE
}
