//! Project-level configuration support
//!
//! Loads per-project configuration from a `codegauge.toml` file in the
//! target directory. Everything here can also be given on the command
//! line; the CLI flags extend rather than replace the file values.
//!
//! # Configuration Format
//!
//! ```toml
//! # codegauge.toml
//!
//! exclude = ["third_party/", "generated/"]
//! custom_asserts = ["my_assert", "RAXML_ASSERT"]
//! skip_tools = ["infer"]
//! badge = "README.md"
//! kwstyle_xml = "KWStyle.xml"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "codegauge.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Paths excluded from analysis, relative to the project root
    pub exclude: Vec<PathBuf>,
    /// Project-specific assertion macro names
    pub custom_asserts: Vec<String>,
    /// Tool keys to leave out of the run
    pub skip_tools: Vec<String>,
    /// Markdown file receiving the score badge
    pub badge: Option<PathBuf>,
    /// KWStyle rule configuration
    pub kwstyle_xml: Option<PathBuf>,
}

impl ProjectConfig {
    /// Load the config from `program_dir`, falling back to defaults when
    /// the file is absent or malformed.
    pub fn load(program_dir: &Path) -> Self {
        let path = program_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    debug!("loaded project config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("ignoring malformed {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
