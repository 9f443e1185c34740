//! Cross-platform settings location
//!
//! - Linux: ~/.config/attnviz/settings.json
//! - Windows: %APPDATA%\attnviz\settings.json
//! - MacOS: ~/Library/Application Support/attnviz/settings.json

use std::path::{Path, PathBuf};

use crate::error::TermError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self, TermError> {
        let base = dirs::config_dir().ok_or(TermError::NoConfigDir)?;
        Ok(Self::with_base(&base))
    }

    pub fn with_base(base: &Path) -> Self {
        Self {
            config_dir: base.join("attnviz"),
        }
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}
