//! Optional JSON document with the starting parameters.
//!
//! ```json
//! { "sequence_length": 1024, "head_dimension": 64, "tab": "flash", "series_ceiling": 8192 }
//! ```
//!
//! Every field may be omitted. Out-of-range numbers are clamped and unknown
//! tabs fall back to `basic`, matching what the live controls would do.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{Configuration, TabId, HEAD_DIMENSION, SEQUENCE_LENGTH, SERIES_CEILING};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_dimension: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_ceiling: Option<u32>,
}

impl Settings {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn configuration(&self) -> Configuration {
        Configuration {
            sequence_length: SEQUENCE_LENGTH.clamp(
                self.sequence_length.unwrap_or(SEQUENCE_LENGTH.default),
            ),
            head_dimension: HEAD_DIMENSION
                .clamp(self.head_dimension.unwrap_or(HEAD_DIMENSION.default)),
            active_tab: self
                .tab
                .as_deref()
                .map(TabId::resolve)
                .unwrap_or_default(),
        }
    }

    pub fn series_ceiling(&self) -> u32 {
        SERIES_CEILING.clamp(self.series_ceiling.unwrap_or(SERIES_CEILING.default))
    }

    /// Settings fields overwrite `other` where present.
    pub fn merged_over(self, other: Settings) -> Settings {
        Settings {
            sequence_length: self.sequence_length.or(other.sequence_length),
            head_dimension: self.head_dimension.or(other.head_dimension),
            tab: self.tab.or(other.tab),
            series_ceiling: self.series_ceiling.or(other.series_ceiling),
        }
    }
}
