//! Parameter Store: the two user-controlled values plus the active tab.
//!
//! `Configuration` itself is a plain value; range enforcement happens in the
//! store setters. Panels and the performance model accept any snapshot, so a
//! caller holding a hand-built `Configuration` bypasses the clamp on purpose.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Declared bounds of one range control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub min: u32,
    pub max: u32,
    pub step: u32,
    pub default: u32,
}

impl RangeSpec {
    /// Clamp into the closed range. Step snapping is the control's job.
    pub fn clamp(&self, v: u32) -> u32 {
        v.clamp(self.min, self.max)
    }

    pub fn contains(&self, v: u32) -> bool {
        (self.min..=self.max).contains(&v)
    }
}

pub const SEQUENCE_LENGTH: RangeSpec = RangeSpec {
    min: 128,
    max: 4096,
    step: 128,
    default: 512,
};

pub const HEAD_DIMENSION: RangeSpec = RangeSpec {
    min: 32,
    max: 128,
    step: 32,
    default: 64,
};

/// Local to the performance panel; not part of `Configuration`.
pub const SERIES_CEILING: RangeSpec = RangeSpec {
    min: 1024,
    max: 16384,
    step: 1024,
    default: 4096,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TabId {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "basic"))]
    Basic,
    #[cfg_attr(feature = "serde", serde(rename = "matrix"))]
    Matrix,
    #[cfg_attr(feature = "serde", serde(rename = "standard"))]
    Standard,
    #[cfg_attr(feature = "serde", serde(rename = "flash"))]
    Tiled,
    #[cfg_attr(feature = "serde", serde(rename = "flash2"))]
    RefinedTiled,
    #[cfg_attr(feature = "serde", serde(rename = "performance"))]
    Performance,
}

impl TabId {
    pub fn label(self) -> &'static str {
        match self {
            TabId::Basic => "basic",
            TabId::Matrix => "matrix",
            TabId::Standard => "standard",
            TabId::Tiled => "flash",
            TabId::RefinedTiled => "flash2",
            TabId::Performance => "performance",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TabId::Basic => "Basic",
            TabId::Matrix => "Matrix",
            TabId::Standard => "Standard",
            TabId::Tiled => "Flash",
            TabId::RefinedTiled => "Flash2",
            TabId::Performance => "Performance",
        }
    }

    /// Tab bar order.
    pub fn all() -> &'static [TabId] {
        &[
            TabId::Basic,
            TabId::Matrix,
            TabId::Standard,
            TabId::Tiled,
            TabId::RefinedTiled,
            TabId::Performance,
        ]
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(TabId::Basic),
            "matrix" => Some(TabId::Matrix),
            "standard" => Some(TabId::Standard),
            "flash" | "tiled" => Some(TabId::Tiled),
            "flash2" | "refined-tiled" | "refined" => Some(TabId::RefinedTiled),
            "performance" | "perf" => Some(TabId::Performance),
            _ => None,
        }
    }

    /// Unrecognized identifiers fall back to the default panel.
    pub fn resolve(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

impl FromStr for TabId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::UnknownTab(s.to_string()))
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Configuration {
    pub sequence_length: u32,
    pub head_dimension: u32,
    pub active_tab: TabId,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            sequence_length: SEQUENCE_LENGTH.default,
            head_dimension: HEAD_DIMENSION.default,
            active_tab: TabId::default(),
        }
    }
}

impl Configuration {
    /// Copy with both numeric fields forced into their declared ranges.
    pub fn clamped(self) -> Self {
        Self {
            sequence_length: SEQUENCE_LENGTH.clamp(self.sequence_length),
            head_dimension: HEAD_DIMENSION.clamp(self.head_dimension),
            active_tab: self.active_tab,
        }
    }
}

/// What changed in a store update, with the previous and new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    SequenceLength { from: u32, to: u32 },
    HeadDimension { from: u32, to: u32 },
    ActiveTab { from: TabId, to: TabId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&Configuration, ConfigChange)>;

/// Owns the `Configuration` and notifies observers synchronously on change.
pub struct ParameterStore {
    config: Configuration,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl ParameterStore {
    pub fn new(initial: Configuration) -> Self {
        Self {
            config: initial.clamped(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn get(&self) -> Configuration {
        self.config
    }

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Configuration, ConfigChange) + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Returns the applied change, or `None` when the clamped value equals the
    /// stored one (no notification in that case).
    pub fn set_sequence_length(&mut self, v: u32) -> Option<ConfigChange> {
        let to = SEQUENCE_LENGTH.clamp(v);
        let from = self.config.sequence_length;
        if from == to {
            return None;
        }
        self.config.sequence_length = to;
        Some(self.notify(ConfigChange::SequenceLength { from, to }))
    }

    pub fn set_head_dimension(&mut self, v: u32) -> Option<ConfigChange> {
        let to = HEAD_DIMENSION.clamp(v);
        let from = self.config.head_dimension;
        if from == to {
            return None;
        }
        self.config.head_dimension = to;
        Some(self.notify(ConfigChange::HeadDimension { from, to }))
    }

    pub fn set_active_tab(&mut self, tab: TabId) -> Option<ConfigChange> {
        let from = self.config.active_tab;
        if from == tab {
            return None;
        }
        self.config.active_tab = tab;
        Some(self.notify(ConfigChange::ActiveTab { from, to: tab }))
    }

    fn notify(&mut self, change: ConfigChange) -> ConfigChange {
        let config = self.config;
        for (_, observer) in self.observers.iter_mut() {
            observer(&config, change);
        }
        change
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterStore")
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish()
    }
}
