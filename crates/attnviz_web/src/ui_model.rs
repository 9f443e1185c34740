//! UI models and metadata that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! tab bar and slider inventory on the host.

use attnviz::config::{RangeSpec, TabId, HEAD_DIMENSION, SEQUENCE_LENGTH, SERIES_CEILING};

pub fn tab_icon(tab: TabId) -> &'static str {
    match tab {
        TabId::Basic => "🔍",
        TabId::Matrix => "🧮",
        TabId::Standard => "📦",
        TabId::Tiled => "⚡",
        TabId::RefinedTiled => "🚀",
        TabId::Performance => "📈",
    }
}

pub fn tab_description(tab: TabId) -> &'static str {
    match tab {
        TabId::Basic => "Each output attends to every input through a learned weight. The highlight walks over the inputs one at a time.",
        TabId::Matrix => "Query times Key transpose gives the score matrix, softmax normalizes each row, and the result multiplies Value.",
        TabId::Standard => "The full N x N score matrix is materialized in GPU memory, so memory grows with the square of the sequence length.",
        TabId::Tiled => "Q, K and V are processed in blocks that fit in fast on-chip memory, so the full score matrix never exists at once.",
        TabId::RefinedTiled => "Work is split across thread blocks and warps with fewer non-matmul operations and better parallelism.",
        TabId::Performance => "Illustrative throughput of the three variants as the sequence length grows.",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slider {
    SequenceLength,
    HeadDimension,
    SeriesCeiling,
}

impl Slider {
    pub fn label(self) -> &'static str {
        match self {
            Slider::SequenceLength => "Sequence Length",
            Slider::HeadDimension => "Head Dimension",
            Slider::SeriesCeiling => "Max Sequence Length",
        }
    }

    pub fn input_id(self) -> &'static str {
        match self {
            Slider::SequenceLength => "seq-length",
            Slider::HeadDimension => "head-dim",
            Slider::SeriesCeiling => "series-ceiling",
        }
    }

    pub fn range(self) -> RangeSpec {
        match self {
            Slider::SequenceLength => SEQUENCE_LENGTH,
            Slider::HeadDimension => HEAD_DIMENSION,
            Slider::SeriesCeiling => SERIES_CEILING,
        }
    }

    /// Global controls shown above every panel.
    pub fn global() -> &'static [Slider] {
        &[Slider::SequenceLength, Slider::HeadDimension]
    }

    /// Controls owned by the panel of `tab`.
    pub fn local_to(tab: TabId) -> &'static [Slider] {
        match tab {
            TabId::Performance => &[Slider::SeriesCeiling],
            _ => &[],
        }
    }

    pub fn caption(self, value: u32) -> String {
        format!("{}: {value}", self.label())
    }
}

/// Parse a range input's text value; `None` leaves the engine untouched.
pub fn parse_slider_value(raw: &str) -> Option<u32> {
    let v: f64 = raw.trim().parse().ok()?;
    if !v.is_finite() || v < 0.0 {
        return None;
    }
    Some(v.round().min(u32::MAX as f64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tab_has_metadata() {
        for &tab in TabId::all() {
            assert!(!tab_icon(tab).trim().is_empty());
            assert!(!tab_description(tab).trim().is_empty());
            assert!(!tab.display_name().trim().is_empty());
        }
    }

    #[test]
    fn slider_inventory_is_stable() {
        assert_eq!(Slider::global().len(), 2);
        assert_eq!(Slider::local_to(TabId::Performance), &[Slider::SeriesCeiling]);
        assert!(Slider::local_to(TabId::Tiled).is_empty());

        let mut ids: Vec<&str> = [
            Slider::SequenceLength,
            Slider::HeadDimension,
            Slider::SeriesCeiling,
        ]
        .iter()
        .map(|s| s.input_id())
        .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn slider_ranges_match_the_store() {
        let r = Slider::SequenceLength.range();
        assert_eq!((r.min, r.max, r.step, r.default), (128, 4096, 128, 512));
        assert_eq!(Slider::HeadDimension.caption(64), "Head Dimension: 64");
    }

    #[test]
    fn slider_values_parse_leniently() {
        assert_eq!(parse_slider_value("512"), Some(512));
        assert_eq!(parse_slider_value(" 1024.0 "), Some(1024));
        assert_eq!(parse_slider_value(""), None);
        assert_eq!(parse_slider_value("-3"), None);
        assert_eq!(parse_slider_value("abc"), None);
    }
}
