//! Illustrative memory/latency estimates and the throughput comparison curve.
//!
//! None of these numbers are measured or calibrated. They are closed-form
//! stand-ins chosen so the quadratic variant visibly loses to the tiled ones.
//! Every function is pure over its arguments.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::config::Configuration;

pub const BYTES_PER_ELEMENT: f64 = 4.0;
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Tile edge, in sequence positions.
pub const BLOCK_SIZE: u32 = 256;

/// Display cap for throughput values (arbitrary unit).
pub const THROUGHPUT_CEILING: f64 = 300.0;

/// First sequence length plotted by the comparison curve.
pub const SERIES_START: u32 = 128;

/// Full attention-matrix estimate: O(N²·H) memory.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StandardEstimate {
    pub matrix_element_count: u64,
    pub memory_mb: f64,
    pub compute_time_ms: f64,
}

/// Tiled estimate: O(N·H) working set for the Q, K and V buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TiledEstimate {
    pub block_size: u32,
    pub block_count_per_axis: u32,
    pub memory_mb: f64,
    pub compute_time_ms: f64,
}

impl TiledEstimate {
    pub fn tile_count(&self) -> usize {
        let n = self.block_count_per_axis as usize;
        n * n
    }
}

pub fn standard_estimate(cfg: &Configuration) -> StandardEstimate {
    let n = cfg.sequence_length as u64;
    let h = cfg.head_dimension as u64;
    let elements = n * n * h;
    StandardEstimate {
        matrix_element_count: elements,
        memory_mb: elements as f64 * BYTES_PER_ELEMENT / BYTES_PER_MB,
        compute_time_ms: elements as f64 / 1_000_000.0,
    }
}

pub fn block_count_per_axis(sequence_length: u32) -> u32 {
    sequence_length.div_ceil(BLOCK_SIZE)
}

pub fn tiled_estimate(cfg: &Configuration) -> TiledEstimate {
    let n = cfg.sequence_length as f64;
    let h = cfg.head_dimension as f64;
    TiledEstimate {
        block_size: BLOCK_SIZE,
        block_count_per_axis: block_count_per_axis(cfg.sequence_length),
        memory_mb: 3.0 * n * h * BYTES_PER_ELEMENT / BYTES_PER_MB,
        // ln(1) = 0 keeps the degenerate lengths finite.
        compute_time_ms: n * h * n.max(1.0).ln() / 1_000_000.0,
    }
}

/// The three implementations plotted by the comparison chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Variant {
    Standard,
    Tiled,
    RefinedTiled,
}

impl Variant {
    pub fn all() -> &'static [Variant] {
        &[Variant::Standard, Variant::Tiled, Variant::RefinedTiled]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Variant::Standard => "Standard Attention",
            Variant::Tiled => "FlashAttention",
            Variant::RefinedTiled => "FlashAttention-2",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Variant::Standard => "#4299e1",
            Variant::Tiled => "#ed8936",
            Variant::RefinedTiled => "#48bb78",
        }
    }

    /// Relative cost: linear in L·H for the standard variant, square-root for
    /// the tiled ones, each scaled by a per-variant constant.
    fn cost(self, sequence_length: u32, head_dimension: u32) -> f64 {
        let work = sequence_length as f64 * head_dimension as f64;
        match self {
            Variant::Standard => work * 0.0001,
            Variant::Tiled => work.sqrt() * 0.01,
            Variant::RefinedTiled => work.sqrt() * 0.007,
        }
    }

    /// Capped inverse of cost. The constants keep
    /// `Standard <= Tiled <= RefinedTiled` at every point of the domain.
    pub fn throughput(self, sequence_length: u32, head_dimension: u32) -> f64 {
        let cost = self.cost(sequence_length, head_dimension);
        if cost <= 0.0 {
            return THROUGHPUT_CEILING;
        }
        (1000.0 / cost).min(THROUGHPUT_CEILING)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SeriesRow {
    pub sequence_length: u32,
    pub standard: f64,
    pub tiled: f64,
    pub refined_tiled: f64,
}

impl SeriesRow {
    pub fn value(&self, variant: Variant) -> f64 {
        match variant {
            Variant::Standard => self.standard,
            Variant::Tiled => self.tiled,
            Variant::RefinedTiled => self.refined_tiled,
        }
    }
}

/// Rows in ascending sequence length, one per doubling from `SERIES_START`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PerformanceSeries {
    pub ceiling: u32,
    pub head_dimension: u32,
    rows: Vec<SeriesRow>,
}

impl PerformanceSeries {
    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_throughput(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|r| Variant::all().iter().map(move |v| r.value(*v)))
            .fold(0.0, f64::max)
    }
}

pub fn performance_series(ceiling: u32, head_dimension: u32) -> PerformanceSeries {
    let rows = std::iter::successors(Some(SERIES_START), |l| l.checked_mul(2))
        .take_while(|&l| l <= ceiling)
        .map(|l| SeriesRow {
            sequence_length: l,
            standard: Variant::Standard.throughput(l, head_dimension),
            tiled: Variant::Tiled.throughput(l, head_dimension),
            refined_tiled: Variant::RefinedTiled.throughput(l, head_dimension),
        })
        .collect();

    PerformanceSeries {
        ceiling,
        head_dimension,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TabId, HEAD_DIMENSION, SEQUENCE_LENGTH, SERIES_CEILING};

    fn cfg(n: u32, h: u32) -> Configuration {
        Configuration {
            sequence_length: n,
            head_dimension: h,
            active_tab: TabId::Standard,
        }
    }

    fn seq_lengths() -> impl Iterator<Item = u32> {
        (SEQUENCE_LENGTH.min..=SEQUENCE_LENGTH.max).step_by(SEQUENCE_LENGTH.step as usize)
    }

    fn head_dims() -> impl Iterator<Item = u32> {
        (HEAD_DIMENSION.min..=HEAD_DIMENSION.max).step_by(HEAD_DIMENSION.step as usize)
    }

    #[test]
    fn standard_estimate_matches_closed_form() {
        let e = standard_estimate(&cfg(512, 64));
        assert_eq!(e.matrix_element_count, 512 * 512 * 64);
        assert!((e.memory_mb - 64.0).abs() < 1e-9);
        assert!((e.compute_time_ms - 16.777216).abs() < 1e-9);
    }

    #[test]
    fn tiled_estimate_matches_closed_form() {
        let e = tiled_estimate(&cfg(512, 64));
        assert_eq!(e.block_size, 256);
        assert_eq!(e.block_count_per_axis, 2);
        assert_eq!(e.tile_count(), 4);
        assert!((e.memory_mb - 0.375).abs() < 1e-9);
        let expected = 512.0 * 64.0 * 512f64.ln() / 1_000_000.0;
        assert!((e.compute_time_ms - expected).abs() < 1e-12);
    }

    #[test]
    fn block_count_rounds_up() {
        assert_eq!(block_count_per_axis(128), 1);
        assert_eq!(block_count_per_axis(256), 1);
        assert_eq!(block_count_per_axis(257), 2);
        assert_eq!(block_count_per_axis(4096), 16);
    }

    #[test]
    fn memory_is_strictly_increasing_in_both_inputs() {
        for h in head_dims() {
            let mut prev_std = 0.0;
            let mut prev_tiled = 0.0;
            for n in seq_lengths() {
                let s = standard_estimate(&cfg(n, h)).memory_mb;
                let t = tiled_estimate(&cfg(n, h)).memory_mb;
                assert!(s > prev_std, "standard not increasing at n={n} h={h}");
                assert!(t > prev_tiled, "tiled not increasing at n={n} h={h}");
                prev_std = s;
                prev_tiled = t;
            }
        }
        for n in seq_lengths() {
            let mut prev_std = 0.0;
            let mut prev_tiled = 0.0;
            for h in head_dims() {
                let s = standard_estimate(&cfg(n, h)).memory_mb;
                let t = tiled_estimate(&cfg(n, h)).memory_mb;
                assert!(s > prev_std);
                assert!(t > prev_tiled);
                prev_std = s;
                prev_tiled = t;
            }
        }
    }

    #[test]
    fn tiled_memory_is_below_standard_from_512() {
        for h in head_dims() {
            for n in seq_lengths().filter(|&n| n >= 512) {
                let s = standard_estimate(&cfg(n, h)).memory_mb;
                let t = tiled_estimate(&cfg(n, h)).memory_mb;
                assert!(t < s, "n={n} h={h}: tiled {t} >= standard {s}");
            }
        }
    }

    #[test]
    fn compute_time_is_monotone() {
        for h in head_dims() {
            let mut prev = (0.0, 0.0);
            for n in seq_lengths() {
                let s = standard_estimate(&cfg(n, h)).compute_time_ms;
                let t = tiled_estimate(&cfg(n, h)).compute_time_ms;
                assert!(s > prev.0 && t > prev.1);
                prev = (s, t);
            }
        }
    }

    #[test]
    fn series_length_follows_doubling() {
        assert_eq!(performance_series(4096, 64).len(), 6);
        let lengths: Vec<u32> = performance_series(4096, 64)
            .rows()
            .iter()
            .map(|r| r.sequence_length)
            .collect();
        assert_eq!(lengths, vec![128, 256, 512, 1024, 2048, 4096]);

        let mut ceiling = SERIES_CEILING.min;
        while ceiling <= SERIES_CEILING.max {
            let expected = (ceiling as f64 / 128.0).log2().floor() as usize + 1;
            assert_eq!(performance_series(ceiling, 64).len(), expected, "L_max={ceiling}");
            ceiling += SERIES_CEILING.step;
        }
    }

    #[test]
    fn series_keeps_designed_ordering_and_cap() {
        let mut ceiling = SERIES_CEILING.min;
        while ceiling <= SERIES_CEILING.max {
            for h in head_dims() {
                let series = performance_series(ceiling, h);
                for r in series.rows() {
                    assert!(r.standard <= r.tiled, "{r:?}");
                    assert!(r.tiled <= r.refined_tiled, "{r:?}");
                    assert!(r.refined_tiled <= THROUGHPUT_CEILING);
                    assert!(r.standard > 0.0);
                }
                assert!(series.max_throughput() <= THROUGHPUT_CEILING);
            }
            ceiling += SERIES_CEILING.step;
        }
    }

    #[test]
    fn short_sequences_hit_the_display_cap() {
        let series = performance_series(1024, 32);
        let first = series.rows()[0];
        assert_eq!(first.standard, THROUGHPUT_CEILING);
        assert_eq!(first.refined_tiled, THROUGHPUT_CEILING);

        let long = performance_series(16384, 128);
        let last = long.rows().last().copied().unwrap();
        assert!(last.standard < last.tiled);
        assert!(last.tiled < last.refined_tiled);
    }
}
