//! One parameterized visualization panel for every tutorial tab.
//!
//! A panel owns the clocks of its variant from `mount` to `unmount`, keeps the
//! last configuration snapshot it was given, and renders a `PanelOutput` on
//! demand. The tab tag selects the clocks, the formulas and the scene layout;
//! everything else is shared.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::{AnimationClock, ClockState, Scheduler, TaskId};
use crate::config::{Configuration, TabId, SERIES_CEILING};
use crate::fmt::fixed2;
use crate::perf::{self, PerformanceSeries};
use crate::scene::{self, pick, Scene};

pub const CLOCK_INPUT: &str = "input";
pub const CLOCK_STEP: &str = "step";
pub const CLOCK_TILE: &str = "tile";
pub const CLOCK_THREAD_BLOCK: &str = "thread-block";
pub const CLOCK_WARP: &str = "warp";

const FAST: Duration = Duration::from_millis(1000);
const STEP_INTERVAL: Duration = Duration::from_millis(1500);
const SLOW: Duration = Duration::from_millis(2000);

/// Most inputs the basic diagram draws.
pub const MAX_BASIC_INPUTS: u32 = 4;

const MATRIX_STEPS: [&str; 4] = [
    "Step 1: Start with Q, K, and V matrices",
    "Step 2: Compute QK^T",
    "Step 3: Apply softmax to QK^T",
    "Step 4: Multiply result with V to get output",
];

const THREAD_BLOCK_NOTES: [&str; 3] = [
    "Thread blocks process different parts of the sequence in parallel",
    "Each thread block handles a portion of the attention computation",
    "Improved parallelization across sequence length and batch size",
];

const WARP_NOTES: [&str; 3] = [
    "Warps within a thread block cooperate on matrix multiplications",
    "Efficient work distribution reduces shared memory access",
    "Warps process different parts of Q, K, and V matrices",
];

pub fn basic_input_count(sequence_length: u32) -> usize {
    sequence_length.min(MAX_BASIC_INPUTS) as usize
}

pub fn title(tab: TabId) -> &'static str {
    match tab {
        TabId::Basic => "Basic Attention Mechanism",
        TabId::Matrix => "Attention Matrix Computation",
        TabId::Standard => "Standard Attention Implementation",
        TabId::Tiled => "FlashAttention",
        TabId::RefinedTiled => "FlashAttention-2: Further Optimizations",
        TabId::Performance => "Performance Comparison",
    }
}

/// Cycle length of `clock` under `config`.
fn cycle_len(clock: &str, config: &Configuration) -> usize {
    match clock {
        CLOCK_INPUT => basic_input_count(config.sequence_length),
        CLOCK_TILE => {
            let blocks = perf::block_count_per_axis(config.sequence_length) as usize;
            blocks * blocks
        }
        CLOCK_STEP => MATRIX_STEPS.len(),
        CLOCK_THREAD_BLOCK => THREAD_BLOCK_NOTES.len(),
        CLOCK_WARP => WARP_NOTES.len(),
        _ => 1,
    }
}

fn clocks_for(tab: TabId, config: &Configuration) -> Vec<AnimationClock> {
    let clock = |name: &'static str, interval: Duration, initial: Option<usize>| {
        AnimationClock::new(name, interval, cycle_len(name, config), initial)
    };
    match tab {
        TabId::Basic => vec![clock(CLOCK_INPUT, FAST, None)],
        TabId::Matrix => vec![clock(CLOCK_STEP, STEP_INTERVAL, Some(0))],
        TabId::Standard | TabId::Performance => Vec::new(),
        TabId::Tiled => vec![clock(CLOCK_TILE, FAST, Some(0))],
        TabId::RefinedTiled => vec![
            clock(CLOCK_THREAD_BLOCK, SLOW, Some(0)),
            clock(CLOCK_WARP, FAST, Some(0)),
        ],
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PanelOutput {
    pub tab: TabId,
    pub title: &'static str,
    pub scene: Option<Scene>,
    pub metrics: Vec<String>,
    pub captions: Vec<String>,
    pub series: Option<PerformanceSeries>,
}

#[derive(Debug)]
pub struct Panel {
    tab: TabId,
    config: Configuration,
    clocks: Vec<AnimationClock>,
    series_ceiling: u32,
}

impl Panel {
    pub fn mount(tab: TabId, config: &Configuration, scheduler: &mut Scheduler) -> Self {
        let mut clocks = clocks_for(tab, config);
        for c in clocks.iter_mut() {
            c.start(scheduler);
        }
        debug!(%tab, clocks = clocks.len(), "panel mounted");
        Self {
            tab,
            config: *config,
            clocks,
            series_ceiling: SERIES_CEILING.default,
        }
    }

    /// Cancels every ticker the panel owns before it is dropped.
    pub fn unmount(mut self, scheduler: &mut Scheduler) {
        for c in self.clocks.iter_mut() {
            c.stop(scheduler);
        }
        debug!(tab = %self.tab, "panel unmounted");
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn clocks(&self) -> &[AnimationClock] {
        &self.clocks
    }

    pub fn clock(&self, name: &str) -> Option<&AnimationClock> {
        self.clocks.iter().find(|c| c.name() == name)
    }

    pub fn highlight(&self, clock: &str) -> Option<usize> {
        self.clock(clock).and_then(AnimationClock::highlight)
    }

    pub fn running_clocks(&self) -> usize {
        self.clocks
            .iter()
            .filter(|c| c.state() == ClockState::Running)
            .count()
    }

    pub fn owns(&self, task: TaskId) -> bool {
        self.clocks.iter().any(|c| c.task_id() == Some(task))
    }

    pub fn on_tick(&mut self, task: TaskId) -> bool {
        self.clocks.iter_mut().any(|c| c.on_tick(task))
    }

    /// Take a new snapshot and re-derive every clock's cycle length from it.
    pub fn on_config_changed(&mut self, config: &Configuration, scheduler: &mut Scheduler) {
        self.config = *config;
        for c in self.clocks.iter_mut() {
            let n = cycle_len(c.name(), config);
            c.set_modulus(n, scheduler);
        }
    }

    pub fn series_ceiling(&self) -> u32 {
        self.series_ceiling
    }

    /// Panel-local control of the performance tab; clamped like the store.
    pub fn set_series_ceiling(&mut self, ceiling: u32) -> u32 {
        self.series_ceiling = SERIES_CEILING.clamp(ceiling);
        self.series_ceiling
    }

    pub fn render(&self) -> PanelOutput {
        let mut out = PanelOutput {
            tab: self.tab,
            title: title(self.tab),
            scene: None,
            metrics: Vec::new(),
            captions: Vec::new(),
            series: None,
        };
        match self.tab {
            TabId::Basic => self.render_basic(&mut out),
            TabId::Matrix => self.render_matrix(&mut out),
            TabId::Standard => self.render_standard(&mut out),
            TabId::Tiled => self.render_tiled(&mut out),
            TabId::RefinedTiled => self.render_refined(&mut out),
            TabId::Performance => self.render_performance(&mut out),
        }
        out
    }

    fn render_basic(&self, out: &mut PanelOutput) {
        let n = basic_input_count(self.config.sequence_length);
        let focus = self.highlight(CLOCK_INPUT);
        let out_x = n as f32 * 50.0;

        let mut s = Scene::new(n as f32 * 100.0 + 100.0, 200.0);
        for i in 0..n {
            let on = focus == Some(i);
            let x = i as f32 * 100.0;
            s.rect(x, 0.0, 80.0, 40.0, pick(on, scene::BLUE));
            s.label(x + 40.0, 25.0, format!("Input {}", i + 1), scene::WHITE);
            s.line(
                (x + 40.0, 50.0),
                (out_x, 150.0),
                scene::ORANGE,
                if on { 4.0 } else { 2.0 },
                if on { 1.0 } else { 0.5 },
            );
            s.label(x + 40.0, 80.0, format!("Weight {}", i + 1), scene::ORANGE);
        }
        s.rect(out_x - 40.0, 150.0, 80.0, 40.0, scene::GREEN);
        s.label(out_x, 175.0, "Output", scene::WHITE);

        if let Some(i) = focus {
            out.captions.push(format!("Attending to Input {}", i + 1));
        }
        out.scene = Some(s);
    }

    fn render_matrix(&self, out: &mut PanelOutput) {
        let step = self.highlight(CLOCK_STEP).unwrap_or(0);
        let shown = |from: usize| if step >= from { 1.0 } else { 0.0 };

        let mut s = Scene::new(500.0, 250.0);
        s.rect(0.0, 0.0, 60.0, 100.0, scene::BLUE);
        s.label(30.0, 50.0, "Q", scene::WHITE);
        s.rect(100.0, 0.0, 100.0, 60.0, scene::ORANGE);
        s.label(150.0, 30.0, "K^T", scene::WHITE);
        s.rect(240.0, 0.0, 60.0, 100.0, scene::GREEN);
        s.label(270.0, 50.0, "V", scene::WHITE);

        s.path(
            vec![(70.0, 50.0), (90.0, 50.0), (90.0, 30.0), (110.0, 30.0)],
            shown(1),
            false,
        );
        s.text(90.0, 20.0, "*", scene::BLACK, None, shown(1));
        s.rect_with_opacity(100.0, 100.0, 100.0, 100.0, scene::PURPLE, shown(1));
        s.text(150.0, 150.0, "QK^T", scene::WHITE, None, shown(1));

        s.path(
            vec![(200.0, 150.0), (220.0, 150.0), (220.0, 50.0), (230.0, 50.0)],
            shown(2),
            false,
        );
        s.text(220.0, 40.0, "*", scene::BLACK, None, shown(2));

        s.rect_with_opacity(340.0, 100.0, 60.0, 100.0, scene::YELLOW, shown(3));
        s.text(370.0, 150.0, "Output", scene::BLACK, None, shown(3));

        out.captions.push(MATRIX_STEPS[step % MATRIX_STEPS.len()].to_string());
        out.scene = Some(s);
    }

    fn render_standard(&self, out: &mut PanelOutput) {
        let n = self.config.sequence_length;
        let h = self.config.head_dimension;
        let est = perf::standard_estimate(&self.config);

        let mut s = Scene::new(400.0, 200.0);
        s.rect(0.0, 0.0, 80.0, 200.0, scene::BLUE);
        s.text(40.0, 100.0, "Sequence Length (N)", scene::WHITE, Some(-90.0), 1.0);
        s.rect(100.0, 0.0, 200.0, 200.0, scene::ORANGE);
        s.label(200.0, 100.0, "Attention Matrix (N x N x H)", scene::WHITE);
        s.rect(320.0, 0.0, 80.0, 200.0, scene::GREEN);
        s.text(360.0, 100.0, "Head Dimension (H)", scene::WHITE, Some(-90.0), 1.0);
        out.scene = Some(s);

        out.metrics = vec![
            "Memory usage: O(N^2 * H)".to_string(),
            format!("Current sequence length: {n}"),
            format!("Current head dimension: {h}"),
            format!(
                "Attention matrix size: {n} x {n} x {h} = {} elements",
                est.matrix_element_count
            ),
            format!(
                "Memory required (assuming 4 bytes per element): {} MB",
                fixed2(est.memory_mb)
            ),
            format!("Estimated compute time: {} ms", fixed2(est.compute_time_ms)),
        ];
    }

    fn render_tiled(&self, out: &mut PanelOutput) {
        let est = perf::tiled_estimate(&self.config);
        let blocks = est.block_count_per_axis as usize;
        let current = self.highlight(CLOCK_TILE);
        let side = blocks as f32 * 110.0;

        let mut s = Scene::new(side, side);
        for i in 0..est.tile_count() {
            let (row, col) = (i / blocks, i % blocks);
            s.rect(
                col as f32 * 110.0,
                row as f32 * 110.0,
                100.0,
                100.0,
                pick(current == Some(i), scene::BLUE),
            );
        }
        out.scene = Some(s);

        if let Some(i) = current {
            out.captions.push(format!(
                "Processing block (row {}, column {})",
                i / blocks + 1,
                i % blocks + 1
            ));
        }
        out.metrics = vec![
            "Memory usage: O(N * H)".to_string(),
            format!("Current sequence length: {}", self.config.sequence_length),
            format!("Current head dimension: {}", self.config.head_dimension),
            format!("Memory required for Q, K, V: {} MB", fixed2(est.memory_mb)),
            format!("Estimated compute time: {} ms", fixed2(est.compute_time_ms)),
            format!("Number of blocks: {blocks} x {blocks}"),
        ];
    }

    fn render_refined(&self, out: &mut PanelOutput) {
        const BLOCK_FILLS: [&str; 3] = [scene::BLUE, scene::ORANGE, scene::PURPLE];
        const WARP_FILLS: [&str; 3] = [scene::PINK, scene::VIOLET, scene::RUST];

        let block = self.highlight(CLOCK_THREAD_BLOCK).unwrap_or(0);
        let warp = self.highlight(CLOCK_WARP).unwrap_or(0);

        let mut s = Scene::new(400.0, 240.0);
        for k in 0..3 {
            let x = k as f32 * 130.0;
            s.rect(x, 0.0, 120.0, 60.0, pick(block == k, BLOCK_FILLS[k]));
            s.label(x + 60.0, 30.0, format!("Thread Block {}", k + 1), scene::WHITE);
        }
        s.rect(0.0, 70.0, 380.0, 40.0, scene::YELLOW);
        s.label(190.0, 90.0, "Shared Memory", scene::WHITE);
        for k in 0..3 {
            let x = k as f32 * 130.0;
            s.rect(x, 120.0, 120.0, 60.0, pick(warp == k, WARP_FILLS[k]));
            s.label(x + 60.0, 150.0, format!("Warp {}", k + 1), scene::WHITE);
        }
        out.scene = Some(s);

        out.captions.push(THREAD_BLOCK_NOTES[block % 3].to_string());
        out.captions.push(WARP_NOTES[warp % 3].to_string());
    }

    fn render_performance(&self, out: &mut PanelOutput) {
        let h = self.config.head_dimension;
        out.metrics = vec![
            format!("Max Sequence Length: {}", self.series_ceiling),
            format!("Head dimension: {h}"),
        ];
        out.captions.push(format!(
            "The head dimension is set to {h}. FlashAttention-2 leads at every sequence length."
        ));
        out.series = Some(perf::performance_series(self.series_ceiling, h));
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        let running = self.running_clocks();
        if running > 0 {
            warn!(tab = %self.tab, running, "panel dropped with live tickers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(n: u32, h: u32, tab: TabId) -> Configuration {
        Configuration {
            sequence_length: n,
            head_dimension: h,
            active_tab: tab,
        }
    }

    fn advance(s: &mut Scheduler, p: &mut Panel, ms: u64) {
        let until = s.now_ms() + ms;
        while let Some(f) = s.pop_due(until) {
            p.on_tick(f.task);
        }
        s.settle(until);
    }

    #[test]
    fn basic_panel_cycles_inputs() {
        let mut s = Scheduler::new();
        let c = cfg(512, 64, TabId::Basic);
        let mut p = Panel::mount(TabId::Basic, &c, &mut s);

        assert_eq!(p.running_clocks(), 1);
        assert_eq!(p.highlight(CLOCK_INPUT), None);
        let out = p.render();
        assert!(out.captions.is_empty());
        let fills = out.scene.as_ref().unwrap().rect_fills();
        assert_eq!(fills.len(), 5);
        assert!(fills[..4].iter().all(|f| *f == scene::BLUE));

        advance(&mut s, &mut p, 1000);
        assert_eq!(p.highlight(CLOCK_INPUT), Some(0));
        let out = p.render();
        assert_eq!(out.scene.unwrap().rect_fills()[0], scene::HIGHLIGHT);
        assert_eq!(out.captions, vec!["Attending to Input 1".to_string()]);

        advance(&mut s, &mut p, 4000);
        assert_eq!(p.highlight(CLOCK_INPUT), Some(0));
        p.unmount(&mut s);
        assert_eq!(s.active_count(), 0);
    }

    #[test]
    fn basic_panel_shrinks_with_tiny_sequence() {
        let mut s = Scheduler::new();
        let mut p = Panel::mount(TabId::Basic, &cfg(3000, 64, TabId::Basic), &mut s);
        advance(&mut s, &mut p, 4000);
        assert_eq!(p.highlight(CLOCK_INPUT), Some(3));

        p.on_config_changed(&cfg(100, 64, TabId::Basic), &mut s);
        assert_eq!(p.clock(CLOCK_INPUT).unwrap().modulus(), 4);

        p.on_config_changed(&cfg(2, 64, TabId::Basic), &mut s);
        assert_eq!(p.clock(CLOCK_INPUT).unwrap().modulus(), 2);
        assert_eq!(p.highlight(CLOCK_INPUT), Some(1));
        let scene = p.render().scene.unwrap();
        assert_eq!(scene.rect_fills().len(), 3);
        assert_eq!(scene.width, 300.0);

        for _ in 0..5 {
            advance(&mut s, &mut p, 1000);
            assert!(p.highlight(CLOCK_INPUT).unwrap() < 2);
        }
        assert_eq!(s.active_count(), 1);
        p.unmount(&mut s);
    }

    #[test]
    fn matrix_panel_walks_four_steps() {
        let mut s = Scheduler::new();
        let mut p = Panel::mount(TabId::Matrix, &Configuration::default(), &mut s);
        assert_eq!(p.render().captions[0], MATRIX_STEPS[0]);

        advance(&mut s, &mut p, 1500);
        assert_eq!(p.render().captions[0], MATRIX_STEPS[1]);
        advance(&mut s, &mut p, 3000);
        assert_eq!(p.render().captions[0], MATRIX_STEPS[3]);
        let scene = p.render().scene.unwrap();
        assert!(scene.texts().any(|t| t == "Output"));
        advance(&mut s, &mut p, 1500);
        assert_eq!(p.highlight(CLOCK_STEP), Some(0));
        p.unmount(&mut s);
    }

    #[test]
    fn standard_panel_reports_quadratic_estimate() {
        let mut s = Scheduler::new();
        let p = Panel::mount(TabId::Standard, &cfg(512, 64, TabId::Standard), &mut s);
        assert_eq!(p.running_clocks(), 0);
        let out = p.render();
        assert!(out
            .metrics
            .contains(&"Attention matrix size: 512 x 512 x 64 = 16777216 elements".to_string()));
        assert!(out
            .metrics
            .contains(&"Memory required (assuming 4 bytes per element): 64.00 MB".to_string()));
        assert!(out
            .metrics
            .contains(&"Estimated compute time: 16.78 ms".to_string()));
        p.unmount(&mut s);
    }

    #[test]
    fn tiled_panel_cycles_every_tile() {
        let mut s = Scheduler::new();
        let mut p = Panel::mount(TabId::Tiled, &cfg(512, 64, TabId::Tiled), &mut s);
        assert_eq!(p.clock(CLOCK_TILE).unwrap().modulus(), 4);
        assert_eq!(p.highlight(CLOCK_TILE), Some(0));

        advance(&mut s, &mut p, 3000);
        let out = p.render();
        assert_eq!(p.highlight(CLOCK_TILE), Some(3));
        assert_eq!(out.captions, vec!["Processing block (row 2, column 2)".to_string()]);
        assert!(out.metrics.contains(&"Number of blocks: 2 x 2".to_string()));
        assert!(out
            .metrics
            .contains(&"Memory required for Q, K, V: 0.38 MB".to_string()));

        p.on_config_changed(&cfg(1024, 64, TabId::Tiled), &mut s);
        assert_eq!(p.clock(CLOCK_TILE).unwrap().modulus(), 16);
        assert_eq!(p.render().scene.unwrap().rect_fills().len(), 16);
        assert_eq!(s.active_count(), 1);
        p.unmount(&mut s);
    }

    #[test]
    fn refined_panel_runs_two_uncoordinated_clocks() {
        let mut s = Scheduler::new();
        let mut p = Panel::mount(TabId::RefinedTiled, &Configuration::default(), &mut s);
        assert_eq!(p.running_clocks(), 2);

        advance(&mut s, &mut p, 2000);
        assert_eq!(p.highlight(CLOCK_THREAD_BLOCK), Some(1));
        assert_eq!(p.highlight(CLOCK_WARP), Some(2));
        let out = p.render();
        assert_eq!(out.captions[0], THREAD_BLOCK_NOTES[1]);
        assert_eq!(out.captions[1], WARP_NOTES[2]);
        let fills = out.scene.unwrap().rect_fills();
        assert_eq!(fills[1], scene::HIGHLIGHT);
        assert_eq!(fills[6], scene::HIGHLIGHT);

        // Sequence length does not bound these cycles.
        p.on_config_changed(&cfg(4096, 128, TabId::RefinedTiled), &mut s);
        assert_eq!(p.clock(CLOCK_WARP).unwrap().modulus(), 3);
        p.unmount(&mut s);
        assert_eq!(s.active_count(), 0);
    }

    #[test]
    fn performance_panel_emits_series_for_local_ceiling() {
        let mut s = Scheduler::new();
        let mut p = Panel::mount(TabId::Performance, &cfg(512, 64, TabId::Performance), &mut s);
        assert_eq!(p.render().series.unwrap().len(), 6);

        assert_eq!(p.set_series_ceiling(16384), 16384);
        assert_eq!(p.render().series.unwrap().len(), 8);
        assert_eq!(p.set_series_ceiling(10), 1024);
        assert_eq!(p.render().series.unwrap().len(), 4);

        p.on_config_changed(&cfg(512, 128, TabId::Performance), &mut s);
        assert_eq!(p.render().series.unwrap().head_dimension, 128);
        p.unmount(&mut s);
    }

    #[test]
    fn unmount_cancels_only_its_own_tickers() {
        let mut s = Scheduler::new();
        let mut p = Panel::mount(TabId::Tiled, &Configuration::default(), &mut s);
        let id = p.clock(CLOCK_TILE).unwrap().task_id().unwrap();
        assert!(p.owns(id));
        advance(&mut s, &mut p, 1000);

        let p2 = Panel::mount(TabId::Tiled, &Configuration::default(), &mut s);
        p.unmount(&mut s);
        assert!(!s.is_active(id));
        assert_eq!(s.active_count(), 1);
        assert!(!p2.owns(id));
        p2.unmount(&mut s);
    }
}
