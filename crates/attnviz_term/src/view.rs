//! Plain-text rendering of panel output for the terminal.

use std::fmt::Write as _;

use attnviz::fmt::fixed2;
use attnviz::panel::{Panel, PanelOutput};
use attnviz::perf::{PerformanceSeries, Variant};

pub fn render_text(out: &PanelOutput) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "== {} [{}] ==", out.title, out.tab);
    for m in &out.metrics {
        let _ = writeln!(s, "  {m}");
    }
    for c in &out.captions {
        let _ = writeln!(s, "  > {c}");
    }
    if let Some(scene) = &out.scene {
        let _ = writeln!(
            s,
            "  scene {}x{}, {} shapes",
            scene.width,
            scene.height,
            scene.shapes.len()
        );
    }
    if let Some(series) = &out.series {
        s.push_str(&series_table(series));
    }
    s
}

pub fn series_table(series: &PerformanceSeries) -> String {
    let mut s = String::new();
    let _ = write!(s, "{:>8}", "seq_len");
    for v in Variant::all() {
        let _ = write!(s, " {:>18}", v.display_name());
    }
    s.push('\n');
    for row in series.rows() {
        let _ = write!(s, "{:>8}", row.sequence_length);
        for v in Variant::all() {
            let _ = write!(s, " {:>18}", fixed2(row.value(*v)));
        }
        s.push('\n');
    }
    s
}

/// One-line summary printed after ticks: `[3000ms] flash tile=2`.
pub fn tick_line(now_ms: u64, panel: &Panel) -> String {
    let mut s = format!("[{now_ms}ms] {}", panel.tab());
    for clock in panel.clocks() {
        match clock.highlight() {
            Some(h) => {
                let _ = write!(s, " {}={}/{}", clock.name(), h, clock.modulus());
            }
            None => {
                let _ = write!(s, " {}=-", clock.name());
            }
        }
    }
    s
}
