use attnviz::fmt::fixed;
use attnviz::perf::{PerformanceSeries, Variant};
use web_sys::HtmlCanvasElement;

use super::canvas::context_2d;

const PAD_LEFT: f64 = 48.0;
const PAD_BOTTOM: f64 = 28.0;
const PAD_TOP: f64 = 12.0;

/// Throughput against sequence length, one line per variant.
pub fn draw_series_chart(
    canvas: &HtmlCanvasElement,
    series: &PerformanceSeries,
    bg_color: &str,
    grid_color: &str,
) -> Result<(), String> {
    let ctx = context_2d(canvas)?;

    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let plot_w = (w - PAD_LEFT).max(1.0);
    let plot_h = (h - PAD_TOP - PAD_BOTTOM).max(1.0);

    // Background
    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(bg_color);
    ctx.fill_rect(0.0, 0.0, w, h);

    let max_y = series.max_throughput().max(1.0);
    let max_x = series.ceiling.max(1) as f64;
    let to_x = |n: u32| PAD_LEFT + (n as f64 / max_x) * plot_w;
    let to_y = |v: f64| PAD_TOP + plot_h - (v / max_y).clamp(0.0, 1.0) * plot_h;

    // Grid lines with throughput labels
    ctx.set_stroke_style_str(grid_color);
    ctx.set_fill_style_str(grid_color);
    ctx.set_line_width(0.5);
    ctx.set_font("11px sans-serif");
    ctx.set_text_align("end");
    for i in 0..=5 {
        let v = max_y * (i as f64) / 5.0;
        let y = to_y(v);
        ctx.begin_path();
        ctx.move_to(PAD_LEFT, y);
        ctx.line_to(w, y);
        ctx.stroke();
        let _ = ctx.fill_text(&fixed(v, 0), PAD_LEFT - 6.0, y + 4.0);
    }
    ctx.set_text_align("center");
    let _ = ctx.fill_text("Sequence Length", PAD_LEFT + plot_w / 2.0, h - 6.0);

    if series.is_empty() {
        return Ok(());
    }

    for (k, &variant) in Variant::all().iter().enumerate() {
        ctx.set_stroke_style_str(variant.color());
        ctx.set_line_width(2.0);
        ctx.begin_path();
        for (i, row) in series.rows().iter().enumerate() {
            let x = to_x(row.sequence_length);
            let y = to_y(row.value(variant));
            if i == 0 {
                ctx.move_to(x, y);
            } else {
                ctx.line_to(x, y);
            }
        }
        ctx.stroke();

        // Legend
        let ly = PAD_TOP + 14.0 + 16.0 * k as f64;
        ctx.set_fill_style_str(variant.color());
        ctx.fill_rect(w - 190.0, ly - 9.0, 10.0, 10.0);
        ctx.set_text_align("start");
        let _ = ctx.fill_text(variant.display_name(), w - 174.0, ly);
    }
    Ok(())
}
