use attnviz::scene::{Anchor, Scene, Shape};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const BACKGROUND: &str = "#1a202c";
const FONT: &str = "14px sans-serif";
const ARROW_LEN: f64 = 8.0;

pub(super) fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, String> {
    canvas
        .get_context("2d")
        .map_err(|_| "canvas: get_context threw".to_string())?
        .ok_or("canvas: missing 2d context".to_string())?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "canvas: context is not 2d".to_string())
}

pub(super) fn canvas_by_id(id: &str) -> Option<HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<HtmlCanvasElement>()
        .ok()
}

/// Paint `scene` scaled to fill the canvas.
pub(super) fn paint_scene(canvas: &HtmlCanvasElement, scene: &Scene) -> Result<(), String> {
    let ctx = context_2d(canvas)?;
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;

    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.save();
    ctx.scale(w / scene.width.max(1.0) as f64, h / scene.height.max(1.0) as f64)
        .map_err(|_| "canvas: scale failed".to_string())?;
    ctx.set_font(FONT);
    let res = scene.shapes.iter().try_for_each(|s| paint_shape(&ctx, s));
    ctx.restore();
    res
}

fn paint_shape(ctx: &CanvasRenderingContext2d, shape: &Shape) -> Result<(), String> {
    match shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            fill,
            opacity,
        } => {
            ctx.set_global_alpha(*opacity as f64);
            ctx.set_fill_style_str(fill);
            ctx.fill_rect(*x as f64, *y as f64, *width as f64, *height as f64);
        }
        Shape::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            width,
            opacity,
        } => {
            ctx.set_global_alpha(*opacity as f64);
            ctx.set_stroke_style_str(stroke);
            ctx.set_line_width(*width as f64);
            ctx.begin_path();
            ctx.move_to(*x1 as f64, *y1 as f64);
            ctx.line_to(*x2 as f64, *y2 as f64);
            ctx.stroke();
        }
        Shape::Text {
            x,
            y,
            content,
            fill,
            anchor,
            rotate,
            opacity,
        } => {
            ctx.set_global_alpha(*opacity as f64);
            ctx.set_fill_style_str(fill);
            ctx.set_text_align(match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "center",
            });
            match rotate {
                Some(deg) => {
                    ctx.save();
                    let drawn = ctx
                        .translate(*x as f64, *y as f64)
                        .and_then(|_| ctx.rotate((*deg as f64).to_radians()))
                        .and_then(|_| ctx.fill_text(content, 0.0, 0.0));
                    ctx.restore();
                    drawn.map_err(|_| "canvas: rotated text failed".to_string())?;
                }
                None => ctx
                    .fill_text(content, *x as f64, *y as f64)
                    .map_err(|_| "canvas: fill_text failed".to_string())?,
            }
        }
        Shape::Path {
            points,
            stroke,
            width,
            opacity,
            arrow,
        } => {
            let Some(&(x0, y0)) = points.first() else {
                return Ok(());
            };
            ctx.set_global_alpha(*opacity as f64);
            ctx.set_stroke_style_str(stroke);
            ctx.set_line_width(*width as f64);
            ctx.begin_path();
            ctx.move_to(x0 as f64, y0 as f64);
            for &(x, y) in &points[1..] {
                ctx.line_to(x as f64, y as f64);
            }
            ctx.stroke();

            if *arrow && points.len() >= 2 {
                let (ax, ay) = points[points.len() - 2];
                let (bx, by) = points[points.len() - 1];
                let angle = ((by - ay) as f64).atan2((bx - ax) as f64);
                ctx.begin_path();
                for side in [-0.5f64, 0.5] {
                    ctx.move_to(bx as f64, by as f64);
                    ctx.line_to(
                        bx as f64 - ARROW_LEN * (angle + side).cos(),
                        by as f64 - ARROW_LEN * (angle + side).sin(),
                    );
                }
                ctx.stroke();
            }
        }
    }
    ctx.set_global_alpha(1.0);
    Ok(())
}
