//! Declarative drawing description handed to an external surface.

#[cfg(feature = "serde")]
use serde::Serialize;

pub const BLUE: &str = "#4299e1";
pub const GREEN: &str = "#48bb78";
pub const ORANGE: &str = "#ed8936";
pub const PURPLE: &str = "#9f7aea";
pub const YELLOW: &str = "#f6e05e";
pub const PINK: &str = "#d53f8c";
pub const VIOLET: &str = "#805ad5";
pub const RUST: &str = "#dd6b20";
pub const WHITE: &str = "white";
pub const BLACK: &str = "black";

/// Fill used for whatever element the panel's clock currently points at.
pub const HIGHLIGHT: &str = GREEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Anchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: &'static str,
        opacity: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: &'static str,
        width: f32,
        opacity: f32,
    },
    Text {
        x: f32,
        y: f32,
        content: String,
        fill: &'static str,
        anchor: Anchor,
        /// Degrees, clockwise, around the text origin.
        rotate: Option<f32>,
        opacity: f32,
    },
    /// Open polyline; `arrow` asks for a head at the last point.
    Path {
        points: Vec<(f32, f32)>,
        stroke: &'static str,
        width: f32,
        opacity: f32,
        arrow: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            shapes: Vec::new(),
        }
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: &'static str) {
        self.rect_with_opacity(x, y, width, height, fill, 1.0);
    }

    pub fn rect_with_opacity(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: &'static str,
        opacity: f32,
    ) {
        self.shapes.push(Shape::Rect {
            x,
            y,
            width,
            height,
            fill,
            opacity,
        });
    }

    pub fn line(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        stroke: &'static str,
        width: f32,
        opacity: f32,
    ) {
        self.shapes.push(Shape::Line {
            x1: from.0,
            y1: from.1,
            x2: to.0,
            y2: to.1,
            stroke,
            width,
            opacity,
        });
    }

    pub fn label(&mut self, x: f32, y: f32, content: impl Into<String>, fill: &'static str) {
        self.text(x, y, content, fill, None, 1.0);
    }

    pub fn text(
        &mut self,
        x: f32,
        y: f32,
        content: impl Into<String>,
        fill: &'static str,
        rotate: Option<f32>,
        opacity: f32,
    ) {
        self.shapes.push(Shape::Text {
            x,
            y,
            content: content.into(),
            fill,
            anchor: Anchor::Middle,
            rotate,
            opacity,
        });
    }

    pub fn path(&mut self, points: Vec<(f32, f32)>, opacity: f32, arrow: bool) {
        self.shapes.push(Shape::Path {
            points,
            stroke: BLACK,
            width: 2.0,
            opacity,
            arrow,
        });
    }

    /// Fills of every `Rect`, in draw order.
    pub fn rect_fills(&self) -> Vec<&'static str> {
        self.shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Rect { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

/// Highlight fill when `selected`, otherwise `base`.
pub fn pick(selected: bool, base: &'static str) -> &'static str {
    if selected {
        HIGHLIGHT
    } else {
        base
    }
}
