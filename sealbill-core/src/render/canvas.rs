//! Drawing surface used by the invoice renderer.
//!
//! Coordinates are in points, measured from the top-left corner of the page.
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Body text colour.
    pub const INK: Rgb = Rgb::new(0x44, 0x44, 0x44);
    /// Separator colour.
    pub const RULE: Rgb = Rgb::new(0xaa, 0xaa, 0xaa);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Box and alignment for a text run. Without a width the text starts at `x`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextOptions {
    pub width: Option<f64>,
    pub align: Align,
}

impl TextOptions {
    pub fn boxed(width: f64, align: Align) -> Self {
        Self {
            width: Some(width),
            align,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("unsupported image: {0}")]
    Image(String),
    #[error("font unavailable: {0}")]
    Font(String),
    #[error("failed to serialize document: {0}")]
    Output(String),
}

/// Minimal set of drawing primitives.
///
/// Implementations keep track of the current page, font and fill colour;
/// the renderer never reads any of that back.
pub trait Canvas {
    type Output;

    fn text(&mut self, text: &str, x: f64, y: f64, options: TextOptions);

    /// Place an encoded image scaled to `width`, preserving its aspect ratio.
    fn image(&mut self, data: &[u8], x: f64, y: f64, width: f64) -> Result<(), CanvasError>;

    fn stroke(&mut self, from: Point, to: Point, color: Rgb, width: f64);

    fn add_page(&mut self);

    fn set_fill_color(&mut self, color: Rgb);

    fn set_font(&mut self, style: FontStyle, size: f64);

    fn finish(self) -> Result<Self::Output, CanvasError>;
}

/// A draw call captured by [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        page: u32,
        text: String,
        x: f64,
        y: f64,
        options: TextOptions,
        style: FontStyle,
        size: f64,
        color: Rgb,
    },
    Image {
        page: u32,
        x: f64,
        y: f64,
        width: f64,
        bytes: usize,
    },
    Stroke {
        page: u32,
        from: Point,
        to: Point,
        color: Rgb,
        width: f64,
    },
    AddPage {
        page: u32,
    },
}

impl DrawOp {
    pub fn page(&self) -> u32 {
        match self {
            DrawOp::Text { page, .. }
            | DrawOp::Image { page, .. }
            | DrawOp::Stroke { page, .. }
            | DrawOp::AddPage { page } => *page,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Canvas that stores draw calls instead of producing a file.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    page: u32,
    style: FontStyle,
    size: f64,
    color: Rgb,
    ops: Vec<DrawOp>,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self {
            page: 1,
            style: FontStyle::Regular,
            size: 10.0,
            color: Rgb::BLACK,
            ops: Vec::new(),
        }
    }
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }
}

impl Canvas for RecordingCanvas {
    type Output = Vec<DrawOp>;

    fn text(&mut self, text: &str, x: f64, y: f64, options: TextOptions) {
        self.ops.push(DrawOp::Text {
            page: self.page,
            text: text.to_string(),
            x,
            y,
            options,
            style: self.style,
            size: self.size,
            color: self.color,
        });
    }

    fn image(&mut self, data: &[u8], x: f64, y: f64, width: f64) -> Result<(), CanvasError> {
        if data.is_empty() {
            return Err(CanvasError::Image("empty image data".to_string()));
        }
        self.ops.push(DrawOp::Image {
            page: self.page,
            x,
            y,
            width,
            bytes: data.len(),
        });
        Ok(())
    }

    fn stroke(&mut self, from: Point, to: Point, color: Rgb, width: f64) {
        self.ops.push(DrawOp::Stroke {
            page: self.page,
            from,
            to,
            color,
            width,
        });
    }

    fn add_page(&mut self) {
        self.page += 1;
        self.ops.push(DrawOp::AddPage { page: self.page });
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.color = color;
    }

    fn set_font(&mut self, style: FontStyle, size: f64) {
        self.style = style;
        self.size = size;
    }

    fn finish(self) -> Result<Vec<DrawOp>, CanvasError> {
        Ok(self.ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_tracks_page_and_font_state() {
        let mut canvas = RecordingCanvas::new();
        canvas.set_font(FontStyle::Bold, 20.0);
        canvas.text("first", 30.0, 57.0, TextOptions::default());
        canvas.add_page();
        canvas.set_fill_color(Rgb::INK);
        canvas.text("second", 30.0, 70.0, TextOptions::boxed(90.0, Align::Right));

        let ops = canvas.finish().expect("recording never fails");
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].page(), 1);
        assert_eq!(ops[1], DrawOp::AddPage { page: 2 });
        match &ops[2] {
            DrawOp::Text {
                page,
                style,
                size,
                color,
                ..
            } => {
                assert_eq!(*page, 2);
                assert_eq!(*style, FontStyle::Bold);
                assert_eq!(*size, 20.0);
                assert_eq!(*color, Rgb::INK);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn recording_rejects_empty_images() {
        let mut canvas = RecordingCanvas::new();
        assert!(canvas.image(&[], 0.0, 0.0, 10.0).is_err());
        assert!(canvas.ops().is_empty());
    }
}
