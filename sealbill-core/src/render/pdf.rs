use super::canvas::{Align, Canvas, CanvasError, FontStyle, Point, Rgb, TextOptions};
use super::layout::LayoutMetrics;
use printpdf::image_crate::{self, GenericImageView};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference,
};

const LAYER_NAME: &str = "Layer 1";
const IMAGE_DPI: f32 = 300.0;
// Helvetica averages about half an em per glyph.
const AVERAGE_GLYPH_WIDTH: f64 = 0.5;
// Baseline sits this far below the top of the text box, in ems.
const ASCENT: f64 = 0.8;

fn mm(points: f64) -> Mm {
    Mm((points * 25.4 / 72.0) as f32)
}

fn pdf_color(color: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(
        f32::from(color.r) / 255.0,
        f32::from(color.g) / 255.0,
        f32::from(color.b) / 255.0,
        None,
    ))
}

/// [`Canvas`] backed by a printpdf document using the builtin Helvetica faces.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    page_width: f64,
    page_height: f64,
    style: FontStyle,
    size: f64,
}

impl PdfCanvas {
    pub fn new(title: &str, metrics: &LayoutMetrics) -> Result<Self, CanvasError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            mm(metrics.page_width),
            mm(metrics.page_height),
            LAYER_NAME,
        );
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| CanvasError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| CanvasError::Font(e.to_string()))?;

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            page_width: metrics.page_width,
            page_height: metrics.page_height,
            style: FontStyle::Regular,
            size: 10.0,
        })
    }

    fn font(&self) -> &IndirectFontRef {
        match self.style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }

    fn estimated_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.size * AVERAGE_GLYPH_WIDTH
    }
}

impl Canvas for PdfCanvas {
    type Output = Vec<u8>;

    fn text(&mut self, text: &str, x: f64, y: f64, options: TextOptions) {
        for (index, line) in text.lines().enumerate() {
            let x = match (options.width, options.align) {
                (Some(width), Align::Right) => x + width - self.estimated_width(line),
                (Some(width), Align::Center) => x + (width - self.estimated_width(line)) / 2.0,
                _ => x,
            };
            let top = y + index as f64 * self.size;
            let baseline = self.page_height - top - self.size * ASCENT;
            self.layer
                .use_text(line, self.size as f32, mm(x), mm(baseline), self.font());
        }
    }

    fn image(&mut self, data: &[u8], x: f64, y: f64, width: f64) -> Result<(), CanvasError> {
        let decoded =
            image_crate::load_from_memory(data).map_err(|e| CanvasError::Image(e.to_string()))?;
        let (pixels_wide, pixels_high) = decoded.dimensions();
        if pixels_wide == 0 || pixels_high == 0 {
            return Err(CanvasError::Image("image has no pixels".to_string()));
        }

        let natural_width = f64::from(pixels_wide) * 72.0 / f64::from(IMAGE_DPI);
        let scale = width / natural_width;
        let height = width * f64::from(pixels_high) / f64::from(pixels_wide);

        let rgb = image_crate::DynamicImage::ImageRgb8(decoded.to_rgb8());
        Image::from_dynamic_image(&rgb).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(mm(x)),
                translate_y: Some(mm(self.page_height - y - height)),
                scale_x: Some(scale as f32),
                scale_y: Some(scale as f32),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn stroke(&mut self, from: Point, to: Point, color: Rgb, width: f64) {
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(width as f32);
        self.layer.add_line(Line {
            points: vec![
                (
                    printpdf::Point::new(mm(from.x), mm(self.page_height - from.y)),
                    false,
                ),
                (
                    printpdf::Point::new(mm(to.x), mm(self.page_height - to.y)),
                    false,
                ),
            ],
            is_closed: false,
        });
    }

    fn add_page(&mut self) {
        let (page, layer) =
            self.doc
                .add_page(mm(self.page_width), mm(self.page_height), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.layer.set_fill_color(pdf_color(color));
    }

    fn set_font(&mut self, style: FontStyle, size: f64) {
        self.style = style;
        self.size = size;
    }

    fn finish(self) -> Result<Vec<u8>, CanvasError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| CanvasError::Output(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_convert_to_millimetres() {
        let Mm(a4_width) = mm(595.28);
        assert!((a4_width - 210.0).abs() < 0.01);
    }

    #[test]
    fn empty_document_serializes() {
        let mut canvas = PdfCanvas::new("test", &LayoutMetrics::default()).expect("builtin fonts");
        canvas.set_font(FontStyle::Bold, 20.0);
        canvas.text("Hello", 30.0, 57.0, TextOptions::default());
        canvas.add_page();
        let bytes = canvas.finish().expect("pdf bytes");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn garbage_image_is_rejected() {
        let mut canvas = PdfCanvas::new("test", &LayoutMetrics::default()).expect("builtin fonts");
        let err = canvas.image(b"not an image", 10.0, 40.0, 80.0).unwrap_err();
        assert!(matches!(err, CanvasError::Image(_)));
    }
}
