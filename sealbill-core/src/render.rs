//! Paginated invoice documents.
//!
//! [`InvoicePdf`] decides what goes where; a [`Canvas`] decides how it is
//! drawn. Pagination lives in the pure functions of the `layout` module.
mod canvas;
mod document;
mod i18n;
pub mod layout;
mod pdf;
mod wrap;

pub use canvas::{
    Align, Canvas, CanvasError, DrawOp, FontStyle, Point, RecordingCanvas, Rgb, TextOptions,
};
pub use document::{InvoicePdf, RenderError, RenderedDocument};
pub use i18n::{Catalog, Translator};
pub use layout::{
    LayoutMetrics, LayoutOverflow, LayoutState, RowExtent, RowPlacement, TablePlan,
    TotalsPlacement, place_row, place_totals, plan_table,
};
pub use pdf::PdfCanvas;
pub use wrap::{TextWrapper, WordWrap};
