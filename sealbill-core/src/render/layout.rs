//! Deterministic row pagination.
//!
//! Layout never touches a canvas. Every placement takes the current
//! [`LayoutState`] by value and returns the next one, so a table can be
//! planned, inspected and tested before anything is drawn.
use super::wrap::TextWrapper;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page geometry in points, measured from the top of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutMetrics {
    pub page_width: f64,
    pub page_height: f64,
    /// Top of the item table on the first page.
    pub first_table_top: f64,
    /// Top of the item table on every following page.
    pub continuation_table_top: f64,
    pub header_row_height: f64,
    pub row_spacing: f64,
    /// Offset of row text below the row's top edge.
    pub row_text_inset: f64,
    pub line_height: f64,
    pub printable_bottom: f64,
    pub totals_block_height: f64,
    /// Wrap budget for item labels, in characters.
    pub label_wrap_width: usize,
    /// Wrap budget for item details, in characters.
    pub detail_wrap_width: usize,
    pub footer_y: f64,
}

impl Default for LayoutMetrics {
    // A4 portrait
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            first_table_top: 270.0,
            continuation_table_top: 50.0,
            header_row_height: 20.0,
            row_spacing: 15.0,
            row_text_inset: 5.0,
            line_height: 10.0,
            printable_bottom: 750.0,
            totals_block_height: 100.0,
            label_wrap_width: 18,
            detail_wrap_width: 40,
            footer_y: 810.0,
        }
    }
}

impl LayoutMetrics {
    /// Reject geometry that could never hold a table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("pageWidth", self.page_width),
            ("pageHeight", self.page_height),
            ("firstTableTop", self.first_table_top),
            ("continuationTableTop", self.continuation_table_top),
            ("headerRowHeight", self.header_row_height),
            ("rowSpacing", self.row_spacing),
            ("rowTextInset", self.row_text_inset),
            ("lineHeight", self.line_height),
            ("printableBottom", self.printable_bottom),
            ("totalsBlockHeight", self.totals_block_height),
            ("footerY", self.footer_y),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(geometry(format!("{name} must be a non-negative number")));
            }
        }
        if self.page_width == 0.0 || self.page_height == 0.0 {
            return Err(geometry("page size must be positive".to_string()));
        }
        if self.line_height == 0.0 {
            return Err(geometry("lineHeight must be positive".to_string()));
        }
        if self.label_wrap_width == 0 || self.detail_wrap_width == 0 {
            return Err(geometry("wrap widths must be positive".to_string()));
        }
        if self.printable_bottom > self.page_height {
            return Err(geometry(format!(
                "printableBottom {} is below the page height {}",
                self.printable_bottom, self.page_height
            )));
        }
        if self.footer_y > self.page_height {
            return Err(geometry(format!(
                "footerY {} is below the page height {}",
                self.footer_y, self.page_height
            )));
        }
        let table_top = self.first_table_top.max(self.continuation_table_top);
        if table_top + self.header_row_height >= self.printable_bottom {
            return Err(geometry(
                "table header leaves no room above printableBottom".to_string(),
            ));
        }
        if self.continuation_table_top + self.totals_block_height > self.printable_bottom {
            return Err(geometry(
                "totals block does not fit on a continuation page".to_string(),
            ));
        }
        Ok(())
    }

    /// Cursor right below the column header on a continuation page.
    pub fn continuation_row_start(&self) -> f64 {
        self.continuation_table_top + self.header_row_height
    }
}

fn geometry(message: String) -> ConfigError {
    ConfigError::Geometry(message)
}

/// Position of the layout between placements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutState {
    pub page: u32,
    pub cursor: f64,
    pub rows_on_page: usize,
}

impl LayoutState {
    /// First row slot of page 1, under the column header.
    pub fn first_page(metrics: &LayoutMetrics) -> Self {
        Self {
            page: 1,
            cursor: metrics.first_table_top + metrics.header_row_height,
            rows_on_page: 0,
        }
    }

    fn next_page(self, cursor: f64) -> Self {
        Self {
            page: self.page + 1,
            cursor,
            rows_on_page: 0,
        }
    }
}

/// Wrapped size of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowExtent {
    pub label_lines: usize,
    pub detail_lines: usize,
}

impl RowExtent {
    pub fn new(label_lines: usize, detail_lines: usize) -> Self {
        Self {
            label_lines,
            detail_lines,
        }
    }

    /// Wrap label and detail independently at their column widths.
    pub fn measure<W: TextWrapper + ?Sized>(
        label: &str,
        detail: Option<&str>,
        wrapper: &W,
        metrics: &LayoutMetrics,
    ) -> Self {
        Self {
            label_lines: wrapper.line_count(label, metrics.label_wrap_width),
            detail_lines: detail
                .map(|detail| wrapper.line_count(detail, metrics.detail_wrap_width))
                .unwrap_or(0),
        }
    }

    /// Lines the row occupies; never less than one.
    pub fn lines(&self) -> usize {
        self.label_lines.max(self.detail_lines).max(1)
    }

    pub fn height(&self, metrics: &LayoutMetrics) -> f64 {
        self.lines() as f64 * metrics.line_height
    }
}

/// A row too tall for an empty continuation page. It is still placed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row of {row_height}pt exceeds the {available}pt available on page {page}")]
pub struct LayoutOverflow {
    pub page: u32,
    pub row_height: f64,
    pub available: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowPlacement {
    pub page: u32,
    /// Baseline of the first text line.
    pub text_y: f64,
    /// Separator under the row; also the cursor after it.
    pub separator_y: f64,
    pub height: f64,
    /// A new page was started for this row.
    pub page_break: bool,
    pub overflow: Option<LayoutOverflow>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalsPlacement {
    pub page: u32,
    /// Top edge of the totals block.
    pub top: f64,
    pub page_break: bool,
}

/// Place one row, breaking to a new page first when it would cross
/// `printable_bottom`.
pub fn place_row(
    state: LayoutState,
    extent: &RowExtent,
    metrics: &LayoutMetrics,
) -> (LayoutState, RowPlacement) {
    let height = extent.height(metrics);
    let fits = |state: &LayoutState| {
        state.cursor + metrics.row_spacing + height <= metrics.printable_bottom
    };

    let mut state = state;
    let mut page_break = false;
    let fresh_continuation = state.page > 1 && state.rows_on_page == 0;
    if !fits(&state) && !fresh_continuation {
        state = state.next_page(metrics.continuation_row_start());
        page_break = true;
    }

    let overflow = (!fits(&state)).then(|| LayoutOverflow {
        page: state.page,
        row_height: height,
        available: metrics.printable_bottom - state.cursor - metrics.row_spacing,
    });

    let placement = RowPlacement {
        page: state.page,
        text_y: state.cursor + metrics.row_text_inset,
        separator_y: state.cursor + metrics.row_spacing + height,
        height,
        page_break,
        overflow,
    };
    let next = LayoutState {
        page: state.page,
        cursor: placement.separator_y,
        rows_on_page: state.rows_on_page + 1,
    };
    (next, placement)
}

/// Place the totals block, moving it whole to a new page when it would not
/// fit above `printable_bottom`.
pub fn place_totals(state: LayoutState, metrics: &LayoutMetrics) -> (LayoutState, TotalsPlacement) {
    if state.cursor > metrics.printable_bottom - metrics.totals_block_height {
        let state = state.next_page(metrics.continuation_table_top);
        let placement = TotalsPlacement {
            page: state.page,
            top: state.cursor,
            page_break: true,
        };
        return (state, placement);
    }
    let placement = TotalsPlacement {
        page: state.page,
        top: state.cursor,
        page_break: false,
    };
    (state, placement)
}

/// Row and totals placements for a whole table.
#[derive(Debug, Clone, PartialEq)]
pub struct TablePlan {
    pub rows: Vec<RowPlacement>,
    pub totals: TotalsPlacement,
    pub page_count: u32,
}

impl TablePlan {
    pub fn overflows(&self) -> impl Iterator<Item = &LayoutOverflow> {
        self.rows.iter().filter_map(|row| row.overflow.as_ref())
    }
}

pub fn plan_table(extents: &[RowExtent], metrics: &LayoutMetrics) -> TablePlan {
    let mut state = LayoutState::first_page(metrics);
    let mut rows = Vec::with_capacity(extents.len());
    for (index, extent) in extents.iter().enumerate() {
        let (next, placement) = place_row(state, extent, metrics);
        if let Some(overflow) = &placement.overflow {
            tracing::warn!(
                row = index,
                page = overflow.page,
                row_height = overflow.row_height,
                available = overflow.available,
                "row does not fit on an empty page, placing it anyway"
            );
        }
        rows.push(placement);
        state = next;
    }
    let (state, totals) = place_totals(state, metrics);
    TablePlan {
        rows,
        totals,
        page_count: state.page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::WordWrap;

    #[test]
    fn default_metrics_are_valid() {
        LayoutMetrics::default().validate().expect("defaults validate");
    }

    #[test]
    fn validate_rejects_totals_taller_than_page() {
        let metrics = LayoutMetrics {
            totals_block_height: 720.0,
            ..LayoutMetrics::default()
        };
        assert!(matches!(metrics.validate(), Err(ConfigError::Geometry(_))));

        let metrics = LayoutMetrics {
            line_height: f64::NAN,
            ..LayoutMetrics::default()
        };
        assert!(metrics.validate().is_err());
    }

    #[test]
    fn row_height_uses_the_taller_column() {
        let metrics = LayoutMetrics::default();
        let extent = RowExtent::measure(
            "Widget",
            Some("A very long description that needs more than one line of text to fit"),
            &WordWrap,
            &metrics,
        );
        assert_eq!(extent.label_lines, 1);
        assert_eq!(extent.detail_lines, 2);
        assert_eq!(extent.height(&metrics), 20.0);
    }

    #[test]
    fn blank_row_still_takes_one_line() {
        let metrics = LayoutMetrics::default();
        let extent = RowExtent::measure("", None, &WordWrap, &metrics);
        assert_eq!(extent.lines(), 1);
    }

    #[test]
    fn row_positions_follow_cursor() {
        let metrics = LayoutMetrics::default();
        let state = LayoutState::first_page(&metrics);
        let (next, row) = place_row(state, &RowExtent::new(2, 1), &metrics);

        assert_eq!(row.page, 1);
        assert_eq!(row.text_y, 295.0);
        assert_eq!(row.separator_y, 325.0);
        assert!(!row.page_break);
        assert_eq!(next.cursor, 325.0);
        assert_eq!(next.rows_on_page, 1);
    }

    #[test]
    fn totals_move_whole_to_next_page() {
        let metrics = LayoutMetrics::default();
        let state = LayoutState {
            page: 2,
            cursor: 651.0,
            rows_on_page: 5,
        };
        let (next, totals) = place_totals(state, &metrics);
        assert!(totals.page_break);
        assert_eq!(totals.page, 3);
        assert_eq!(totals.top, 50.0);
        assert_eq!(next.page, 3);

        let state = LayoutState {
            cursor: 650.0,
            ..state
        };
        let (_, totals) = place_totals(state, &metrics);
        assert!(!totals.page_break);
        assert_eq!(totals.top, 650.0);
    }
}
