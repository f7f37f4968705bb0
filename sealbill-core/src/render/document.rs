use super::canvas::{Align, Canvas, CanvasError, FontStyle, Point, Rgb, TextOptions};
use super::i18n::Translator;
use super::layout::{LayoutMetrics, LayoutOverflow, RowExtent, RowPlacement, TablePlan, plan_table};
use super::wrap::TextWrapper;
use crate::config::Locale;
use crate::invoice::{
    EncodingError, InvoiceData, LineItem, PaymentStatus, SignedInvoice, VerificationCode,
    format_currency,
};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::path::PathBuf;
use thiserror::Error;

const MARGIN_X: f64 = 30.0;
const RULE_END_X: f64 = 550.0;
const RULE_WIDTH: f64 = 1.0;
const BODY_SIZE: f64 = 10.0;
const TITLE_SIZE: f64 = 20.0;
const CAPTION_SIZE: f64 = 8.0;

const LOGO_X: f64 = 10.0;
const LOGO_Y: f64 = 40.0;
const LOGO_WIDTH: f64 = 80.0;
const QR_X: f64 = 450.0;
const QR_Y: f64 = 30.0;
const QR_WIDTH: f64 = 120.0;
const QR_CAPTION_Y: f64 = 150.0;

const CUSTOMER_TITLE_Y: f64 = 160.0;
const CUSTOMER_RULE_Y: f64 = 185.0;
const CUSTOMER_TOP: f64 = 200.0;
const CUSTOMER_BOTTOM_RULE_Y: f64 = 252.0;
const CUSTOMER_VALUE_X: f64 = 130.0;
const CLIENT_X: f64 = 280.0;
const PAGE_NUMBER_X: f64 = 500.0;

const DETAIL_X: f64 = 130.0;
const UNIT_PRICE_X: f64 = 280.0;
const QUANTITY_X: f64 = 370.0;
const NUMBER_COLUMN_WIDTH: f64 = 90.0;
const TOTAL_X: f64 = 460.0;
const TOTAL_COLUMN_WIDTH: f64 = 105.0;

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("failed to read logo '{path}': {source}")]
    Logo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("background task failed: {0}")]
    Join(String),
}

/// Line item wrapped to the table's column widths.
#[derive(Debug, Clone)]
struct WrappedRow {
    extent: RowExtent,
    label: Vec<String>,
    detail: Vec<String>,
}

/// Output of a render together with its layout diagnostics.
#[derive(Debug, Clone)]
pub struct RenderedDocument<T> {
    pub output: T,
    pub page_count: u32,
    pub overflows: Vec<LayoutOverflow>,
}

/// Lays out a signed invoice onto a [`Canvas`].
///
/// # Examples
/// ```rust,no_run
/// # async fn demo(invoice: sealbill_core::invoice::SignedInvoice) -> Result<(), Box<dyn std::error::Error>> {
/// use sealbill_core::render::{Catalog, InvoicePdf, LayoutMetrics, PdfCanvas, WordWrap};
///
/// let metrics = LayoutMetrics::default();
/// let catalog = Catalog::default();
/// let canvas = PdfCanvas::new(invoice.data().reference(), &metrics)?;
/// let rendered = InvoicePdf::new(&invoice, &catalog, &WordWrap, &metrics)
///     .generate(canvas)
///     .await?;
/// std::fs::write("invoice.pdf", rendered.output)?;
/// # Ok(())
/// # }
/// ```
pub struct InvoicePdf<'a, T: ?Sized, W: ?Sized> {
    invoice: &'a SignedInvoice,
    translator: &'a T,
    wrapper: &'a W,
    metrics: &'a LayoutMetrics,
    locale: Option<&'a Locale>,
}

impl<'a, T, W> InvoicePdf<'a, T, W>
where
    T: Translator + ?Sized,
    W: TextWrapper + ?Sized,
{
    pub fn new(
        invoice: &'a SignedInvoice,
        translator: &'a T,
        wrapper: &'a W,
        metrics: &'a LayoutMetrics,
    ) -> Self {
        Self {
            invoice,
            translator,
            wrapper,
            metrics,
            locale: None,
        }
    }

    /// Render captions in `locale` instead of the invoice's own language.
    pub fn with_locale(mut self, locale: &'a Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Load the logo, encode the verification code, then draw every page.
    pub async fn generate<C: Canvas>(
        &self,
        mut canvas: C,
    ) -> Result<RenderedDocument<C::Output>, RenderError> {
        let logo = match self.data().logo_path() {
            Some(path) => Some(tokio::fs::read(path).await.map_err(|source| {
                RenderError::Logo {
                    path: path.to_path_buf(),
                    source,
                }
            })?),
            None => None,
        };

        let token = self.invoice.token().to_string();
        let code = tokio::task::spawn_blocking(move || VerificationCode::encode(&token))
            .await
            .map_err(|e| RenderError::Join(e.to_string()))??;

        let rows: Vec<WrappedRow> = self
            .data()
            .line_items()
            .iter()
            .map(|item| self.wrap_item(item))
            .collect();
        let extents: Vec<RowExtent> = rows.iter().map(|row| row.extent).collect();
        let plan = plan_table(&extents, self.metrics);

        tracing::debug!(
            reference = %self.data().reference(),
            rows = extents.len(),
            pages = plan.page_count,
            "laid out invoice table"
        );

        self.draw_header(&mut canvas, logo.as_deref(), &code)?;
        self.draw_customer(&mut canvas);
        self.draw_footer(&mut canvas, 1);
        self.draw_column_header(&mut canvas, self.metrics.first_table_top);
        self.draw_rows(&mut canvas, &plan, &rows);
        self.draw_totals(&mut canvas, &plan);

        let overflows = plan.overflows().cloned().collect();
        Ok(RenderedDocument {
            output: canvas.finish()?,
            page_count: plan.page_count,
            overflows,
        })
    }

    fn data(&self) -> &InvoiceData {
        self.invoice.data()
    }

    fn locale(&self) -> &Locale {
        self.locale.unwrap_or_else(|| self.data().locale())
    }

    fn t(&self, key: &str) -> String {
        self.translator.translate(key, self.locale())
    }

    fn format_date(&self, date: &DateTime<Utc>) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.t("dateFormat"))).is_err() {
            out.clear();
            let _ = write!(out, "{}", date.format(FALLBACK_DATE_FORMAT));
        }
        out
    }

    fn money(&self, amount: f64) -> String {
        format_currency(amount, self.data().currency())
    }

    fn wrap_item(&self, item: &LineItem) -> WrappedRow {
        let label = self
            .wrapper
            .wrap(item.label(), self.metrics.label_wrap_width);
        let detail = item
            .detail()
            .map(|detail| self.wrapper.wrap(detail, self.metrics.detail_wrap_width))
            .unwrap_or_default();
        WrappedRow {
            extent: RowExtent::new(label.len(), detail.len()),
            label,
            detail,
        }
    }

    /// One text call per wrapped line, stepped by the layout line height.
    fn draw_lines<C: Canvas>(&self, canvas: &mut C, lines: &[String], x: f64, top: f64) {
        for (index, line) in lines.iter().enumerate() {
            let y = top + index as f64 * self.metrics.line_height;
            canvas.text(line, x, y, TextOptions::default());
        }
    }

    fn rule<C: Canvas>(&self, canvas: &mut C, y: f64) {
        canvas.stroke(
            Point::new(MARGIN_X, y),
            Point::new(RULE_END_X, y),
            Rgb::RULE,
            RULE_WIDTH,
        );
    }

    fn draw_header<C: Canvas>(
        &self,
        canvas: &mut C,
        logo: Option<&[u8]>,
        code: &VerificationCode,
    ) -> Result<(), RenderError> {
        let seller = self.data().seller();
        let x = match logo {
            Some(bytes) => {
                canvas.image(bytes, LOGO_X, LOGO_Y, LOGO_WIDTH)?;
                100.0
            }
            None => MARGIN_X,
        };

        canvas.set_fill_color(Rgb::INK);
        canvas.set_font(FontStyle::Regular, TITLE_SIZE);
        canvas.text(seller.name(), x, 57.0, TextOptions::default());
        canvas.set_font(FontStyle::Regular, BODY_SIZE);
        if let Some(address) = seller.address() {
            canvas.text(address.street(), x, 80.0, TextOptions::default());
            canvas.text(&address.locality_line(), x, 95.0, TextOptions::default());
        }
        if let Some(contact) = seller.contact() {
            canvas.text(contact, x, 110.0, TextOptions::default());
        }

        canvas.image(code.png(), QR_X, QR_Y, QR_WIDTH)?;
        canvas.set_font(FontStyle::Bold, CAPTION_SIZE);
        canvas.text(
            &self.t("signedInvoice"),
            QR_X,
            QR_CAPTION_Y,
            TextOptions::boxed(QR_WIDTH, Align::Center),
        );
        Ok(())
    }

    fn draw_customer<C: Canvas>(&self, canvas: &mut C) {
        let data = self.data();
        let client = data.client();
        let left = TextOptions::default();

        canvas.set_fill_color(Rgb::INK);
        canvas.set_font(FontStyle::Regular, TITLE_SIZE);
        canvas.text(
            &self.t("invoice").to_uppercase(),
            MARGIN_X,
            CUSTOMER_TITLE_Y,
            left,
        );
        self.rule(canvas, CUSTOMER_RULE_Y);

        canvas.set_font(FontStyle::Regular, BODY_SIZE);
        canvas.text(&format!("{}:", self.t("reference")), MARGIN_X, CUSTOMER_TOP, left);
        canvas.set_font(FontStyle::Bold, BODY_SIZE);
        canvas.text(data.reference(), CUSTOMER_VALUE_X, CUSTOMER_TOP, left);
        canvas.set_font(FontStyle::Regular, BODY_SIZE);
        canvas.text(&format!("{}:", self.t("dueDate")), MARGIN_X, CUSTOMER_TOP + 15.0, left);
        canvas.text(
            &self.format_date(data.due_date()),
            CUSTOMER_VALUE_X,
            CUSTOMER_TOP + 15.0,
            left,
        );
        canvas.text(&format!("{}:", self.t("amountDue")), MARGIN_X, CUSTOMER_TOP + 30.0, left);
        canvas.text(
            &self.money(self.invoice.totals().amount_due()),
            CUSTOMER_VALUE_X,
            CUSTOMER_TOP + 30.0,
            left,
        );

        canvas.set_font(FontStyle::Bold, BODY_SIZE);
        canvas.text(client.name(), CLIENT_X, CUSTOMER_TOP, left);
        canvas.set_font(FontStyle::Regular, BODY_SIZE);
        if let Some(address) = client.address() {
            canvas.text(address.street(), CLIENT_X, CUSTOMER_TOP + 15.0, left);
            canvas.text(&address.locality_line(), CLIENT_X, CUSTOMER_TOP + 30.0, left);
        }

        self.rule(canvas, CUSTOMER_BOTTOM_RULE_Y);
    }

    fn draw_footer<C: Canvas>(&self, canvas: &mut C, page: u32) {
        let seller = self.data().seller();
        let mut line = format!(
            "{} - {}",
            seller.name(),
            seller.identifier().unwrap_or_default()
        );
        if let Some(vat) = seller.vat_number() {
            line.push_str(" - ");
            line.push_str(vat.as_str());
        }

        let y = self.metrics.footer_y;
        canvas.set_fill_color(Rgb::INK);
        canvas.set_font(FontStyle::Bold, BODY_SIZE);
        canvas.text(&line, MARGIN_X, y, TextOptions::default());
        canvas.text(
            &format!("{} {page}", self.t("page")),
            PAGE_NUMBER_X,
            y,
            TextOptions::default(),
        );
        canvas.set_font(FontStyle::Regular, BODY_SIZE);
    }

    /// Empty cells are skipped.
    fn draw_columns<C: Canvas>(&self, canvas: &mut C, y: f64, cells: [&str; 5]) {
        let [label, detail, unit_price, quantity, total] = cells;
        let columns = [
            (label, MARGIN_X, TextOptions::default()),
            (detail, DETAIL_X, TextOptions::default()),
            (
                unit_price,
                UNIT_PRICE_X,
                TextOptions::boxed(NUMBER_COLUMN_WIDTH, Align::Right),
            ),
            (
                quantity,
                QUANTITY_X,
                TextOptions::boxed(NUMBER_COLUMN_WIDTH, Align::Right),
            ),
            (
                total,
                TOTAL_X,
                TextOptions::boxed(TOTAL_COLUMN_WIDTH, Align::Right),
            ),
        ];
        for (text, x, options) in columns {
            if !text.is_empty() {
                canvas.text(text, x, y, options);
            }
        }
    }

    fn draw_column_header<C: Canvas>(&self, canvas: &mut C, top: f64) {
        canvas.set_font(FontStyle::Bold, BODY_SIZE);
        self.draw_columns(
            canvas,
            top,
            [
                &self.t("item"),
                &self.t("description"),
                &self.t("unitPrice"),
                &self.t("quantity"),
                &self.t("total"),
            ],
        );
        self.rule(canvas, top + self.metrics.header_row_height);
        canvas.set_font(FontStyle::Regular, BODY_SIZE);
    }

    fn start_page<C: Canvas>(&self, canvas: &mut C, page: u32) {
        canvas.add_page();
        self.draw_footer(canvas, page);
    }

    fn draw_rows<C: Canvas>(
        &self,
        canvas: &mut C,
        plan: &TablePlan,
        rows: &[WrappedRow],
    ) {
        let items = self.data().line_items();
        for ((placement, row), item) in plan.rows.iter().zip(rows).zip(items) {
            if placement.page_break {
                self.start_page(canvas, placement.page);
                self.draw_column_header(canvas, self.metrics.continuation_table_top);
            }
            self.draw_row(canvas, placement, row, item);
        }
    }

    fn draw_row<C: Canvas>(
        &self,
        canvas: &mut C,
        placement: &RowPlacement,
        row: &WrappedRow,
        item: &LineItem,
    ) {
        canvas.set_font(FontStyle::Regular, BODY_SIZE);
        self.draw_lines(canvas, &row.label, MARGIN_X, placement.text_y);
        self.draw_lines(canvas, &row.detail, DETAIL_X, placement.text_y);
        self.draw_columns(
            canvas,
            placement.text_y,
            [
                "",
                "",
                &self.money(item.unit_price()),
                &item.quantity().to_string(),
                &self.money(item.subtotal()),
            ],
        );
        self.rule(canvas, placement.separator_y);
    }

    fn draw_totals<C: Canvas>(&self, canvas: &mut C, plan: &TablePlan) {
        let totals = self.invoice.totals();
        let placement = plan.totals;
        if placement.page_break {
            self.start_page(canvas, placement.page);
        }
        let top = placement.top;

        canvas.set_font(FontStyle::Regular, BODY_SIZE);
        self.draw_columns(
            canvas,
            top + 15.0,
            [
                "",
                "",
                &self.t("subtotalWithoutTax"),
                "",
                &self.money(totals.subtotal_without_tax()),
            ],
        );
        self.draw_columns(
            canvas,
            top + 35.0,
            ["", "", &self.t("tax"), "", &self.money(totals.tax_amount())],
        );
        canvas.set_font(FontStyle::Bold, BODY_SIZE);
        self.draw_columns(
            canvas,
            top + 65.0,
            [
                "",
                "",
                &self.t("amountDue"),
                "",
                &self.money(totals.amount_due()),
            ],
        );

        canvas.set_font(FontStyle::Regular, BODY_SIZE);
        canvas.text(
            &self.status_line(),
            MARGIN_X,
            top + 15.0,
            TextOptions::default(),
        );
        if let Some(terms) = self.data().terms() {
            canvas.text(
                terms,
                MARGIN_X,
                self.metrics.printable_bottom,
                TextOptions::default(),
            );
        }
    }

    fn status_line(&self) -> String {
        let date = self.format_date(self.data().issue_date());
        match self.data().payment() {
            PaymentStatus::Unpaid => format!("{date}: {}", self.t("waitingForPayment")),
            PaymentStatus::Paid(method) => format!("{date}: {} ({method})", self.t("paid")),
        }
    }
}
