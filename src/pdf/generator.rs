use tracing::{debug, info, warn};

use super::builder::{PageStream, TextStyle};
use super::layout::{GalleryGeometry, RenderCursor, LINE_SPACING};
use crate::core::{ColumnAlign, InvoiceMeta, Money, PdfConfig, RenderResult, Rgb};
use crate::metrics;
use crate::models::{InvoiceRequest, PaymentConfig};

const TABLE_HEADERS: [&str; 4] = ["Description", "Quantity", "Price", "Total"];
const ROW_HEIGHT: f32 = 20.0;
const CELL_PADDING: f32 = 5.0;
const PAYMENT_PANEL_HEIGHT: f32 = 100.0;
const TOTALS_FONT_SIZE: f32 = 12.0;
/// Blank lines before the total, between total and title, and below the title.
const TOTAL_LEAD_LINES: f32 = 1.0;
const TOTAL_GAP_LINES: f32 = 2.0;
const TITLE_GAP_LINES: f32 = 1.0;
/// Height of the total line, the "PAYMENT OPTIONS" title and the panel,
/// including the gaps around them.
const TOTALS_BLOCK_HEIGHT: f32 = (TOTAL_LEAD_LINES + 1.0 + TOTAL_GAP_LINES + 1.0 + TITLE_GAP_LINES)
    * TOTALS_FONT_SIZE
    * LINE_SPACING
    + PAYMENT_PANEL_HEIGHT;
const PAYMENT_ROW_SPACING: f32 = 20.0;
const PAYMENT_LABEL_INDENT: f32 = 20.0;
const PAYMENT_VALUE_INDENT: f32 = 120.0;
/// Footer sits this far below the printable bottom, inside the margin.
const FOOTER_DROP: f32 = 10.0;
const FOOTER_TEXT: &str = "Thank you for your business!";

/// Output of one render call.
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    pub bytes: Vec<u8>,
    pub invoice_number: String,
    pub total: f64,
    pub page_count: usize,
    pub gallery_rows: usize,
    /// Original names of attachments that could not be placed.
    pub skipped_images: Vec<String>,
}

impl RenderedInvoice {
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn formatted_total(&self) -> String {
        Money::new(self.total).format()
    }
}

/// Lays out invoices. Holds only configuration, so one instance can serve
/// any number of concurrent renders.
#[derive(Debug, Clone)]
pub struct InvoiceRenderer {
    config: PdfConfig,
    payments: PaymentConfig,
    gallery: GalleryGeometry,
}

impl InvoiceRenderer {
    pub fn new(config: PdfConfig, payments: PaymentConfig) -> Self {
        InvoiceRenderer {
            config,
            payments,
            gallery: GalleryGeometry::default(),
        }
    }

    pub fn with_gallery(mut self, gallery: GalleryGeometry) -> Self {
        self.gallery = gallery;
        self
    }

    pub fn render(&self, request: &InvoiceRequest) -> RenderResult<RenderedInvoice> {
        self.render_with(request, InvoiceMeta::generate())
    }

    /// Renders with a caller-chosen invoice number and date.
    pub fn render_with(
        &self,
        request: &InvoiceRequest,
        meta: InvoiceMeta,
    ) -> RenderResult<RenderedInvoice> {
        let mut stream = PageStream::new(self.config.clone());
        let mut cursor = RenderCursor::new(&self.config);

        self.render_header(&mut stream, &mut cursor, request, &meta);
        self.render_bill_to(&mut stream, &mut cursor, request);
        let total = self.render_table(&mut stream, &mut cursor, request);
        self.render_total_and_payments(&mut stream, &mut cursor, total);
        let (gallery_rows, skipped_images) = self.render_gallery(&mut stream, &mut cursor, request);
        self.render_footer(&mut stream, &cursor);

        let page_count = stream.page_count();
        let bytes = stream.finish()?;

        info!(
            invoice_number = %meta.number,
            pages = page_count,
            items = request.line_items.len(),
            images = request.attachments.len(),
            skipped = skipped_images.len(),
            "Rendered invoice"
        );

        Ok(RenderedInvoice {
            bytes,
            invoice_number: meta.number,
            total,
            page_count,
            gallery_rows,
            skipped_images,
        })
    }

    fn left(&self) -> f32 {
        self.config.margin.left
    }

    fn content_width(&self) -> f32 {
        self.config.content_width()
    }

    fn line(
        &self,
        stream: &mut PageStream,
        cursor: &mut RenderCursor,
        text: &str,
        align: ColumnAlign,
        style: TextStyle,
    ) {
        stream.text_in(text, self.left(), cursor.y(), self.content_width(), align, &style);
        cursor.advance(style.size * LINE_SPACING);
    }

    fn render_header(
        &self,
        stream: &mut PageStream,
        cursor: &mut RenderCursor,
        request: &InvoiceRequest,
        meta: &InvoiceMeta,
    ) {
        let company = TextStyle::new(28.0, Rgb::BRAND);
        let name = company
            .face
            .truncate_to_width(&request.company_name, company.size, self.content_width());
        self.line(stream, cursor, &name, ColumnAlign::Center, company);

        let details = TextStyle::new(10.0, Rgb::MUTED);
        self.line(stream, cursor, &format!("License: {}", request.license), ColumnAlign::Center, details);
        self.line(stream, cursor, &format!("Insurance: {}", request.insurance), ColumnAlign::Center, details);
        cursor.move_down(2.0, details.size);

        self.line(stream, cursor, "INVOICE", ColumnAlign::Right, TextStyle::new(20.0, Rgb::BRAND).bold());

        let info = TextStyle::new(10.0, Rgb::INK);
        self.line(stream, cursor, &format!("Invoice #: {}", meta.number), ColumnAlign::Right, info);
        self.line(stream, cursor, &format!("Date: {}", meta.display_date()), ColumnAlign::Right, info);
        cursor.move_down(2.0, info.size);
    }

    fn render_bill_to(&self, stream: &mut PageStream, cursor: &mut RenderCursor, request: &InvoiceRequest) {
        self.line(stream, cursor, "BILL TO:", ColumnAlign::Left, TextStyle::new(12.0, Rgb::BRAND).bold());

        let body = TextStyle::new(10.0, Rgb::INK);
        self.line(stream, cursor, &request.client_name, ColumnAlign::Left, body);
        self.line(stream, cursor, &request.client_email, ColumnAlign::Left, body);
        cursor.move_down(2.0, body.size);
    }

    fn column_width(&self) -> f32 {
        self.content_width() / TABLE_HEADERS.len() as f32
    }

    fn render_table_header(&self, stream: &mut PageStream, cursor: &mut RenderCursor) {
        let column_width = self.column_width();
        let style = TextStyle::new(10.0, Rgb::WHITE).bold();

        stream.fill_rect(self.left(), cursor.y(), self.content_width(), ROW_HEIGHT, Rgb::BRAND);
        for (i, header) in TABLE_HEADERS.iter().enumerate() {
            let x = self.left() + i as f32 * column_width;
            stream.text_in(header, x, cursor.y() + CELL_PADDING, column_width, ColumnAlign::Center, &style);
        }
        cursor.advance(ROW_HEIGHT);
    }

    /// Draws the item table, breaking onto new pages as needed, and returns
    /// the sum of the drawn subtotals.
    fn render_table(&self, stream: &mut PageStream, cursor: &mut RenderCursor, request: &InvoiceRequest) -> f64 {
        if !cursor.fits(2.0 * ROW_HEIGHT) {
            stream.new_page(cursor);
        }
        self.render_table_header(stream, cursor);

        let column_width = self.column_width();
        let style = TextStyle::new(10.0, Rgb::INK);
        let mut total = 0.0;

        for (index, item) in request.line_items.iter().enumerate() {
            if !cursor.fits(ROW_HEIGHT) {
                debug!(row = index, "Table continues on a new page");
                stream.new_page(cursor);
                self.render_table_header(stream, cursor);
            }

            let subtotal = item.subtotal();
            total += subtotal;

            if index % 2 == 0 {
                stream.fill_rect(self.left(), cursor.y(), self.content_width(), ROW_HEIGHT, Rgb::SHADE);
            }

            let text_y = cursor.y() + CELL_PADDING;
            let description = style.face.truncate_to_width(
                &item.description,
                style.size,
                column_width - 2.0 * CELL_PADDING,
            );
            let cells = [
                (description, ColumnAlign::Left),
                (item.quantity.to_string(), ColumnAlign::Center),
                (Money::new(item.unit_price).format(), ColumnAlign::Center),
                (Money::new(subtotal).format(), ColumnAlign::Center),
            ];
            for (i, (text, align)) in cells.iter().enumerate() {
                let x = self.left() + i as f32 * column_width;
                let (x, width) = match align {
                    ColumnAlign::Left => (x + CELL_PADDING, column_width - CELL_PADDING),
                    _ => (x, column_width),
                };
                stream.text_in(text, x, text_y, width, *align, &style);
            }

            cursor.advance(ROW_HEIGHT);
        }

        total
    }

    fn render_total_and_payments(&self, stream: &mut PageStream, cursor: &mut RenderCursor, total: f64) {
        let style = TextStyle::new(TOTALS_FONT_SIZE, Rgb::BRAND).bold();

        if !cursor.fits(TOTALS_BLOCK_HEIGHT) {
            debug!("Totals and payment panel moved to a new page");
            stream.new_page(cursor);
        }

        cursor.move_down(TOTAL_LEAD_LINES, style.size);
        let total_line = format!("Total Amount: {}", Money::new(total).format());
        self.line(stream, cursor, &total_line, ColumnAlign::Right, style);
        cursor.move_down(TOTAL_GAP_LINES, style.size);

        self.line(stream, cursor, "PAYMENT OPTIONS", ColumnAlign::Left, style);
        cursor.move_down(TITLE_GAP_LINES, style.size);

        let panel_top = cursor.y();
        stream.fill_and_stroke_rect(
            self.left(),
            panel_top,
            self.content_width(),
            PAYMENT_PANEL_HEIGHT,
            Rgb::SHADE,
            Rgb::BORDER,
        );

        let label_style = TextStyle::new(10.0, Rgb::INK);
        let link_style = TextStyle::new(10.0, Rgb::LINK);
        for (i, channel) in self.payments.channels().iter().enumerate() {
            let y = panel_top + 10.0 + i as f32 * PAYMENT_ROW_SPACING;
            let value_x = self.left() + PAYMENT_VALUE_INDENT;
            let value_width = self.content_width() - PAYMENT_VALUE_INDENT - PAYMENT_LABEL_INDENT;

            stream.text(channel.kind.label(), self.left() + PAYMENT_LABEL_INDENT, y, &label_style);

            match channel.link() {
                Some(uri) => {
                    let text = link_style
                        .face
                        .truncate_to_width(channel.display_text(), link_style.size, value_width);
                    let width = stream.text_width(&text, &link_style);
                    stream.text(&text, value_x, y, &link_style);
                    stream.fill_rect(value_x, y + link_style.size * 0.9, width, 0.5, Rgb::LINK);
                    stream.link(value_x, y, width, link_style.size * LINE_SPACING, &uri);
                }
                None => {
                    let text = label_style
                        .face
                        .truncate_to_width(channel.display_text(), label_style.size, value_width);
                    stream.text(&text, value_x, y, &label_style);
                }
            }
        }
        cursor.advance(PAYMENT_PANEL_HEIGHT);
    }

    /// Returns the number of grid rows and the names of skipped images.
    fn render_gallery(
        &self,
        stream: &mut PageStream,
        cursor: &mut RenderCursor,
        request: &InvoiceRequest,
    ) -> (usize, Vec<String>) {
        if request.attachments.is_empty() {
            return (0, Vec::new());
        }

        stream.new_page(cursor);
        let title = TextStyle::new(16.0, Rgb::BRAND).bold();
        self.line(stream, cursor, "WORK DOCUMENTATION", ColumnAlign::Center, title);
        cursor.move_down(1.0, title.size);

        let plan = self.gallery.plan(
            request.attachments.len(),
            self.left(),
            cursor.y(),
            cursor.top(),
            cursor.bottom(),
        );

        let first_page = cursor.page();
        let mut skipped = Vec::new();
        for placement in &plan.placements {
            while cursor.page() < first_page + placement.page_offset {
                stream.new_page(cursor);
            }

            let image = &request.attachments[placement.index];
            if let Err(e) = stream.place_image(
                image,
                placement.x,
                placement.y,
                self.gallery.cell_width,
                self.gallery.cell_height,
            ) {
                warn!(image = %image.original_name, error = %e, "Skipping image");
                metrics::IMAGES_SKIPPED.inc();
                skipped.push(image.original_name.clone());
            }
        }

        cursor.advance(plan.end_y - cursor.y());
        (plan.rows, skipped)
    }

    fn render_footer(&self, stream: &mut PageStream, cursor: &RenderCursor) {
        let style = TextStyle::new(10.0, Rgb::MUTED);
        let y = cursor.bottom() + FOOTER_DROP;
        stream.text_in(FOOTER_TEXT, self.left(), y, self.content_width(), ColumnAlign::Center, &style);
    }
}
