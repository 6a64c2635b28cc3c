use chrono::NaiveDate;
use invoice_renderer::{
    ImageRef, InvoiceForm, InvoiceMeta, InvoiceRenderer, InvoiceRequest, PaymentConfig, PdfConfig,
};
use std::path::PathBuf;
use uuid::Uuid;

struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("invoice-render-{}", Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).unwrap();
        Scratch { dir }
    }

    fn png(&self, name: &str, width: u32, height: u32) -> ImageRef {
        let path = self.dir.join(name);
        image::RgbImage::from_pixel(width, height, image::Rgb([180, 120, 60]))
            .save(&path)
            .unwrap();
        ImageRef::new(path, name)
    }

    fn translucent_png(&self, name: &str) -> ImageRef {
        let path = self.dir.join(name);
        image::RgbaImage::from_pixel(20, 20, image::Rgba([10, 20, 30, 128]))
            .save(&path)
            .unwrap();
        ImageRef::new(path, name)
    }

    fn garbage(&self, name: &str) -> ImageRef {
        let path = self.dir.join(name);
        std::fs::write(&path, b"definitely not an image").unwrap();
        ImageRef::new(path, name)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn renderer() -> InvoiceRenderer {
    InvoiceRenderer::new(PdfConfig::builder().compress(false).build(), PaymentConfig::default())
}

fn meta() -> InvoiceMeta {
    InvoiceMeta::new("INV-20240501-0000BEEF", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle.as_bytes())
}

fn count(haystack: &[u8], needle: &str) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle.as_bytes()).count()
}

#[test]
fn flooring_example_renders_row_and_total() {
    let form = InvoiceForm {
        company_name: Some("Acme Floors".to_string()),
        line_items: Some(
            r#"[{"description":"Flooring install","quantity":"10","price":"25.50"}]"#.to_string(),
        ),
        ..Default::default()
    };
    let request = InvoiceRequest::from_form(form, Vec::new()).unwrap();
    let rendered = renderer().render_with(&request, meta()).unwrap();

    assert_eq!(rendered.total, 255.0);
    assert_eq!(rendered.formatted_total(), "$255.00");
    for cell in ["(Flooring install) Tj", "(10) Tj", "($25.50) Tj", "($255.00) Tj"] {
        assert!(contains(&rendered.bytes, cell), "missing {}", cell);
    }
    assert!(contains(&rendered.bytes, "(Total Amount: $255.00) Tj"));
    assert!(contains(&rendered.bytes, "(Acme Floors) Tj"));
    assert!(contains(&rendered.bytes, "(Thank you for your business!) Tj"));
    assert_eq!(rendered.page_count, 1);
    assert_eq!(rendered.gallery_rows, 0);
}

#[test]
fn total_is_sum_of_subtotals() {
    let form = InvoiceForm {
        line_items: Some(
            r#"[{"description":"Oak","quantity":"3","price":"19.99"},
                {"description":"Underlay","quantity":2.5,"price":"4.10"},
                {"description":"Labor","quantity":"abc","price":"100"}]"#
                .to_string(),
        ),
        ..Default::default()
    };
    let request = InvoiceRequest::from_form(form, Vec::new()).unwrap();
    let rendered = renderer().render_with(&request, meta()).unwrap();

    let expected = 3.0 * 19.99 + 2.5 * 4.10;
    assert!((rendered.total - expected).abs() < 1e-9);
    assert!(contains(&rendered.bytes, &format!("(Total Amount: ${:.2}) Tj", expected)));
    assert!(contains(&rendered.bytes, "($0.00) Tj"));
}

#[test]
fn payment_panel_that_would_overflow_moves_to_a_new_page() {
    // 25 rows fill the first page and 27 the second, leaving the cursor
    // just short of room for the totals block.
    let request = InvoiceRequest {
        line_items: (0..52)
            .map(|i| invoice_renderer::LineItem::new(format!("Board {}", i), 1.0, 1.0))
            .collect(),
        ..Default::default()
    };
    let rendered = renderer().render_with(&request, meta()).unwrap();

    assert_eq!(rendered.page_count, 3);
    assert!(contains(&rendered.bytes, "(Total Amount: $52.00) Tj"));
    assert!(contains(&rendered.bytes, "(PAYMENT OPTIONS) Tj"));
}

#[test]
fn three_images_make_one_gallery_page() {
    let scratch = Scratch::new();
    let request = InvoiceRequest {
        attachments: vec![
            scratch.png("a.png", 64, 48),
            scratch.png("b.png", 48, 64),
            scratch.png("c.png", 32, 32),
        ],
        ..Default::default()
    };
    let rendered = renderer().render_with(&request, meta()).unwrap();

    assert_eq!(rendered.page_count, 2);
    assert_eq!(rendered.gallery_rows, 2);
    assert!(rendered.skipped_images.is_empty());
    assert!(contains(&rendered.bytes, "(WORK DOCUMENTATION) Tj"));
    assert_eq!(count(&rendered.bytes, "/Subtype /Image"), 3);
}

#[test]
fn ten_images_spill_onto_a_second_gallery_page() {
    let scratch = Scratch::new();
    let attachments = (0..10)
        .map(|i| scratch.png(&format!("{}.png", i), 30, 20))
        .collect();
    let request = InvoiceRequest {
        attachments,
        ..Default::default()
    };
    let rendered = renderer().render_with(&request, meta()).unwrap();

    assert_eq!(rendered.gallery_rows, 5);
    assert_eq!(rendered.page_count, 3);
}

#[test]
fn broken_images_are_skipped() {
    let scratch = Scratch::new();
    let missing = ImageRef::new(scratch.dir.join("gone.png"), "gone.png");
    let request = InvoiceRequest {
        attachments: vec![
            scratch.png("ok.png", 40, 40),
            scratch.garbage("broken.png"),
            missing,
            scratch.png("also-ok.png", 40, 40),
        ],
        ..Default::default()
    };
    let rendered = renderer().render_with(&request, meta()).unwrap();

    assert_eq!(rendered.skipped_images, vec!["broken.png", "gone.png"]);
    assert_eq!(rendered.gallery_rows, 2);
    assert_eq!(count(&rendered.bytes, "/Subtype /Image"), 2);
}

#[test]
fn transparency_becomes_a_soft_mask() {
    let scratch = Scratch::new();
    let request = InvoiceRequest {
        attachments: vec![scratch.translucent_png("glass.png")],
        ..Default::default()
    };
    let rendered = renderer().render_with(&request, meta()).unwrap();
    assert!(contains(&rendered.bytes, "/SMask"));
}

#[test]
fn attachments_are_left_in_place() {
    let scratch = Scratch::new();
    let image = scratch.png("keep.png", 10, 10);
    let request = InvoiceRequest {
        attachments: vec![image.clone()],
        ..Default::default()
    };
    renderer().render(&request).unwrap();
    assert!(image.path.exists());
}

#[test]
fn concurrent_renders_get_distinct_numbers() {
    let renderer = std::sync::Arc::new(renderer());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let renderer = renderer.clone();
            std::thread::spawn(move || renderer.render(&InvoiceRequest::default()).unwrap())
        })
        .collect();

    let mut numbers: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().invoice_number)
        .collect();
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 8);
}
