use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

pub static INVOICES_RENDERED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("invoices_rendered_total", "Invoices rendered successfully")
        .expect("Failed to register invoices_rendered_total")
});

pub static RENDER_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("invoice_render_failures_total", "Invoice requests that failed to render")
        .expect("Failed to register invoice_render_failures_total")
});

pub static IMAGES_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("invoice_images_skipped_total", "Attachments skipped during rendering")
        .expect("Failed to register invoice_images_skipped_total")
});

/// Registers every counter so `/metrics` lists them before first use.
pub fn init() {
    Lazy::force(&INVOICES_RENDERED);
    Lazy::force(&RENDER_FAILURES);
    Lazy::force(&IMAGES_SKIPPED);
}
