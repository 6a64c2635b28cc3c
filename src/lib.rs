pub mod api;
pub mod core;
pub mod metrics;
pub mod models;
pub mod pdf;
pub mod storage;

// Re-export commonly used types
pub use crate::core::{
    InvoiceMeta, PdfConfig, RenderError, RequestError,
};
pub use models::{
    ImageRef, InvoiceForm, InvoiceRequest, LineItem,
    PaymentChannel, PaymentChannelKind, PaymentConfig,
};
pub use pdf::{InvoiceRenderer, RenderedInvoice};
pub use storage::{Upload, UploadStaging};
