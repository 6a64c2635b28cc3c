pub mod builder;
pub mod fonts;
pub mod generator;
pub mod layout;

pub use builder::{PageStream, TextStyle};
pub use generator::{InvoiceRenderer, RenderedInvoice};
pub use layout::{GalleryGeometry, GalleryPlacement, GalleryPlan, RenderCursor};
