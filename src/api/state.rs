use std::path::PathBuf;
use std::sync::Arc;

use crate::core::PdfConfig;
use crate::models::PaymentConfig;
use crate::pdf::InvoiceRenderer;
use crate::storage::UploadStaging;

#[derive(Clone)]
pub struct ApiState {
    pub renderer: Arc<InvoiceRenderer>,
    pub staging: UploadStaging,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upload_dir: PathBuf,
    pub compress_pdf: bool,
    pub payments: PaymentConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            upload_dir: std::env::temp_dir().join("invoice-uploads"),
            compress_pdf: true,
            payments: PaymentConfig::default(),
        }
    }
}

impl ApiState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let staging = UploadStaging::new(config.upload_dir.clone());
        staging.ensure_dir().await?;

        let pdf_config = PdfConfig::builder().compress(config.compress_pdf).build();
        let renderer = Arc::new(InvoiceRenderer::new(pdf_config, config.payments));

        Ok(ApiState { renderer, staging })
    }
}
