use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::core::{RenderError, RequestResult};
use crate::metrics;
use crate::models::{InvoiceForm, InvoiceRequest};
use crate::storage::{staging, Upload};
use super::state::ApiState;
use super::error::ApiResult;

/// Body accepted by the invoice endpoint: the form fields plus images.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSubmission {
    #[serde(flatten)]
    pub form: InvoiceForm,
    #[serde(default)]
    pub work_images: Vec<ImagePayload>,
}

#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    pub filename: String,
    /// Base64, optionally as a `data:` URL.
    pub data: String,
}

impl InvoiceSubmission {
    /// Decodes and validates the images and parses the form, without
    /// touching the filesystem.
    fn into_parts(self) -> RequestResult<(InvoiceRequest, Vec<Upload>)> {
        let uploads = self
            .work_images
            .iter()
            .map(|image| Upload::from_base64(image.filename.clone(), &image.data))
            .collect::<RequestResult<Vec<_>>>()?;
        staging::validate_all(&uploads)?;

        let request = InvoiceRequest::from_form(self.form, Vec::new())?;
        Ok((request, uploads))
    }
}

/// Render an invoice and return the PDF
pub async fn generate_invoice(
    submission: web::Json<InvoiceSubmission>,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let start = std::time::Instant::now();

    let (mut request, uploads) = submission.into_inner().into_parts()?;
    let staged = state.staging.stage(uploads).await?;
    request.attachments = staged.images().to_vec();

    let renderer = state.renderer.clone();
    let result = tokio::task::spawn_blocking(move || renderer.render(&request))
        .await
        .map_err(|e| RenderError::Aborted(e.to_string()))
        .and_then(|rendered| rendered);

    staged.cleanup().await;

    let rendered = match result {
        Ok(rendered) => rendered,
        Err(e) => {
            metrics::RENDER_FAILURES.inc();
            return Err(e.into());
        }
    };
    metrics::INVOICES_RENDERED.inc();

    tracing::info!(
        invoice_number = %rendered.invoice_number,
        bytes = rendered.bytes.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Invoice generated"
    );

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(("X-Invoice-Number", rendered.invoice_number.clone()))
        .body(rendered.into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RequestError;

    fn submission(json: serde_json::Value) -> InvoiceSubmission {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn form_fields_are_camel_case() {
        let (request, uploads) = submission(serde_json::json!({
            "companyName": "Acme Floors",
            "clientEmail": "pat@example.com",
            "lineItems": "[{\"description\":\"Tile\",\"quantity\":\"2\",\"price\":\"3\"}]"
        }))
        .into_parts()
        .unwrap();

        assert_eq!(request.company_name, "Acme Floors");
        assert_eq!(request.client_email, "pat@example.com");
        assert_eq!(request.total(), 6.0);
        assert!(uploads.is_empty());
    }

    #[test]
    fn bad_line_items_fail_before_staging() {
        let err = submission(serde_json::json!({ "lineItems": "not json" }))
            .into_parts()
            .unwrap_err();
        assert!(matches!(err, RequestError::MalformedLineItems(_)));
    }

    #[test]
    fn images_are_decoded_and_checked() {
        let err = submission(serde_json::json!({
            "workImages": [{ "filename": "invoice.pdf", "data": "aGVsbG8=" }]
        }))
        .into_parts()
        .unwrap_err();
        assert!(matches!(err, RequestError::DisallowedFileType { .. }));

        let (_, uploads) = submission(serde_json::json!({
            "workImages": [{ "filename": "floor.png", "data": "aGVsbG8=" }]
        }))
        .into_parts()
        .unwrap();
        assert_eq!(uploads[0].data, b"hello");
    }
}
