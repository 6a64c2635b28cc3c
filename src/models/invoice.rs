use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::core::{RequestError, RequestResult};

pub const MAX_ATTACHMENTS: usize = 10;

pub const DEFAULT_COMPANY_NAME: &str = "Company Name";
pub const DEFAULT_LICENSE: &str = "N/A";
pub const DEFAULT_INSURANCE: &str = "N/A";
pub const DEFAULT_CLIENT_NAME: &str = "Client Name";
pub const DEFAULT_CLIENT_EMAIL: &str = "Client Email";

/// Text fields as submitted by the invoice form. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    pub company_name: Option<String>,
    pub license: Option<String>,
    pub insurance: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    /// JSON-encoded array of `{description, quantity, price}` objects.
    pub line_items: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        LineItem {
            description: description.into(),
            quantity: sanitize_amount(quantity),
            unit_price: sanitize_amount(unit_price),
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// Parses the form's JSON array. Blank input means no items.
    pub fn parse_list(raw: &str) -> RequestResult<Vec<LineItem>> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<RawLineItem> = serde_json::from_str(raw)?;
        Ok(items.into_iter().map(LineItem::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct RawLineItem {
    #[serde(default)]
    description: Value,
    #[serde(default)]
    quantity: Value,
    #[serde(default)]
    price: Value,
}

impl From<RawLineItem> for LineItem {
    fn from(raw: RawLineItem) -> Self {
        let description = match raw.description {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };

        LineItem {
            description,
            quantity: coerce_amount(&raw.quantity),
            unit_price: coerce_amount(&raw.price),
        }
    }
}

/// Numbers pass through and strings contribute their leading number
/// (`"10 sq ft"` is 10); anything else becomes zero.
fn coerce_amount(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    };
    parsed.map(sanitize_amount).unwrap_or(0.0)
}

/// Parses the longest decimal prefix of `s` after leading whitespace:
/// optional sign, digits with at most one point, then an exponent only when
/// digits follow it.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// An image already staged to temporary storage. The renderer only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub path: PathBuf,
    pub original_name: String,
}

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        ImageRef {
            path: path.into(),
            original_name: original_name.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub company_name: String,
    pub license: String,
    pub insurance: String,
    pub client_name: String,
    pub client_email: String,
    pub line_items: Vec<LineItem>,
    pub attachments: Vec<ImageRef>,
}

impl Default for InvoiceRequest {
    fn default() -> Self {
        InvoiceRequest {
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            license: DEFAULT_LICENSE.to_string(),
            insurance: DEFAULT_INSURANCE.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_email: DEFAULT_CLIENT_EMAIL.to_string(),
            line_items: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

impl InvoiceRequest {
    /// Applies field defaults and parses the line items.
    pub fn from_form(form: InvoiceForm, attachments: Vec<ImageRef>) -> RequestResult<Self> {
        if attachments.len() > MAX_ATTACHMENTS {
            return Err(RequestError::TooManyFiles {
                count: attachments.len(),
                limit: MAX_ATTACHMENTS,
            });
        }

        let line_items = match form.line_items.as_deref() {
            Some(raw) => LineItem::parse_list(raw)?,
            None => Vec::new(),
        };

        Ok(InvoiceRequest {
            company_name: or_default(form.company_name, DEFAULT_COMPANY_NAME),
            license: or_default(form.license, DEFAULT_LICENSE),
            insurance: or_default(form.insurance, DEFAULT_INSURANCE),
            client_name: or_default(form.client_name, DEFAULT_CLIENT_NAME),
            client_email: or_default(form.client_email, DEFAULT_CLIENT_EMAIL),
            line_items,
            attachments,
        })
    }

    pub fn total(&self) -> f64 {
        self.line_items.iter().map(LineItem::subtotal).sum()
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}
