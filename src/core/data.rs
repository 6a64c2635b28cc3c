use chrono::NaiveDate;
use uuid::Uuid;

/// RGB color with 0-255 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BRAND: Rgb = Rgb(0x2E, 0x50, 0x90);
    pub const INK: Rgb = Rgb(0x33, 0x33, 0x33);
    pub const MUTED: Rgb = Rgb(0x66, 0x66, 0x66);
    pub const SHADE: Rgb = Rgb(0xF8, 0xF8, 0xF8);
    pub const BORDER: Rgb = Rgb(0xCC, 0xCC, 0xCC);
    pub const LINK: Rgb = Rgb(0x00, 0x00, 0xFF);
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);

    pub fn components(&self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAlign {
    Left,
    Center,
    Right,
}

/// Currency amount rendered with a fixed symbol and two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Money {
    pub amount: f64,
}

impl Money {
    pub fn new(amount: f64) -> Self {
        Money { amount }
    }

    pub fn format(&self) -> String {
        format!("${:.2}", self.amount)
    }
}

/// Number and issue date printed in the invoice header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceMeta {
    pub number: String,
    pub issued: NaiveDate,
}

impl InvoiceMeta {
    pub fn new(number: impl Into<String>, issued: NaiveDate) -> Self {
        InvoiceMeta {
            number: number.into(),
            issued,
        }
    }

    /// Fresh number for today, unique across concurrent renders.
    pub fn generate() -> Self {
        let issued = chrono::Local::now().date_naive();
        let token = Uuid::new_v4().simple().to_string();
        InvoiceMeta {
            number: format!("INV-{}-{}", issued.format("%Y%m%d"), token[..8].to_uppercase()),
            issued,
        }
    }

    pub fn display_date(&self) -> String {
        self.issued.format("%-m/%-d/%Y").to_string()
    }
}
