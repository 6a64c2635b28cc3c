use serde::{Deserialize, Serialize};

/// The payment panel has room for this many channels.
pub const MAX_PAYMENT_CHANNELS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannelKind {
    PayPal,
    Venmo,
    Zelle,
    CashApp,
}

impl PaymentChannelKind {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentChannelKind::PayPal => "PayPal:",
            PaymentChannelKind::Venmo => "Venmo:",
            PaymentChannelKind::Zelle => "Zelle:",
            PaymentChannelKind::CashApp => "Cash App:",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            PaymentChannelKind::PayPal => "[PayPal link]",
            PaymentChannelKind::Venmo => "[Venmo handle]",
            PaymentChannelKind::Zelle => "[Zelle email]",
            PaymentChannelKind::CashApp => "[Cash App handle]",
        }
    }

    /// How each channel renders out of the box.
    pub fn default_link_mode(&self) -> LinkMode {
        match self {
            PaymentChannelKind::PayPal => LinkMode::Direct,
            PaymentChannelKind::Venmo => LinkMode::Prefixed("https://venmo.com/".to_string()),
            PaymentChannelKind::Zelle => LinkMode::Plain,
            PaymentChannelKind::CashApp => LinkMode::Prefixed("https://cash.app/".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Text only.
    Plain,
    /// The identifier is itself the destination URL.
    Direct,
    /// Destination is the prefix followed by the identifier.
    Prefixed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentChannel {
    pub kind: PaymentChannelKind,
    pub identifier: Option<String>,
    pub link_mode: LinkMode,
}

impl PaymentChannel {
    pub fn new(kind: PaymentChannelKind, identifier: Option<String>) -> Self {
        PaymentChannel {
            kind,
            identifier: identifier.filter(|s| !s.trim().is_empty()),
            link_mode: kind.default_link_mode(),
        }
    }

    pub fn with_link_mode(mut self, link_mode: LinkMode) -> Self {
        self.link_mode = link_mode;
        self
    }

    pub fn display_text(&self) -> &str {
        self.identifier
            .as_deref()
            .unwrap_or_else(|| self.kind.placeholder())
    }

    /// Destination URL, or `None` when the channel renders as plain text.
    /// Placeholders are never linked.
    pub fn link(&self) -> Option<String> {
        let identifier = self.identifier.as_deref()?;
        match &self.link_mode {
            LinkMode::Plain => None,
            LinkMode::Direct => {
                if identifier.starts_with("http://") || identifier.starts_with("https://") {
                    Some(identifier.to_string())
                } else {
                    None
                }
            }
            LinkMode::Prefixed(prefix) => {
                let handle = identifier.trim_start_matches(['@', '$']);
                Some(format!("{}{}", prefix, handle))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfig {
    channels: Vec<PaymentChannel>,
}

impl Default for PaymentConfig {
    /// All four channels showing placeholders.
    fn default() -> Self {
        PaymentConfig::standard(None, None, None, None)
    }
}

impl PaymentConfig {
    /// Keeps the first four channels.
    pub fn new(channels: Vec<PaymentChannel>) -> Self {
        let mut channels = channels;
        channels.truncate(MAX_PAYMENT_CHANNELS);
        PaymentConfig { channels }
    }

    pub fn standard(
        paypal_link: Option<String>,
        venmo_handle: Option<String>,
        zelle_email: Option<String>,
        cashapp_handle: Option<String>,
    ) -> Self {
        PaymentConfig::new(vec![
            PaymentChannel::new(PaymentChannelKind::PayPal, paypal_link),
            PaymentChannel::new(PaymentChannelKind::Venmo, venmo_handle),
            PaymentChannel::new(PaymentChannelKind::Zelle, zelle_email),
            PaymentChannel::new(PaymentChannelKind::CashApp, cashapp_handle),
        ])
    }

    pub fn channels(&self) -> &[PaymentChannel] {
        &self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_become_deep_links() {
        let venmo = PaymentChannel::new(PaymentChannelKind::Venmo, Some("@acme-floors".to_string()));
        assert_eq!(venmo.link().as_deref(), Some("https://venmo.com/acme-floors"));

        let cashapp = PaymentChannel::new(PaymentChannelKind::CashApp, Some("$acme".to_string()));
        assert_eq!(cashapp.link().as_deref(), Some("https://cash.app/acme"));
        assert_eq!(cashapp.display_text(), "$acme");
    }

    #[test]
    fn zelle_is_plain_text() {
        let zelle = PaymentChannel::new(PaymentChannelKind::Zelle, Some("pay@acme.com".to_string()));
        assert_eq!(zelle.link(), None);
        assert_eq!(zelle.display_text(), "pay@acme.com");
    }

    #[test]
    fn paypal_links_only_real_urls() {
        let url = PaymentChannel::new(
            PaymentChannelKind::PayPal,
            Some("https://paypal.me/acme".to_string()),
        );
        assert_eq!(url.link().as_deref(), Some("https://paypal.me/acme"));

        let bare = PaymentChannel::new(PaymentChannelKind::PayPal, Some("acme".to_string()));
        assert_eq!(bare.link(), None);
    }

    #[test]
    fn missing_identifiers_show_unlinked_placeholders() {
        let config = PaymentConfig::default();
        assert_eq!(config.channels().len(), 4);
        for channel in config.channels() {
            assert_eq!(channel.display_text(), channel.kind.placeholder());
            assert_eq!(channel.link(), None);
        }
    }

    #[test]
    fn link_mode_can_be_overridden() {
        let venmo = PaymentChannel::new(PaymentChannelKind::Venmo, Some("acme".to_string()))
            .with_link_mode(LinkMode::Plain);
        assert_eq!(venmo.link(), None);
    }

    #[test]
    fn panel_holds_four_channels() {
        let channels = (0..6)
            .map(|_| PaymentChannel::new(PaymentChannelKind::Zelle, None))
            .collect();
        assert_eq!(PaymentConfig::new(channels).channels().len(), MAX_PAYMENT_CHANNELS);
    }
}
