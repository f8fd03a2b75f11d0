//! URL query flags carried across redirect hops.
//!
//! These flags are the wire contract between the optimize page, the auth
//! pages, and the payment provider's hosted page; they must round-trip
//! exactly as produced.

/// Flags appended to the optimize-page URL for post-auth resumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReturnFlags {
    /// Restore the stored optimization state after navigation.
    pub restore: bool,
    /// Reopen the payment step once restored.
    pub show_payment: bool,
    /// The navigation arrived via a login/signup page.
    pub from_auth: bool,
}

impl ReturnFlags {
    /// All three flags set: the shape written by the auth gate.
    pub fn resume_payment() -> Self {
        Self {
            restore: true,
            show_payment: true,
            from_auth: true,
        }
    }

    /// Serialize to a query string, emitting only the flags that are set.
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if self.restore {
            parts.push("restore=true");
        }
        if self.show_payment {
            parts.push("showPayment=true");
        }
        if self.from_auth {
            parts.push("fromAuth=true");
        }
        parts.join("&")
    }

    /// Parse from a query string. Unknown parameters are ignored; a flag is
    /// set only by the literal value `true`.
    pub fn from_query(query: &str) -> Self {
        let mut flags = Self::default();
        for pair in query.split('&') {
            let mut it = pair.splitn(2, '=');
            let key = it.next().unwrap_or("");
            let value = it.next().unwrap_or("");
            match (key, value) {
                ("restore", "true") => flags.restore = true,
                ("showPayment", "true") => flags.show_payment = true,
                ("fromAuth", "true") => flags.from_auth = true,
                _ => {}
            }
        }
        flags
    }

    /// Full optimize-page path carrying these flags.
    pub fn optimize_path(&self) -> String {
        let query = self.to_query();
        if query.is_empty() {
            "/optimize".to_string()
        } else {
            format!("/optimize?{}", query)
        }
    }
}

/// Parameters the payment provider appends when redirecting the browser
/// back from its hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReturnParams {
    pub payment_intent: String,
    pub payment_intent_client_secret: String,
    pub redirect_status: Option<String>,
}

impl GatewayReturnParams {
    /// Parse from a query string. Returns `None` unless both the intent id
    /// and the client secret are present.
    pub fn from_query(query: &str) -> Option<Self> {
        let mut payment_intent = None;
        let mut client_secret = None;
        let mut redirect_status = None;

        for pair in query.split('&') {
            let mut it = pair.splitn(2, '=');
            let key = it.next().unwrap_or("");
            let value = it.next().unwrap_or("");
            match key {
                "payment_intent" => payment_intent = Some(value.to_string()),
                "payment_intent_client_secret" => client_secret = Some(value.to_string()),
                "redirect_status" => redirect_status = Some(value.to_string()),
                _ => {}
            }
        }

        Some(Self {
            payment_intent: payment_intent?,
            payment_intent_client_secret: client_secret?,
            redirect_status,
        })
    }
}
