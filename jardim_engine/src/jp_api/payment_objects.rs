use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize};

/// The status a gateway reports for a payment that went through
pub const APPROVED: &str = "approved";

/// The body of a payment gateway webhook call.
///
/// ```json
/// { "data": { "id": "123456789", "status": "approved", "external_reference": "42" } }
/// ```
///
/// `external_reference` carries the order id. Gateways send ids either as strings or as numbers; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayNotification {
    pub data: GatewayPaymentData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPaymentData {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub status: String,
    #[serde(deserialize_with = "string_or_number")]
    pub external_reference: String,
}

impl GatewayNotification {
    pub fn new<I: Display, S: Into<String>>(gateway_id: I, status: S, order_id: i64) -> Self {
        let data = GatewayPaymentData {
            id: gateway_id.to_string(),
            status: status.into(),
            external_reference: order_id.to_string(),
        };
        Self { data }
    }

    pub fn is_approved(&self) -> bool {
        self.data.status.eq_ignore_ascii_case(APPROVED)
    }

    /// The order id the notification refers to, if `external_reference` is one.
    pub fn order_id(&self) -> Option<i64> {
        self.data.external_reference.trim().parse().ok()
    }

    pub fn gateway_id(&self) -> &str {
        self.data.id.as_str()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
