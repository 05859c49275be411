use crate::pii::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Paypal,
    Apple,
}

impl PaymentMethod {
    pub fn requires_card_details(self) -> bool {
        self == PaymentMethod::Card
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Apple => "apple",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: Masked<String>,
    pub expiry_date: String,
    pub cvv: Masked<String>,
    pub card_name: String,
}

impl CardDetails {
    /// All four fields filled in
    pub fn is_complete(&self) -> bool {
        !self.card_number.is_blank()
            && !self.expiry_date.trim().is_empty()
            && !self.cvv.is_blank()
            && !self.card_name.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub trip_id: String,
    pub amount: u64,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_details: Option<CardDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub payment_id: String,
    pub status: String,
    pub booking_reference: String,
}
