use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// Monthly fee schedule for a route, time-versioned by effective date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFee {
    pub id: String,
    pub route_id: String,
    pub monthly_amount: f64,
    pub effective_from: NaiveDate,
}

/// One payment instance per student/route/month/year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub student_id: String,
    pub route_id: String,
    pub month: u32,
    pub year: i32,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: Option<String>,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub gateway_order_id: Option<String>,
    #[serde(default)]
    pub gateway_payment_id: Option<String>,
    pub status: PaymentStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub student_id: String,
    pub route_id: String,
    pub month: u32,
    pub year: i32,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub payment_type: PaymentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_payment_id: Option<String>,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInvoice {
    pub id: String,
    pub payment_id: String,
    pub invoice_number: String,
    pub generated_at: DateTime<Utc>,
}
