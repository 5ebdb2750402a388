use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::AuthApi;
use crate::models::{
    AuthUser, BusEnrollment, CreateEnrollmentRequest, CreateRouteRequest, Payment, PaymentFee,
    PaymentInvoice, Profile, RecordPaymentRequest, Role, RouteRequest, SignIn,
};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The identity service rejected the credentials; message kept verbatim.
    #[error("{0}")]
    Auth(String),
    #[error("request failed")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected response from record store (status {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },
    #[error("expected exactly one row, found {0}")]
    RowCount(usize),
}

/// Client for the hosted backend: an identity service under `/auth/v1` and a
/// row-level REST record store under `/rest/v1`. Holds no state beyond the
/// HTTP client; every method is a single remote call.
#[derive(Clone)]
pub struct RemoteBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemoteBackend {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        RemoteBackend {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let mut request = self
            .http
            .get(self.rest_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key);
        for (key, value) in filters {
            request = request.query(&[(key, value)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::UnexpectedResponse {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, BackendError> {
        let response = self
            .http
            .post(self.rest_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::UnexpectedResponse {
                status: status.as_u16(),
                body,
            });
        }
        let rows: Vec<T> = response.json().await?;
        expect_single(rows)
    }

    pub async fn enrollments_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<BusEnrollment>, BackendError> {
        self.select(
            "bus_enrollments",
            &[
                ("student_id", format!("eq.{student_id}")),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    pub async fn create_enrollment(
        &self,
        req: &CreateEnrollmentRequest,
    ) -> Result<BusEnrollment, BackendError> {
        self.insert("bus_enrollments", req).await
    }

    pub async fn route_requests_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<RouteRequest>, BackendError> {
        self.select(
            "route_requests",
            &[
                ("student_id", format!("eq.{student_id}")),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    pub async fn create_route_request(
        &self,
        req: &CreateRouteRequest,
    ) -> Result<RouteRequest, BackendError> {
        self.insert("route_requests", req).await
    }

    /// Fee schedule in force today for a route. Schedules are time-versioned,
    /// so the current one is the newest `effective_from` that is not in the
    /// future.
    pub async fn current_fee(&self, route_id: &str) -> Result<PaymentFee, BackendError> {
        let today = chrono::Utc::now().date_naive();
        let rows: Vec<PaymentFee> = self
            .select("payment_fees", &fee_query(route_id, today))
            .await?;
        expect_single(rows)
    }

    pub async fn payments_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<Payment>, BackendError> {
        self.select(
            "payments",
            &[
                ("student_id", format!("eq.{student_id}")),
                ("order", "year.desc,month.desc".to_string()),
            ],
        )
        .await
    }

    pub async fn record_payment(&self, req: &RecordPaymentRequest) -> Result<Payment, BackendError> {
        self.insert("payments", req).await
    }

    pub async fn invoice_for_payment(
        &self,
        payment_id: &str,
    ) -> Result<PaymentInvoice, BackendError> {
        let rows: Vec<PaymentInvoice> = self
            .select(
                "payment_invoices",
                &[("payment_id", format!("eq.{payment_id}"))],
            )
            .await?;
        expect_single(rows)
    }
}

#[async_trait::async_trait]
impl AuthApi for RemoteBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn, BackendError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!("sign-in rejected for {email} (status {status})");
            return Err(BackendError::Auth(auth_error_message(
                status.as_u16(),
                &body,
            )));
        }

        let session: serde_json::Value = serde_json::from_str(&body)?;
        let user = match session.get("user") {
            Some(value) if !value.is_null() => Some(serde_json::from_value::<AuthUser>(
                value.clone(),
            )?),
            _ => None,
        };
        Ok(SignIn { user, session })
    }

    async fn find_profile(&self, role: Role, auth_id: &str) -> Result<Profile, BackendError> {
        let rows: Vec<Profile> = self
            .select(role.table(), &[("auth_id", format!("eq.{auth_id}"))])
            .await?;
        expect_single(rows)
    }
}

fn fee_query(route_id: &str, today: chrono::NaiveDate) -> [(&'static str, String); 4] {
    [
        ("route_id", format!("eq.{route_id}")),
        ("effective_from", format!("lte.{today}")),
        ("order", "effective_from.desc".to_string()),
        ("limit", "1".to_string()),
    ]
}

fn expect_single<T>(mut rows: Vec<T>) -> Result<T, BackendError> {
    if rows.len() != 1 {
        return Err(BackendError::RowCount(rows.len()));
    }
    Ok(rows.remove(0))
}

/// Pull a human-readable message out of an identity-service error body,
/// whichever of the usual keys it uses.
fn auth_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("authentication failed (status {status})")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_row_is_returned() {
        assert_eq!(expect_single(vec![7]).unwrap(), 7);
    }

    #[test]
    fn zero_or_many_rows_are_rejected() {
        assert!(matches!(
            expect_single(Vec::<i32>::new()),
            Err(BackendError::RowCount(0))
        ));
        assert!(matches!(
            expect_single(vec![1, 2]),
            Err(BackendError::RowCount(2))
        ));
    }

    #[test]
    fn current_fee_query_excludes_future_schedules() {
        let today = chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let query = fee_query("R1", today);
        assert_eq!(query[0], ("route_id", "eq.R1".to_string()));
        assert_eq!(query[1], ("effective_from", "lte.2024-06-15".to_string()));
        assert_eq!(query[2], ("order", "effective_from.desc".to_string()));
        assert_eq!(query[3], ("limit", "1".to_string()));
    }

    #[test]
    fn auth_error_message_prefers_error_description() {
        let body = r#"{"error": "invalid_grant", "error_description": "Invalid login credentials"}"#;
        assert_eq!(auth_error_message(400, body), "Invalid login credentials");
    }

    #[test]
    fn auth_error_message_falls_back_to_msg_key() {
        let body = r#"{"msg": "Email not confirmed"}"#;
        assert_eq!(auth_error_message(401, body), "Email not confirmed");
    }

    #[test]
    fn auth_error_message_handles_non_json_bodies() {
        assert_eq!(auth_error_message(502, "bad gateway"), "bad gateway");
        assert_eq!(
            auth_error_message(500, "  "),
            "authentication failed (status 500)"
        );
    }
}
