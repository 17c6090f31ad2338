//! NETS QR client.

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use serde_json::{Number, json};
use storefront::money::to_decimal_string;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::gateways::{GatewayError, QrCode, QrGateway, QrStatus, RetryPolicy};

const REQUEST_PATH: &str = "/api/v1/common/payments/nets-qr/request";
const QUERY_PATH: &str = "/api/v1/common/payments/nets-qr/query";

/// Response code NETS uses for an accepted request.
const APPROVED: &str = "00";

/// Configuration for connecting to NETS.
#[derive(Debug, Clone)]
pub struct NetsConfig {
    /// API base URL, e.g. `"https://sandbox.nets.openapipaas.com"`.
    pub base_url: String,

    pub api_key: Zeroizing<String>,

    pub project_id: String,

    /// Merchant transaction id sent with each QR request.
    pub txn_id: String,
}

/// HTTP client for issuing NETS QR codes and polling their status.
#[derive(Debug, Clone)]
pub struct NetsClient {
    config: NetsConfig,
    http: Client,
    retry: RetryPolicy,
}

impl NetsClient {
    #[must_use]
    pub fn new(config: NetsConfig, retry: RetryPolicy) -> Self {
        Self {
            config,
            http: Client::new(),
            retry,
        }
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<NetsResponseData, GatewayError> {
        let response = self
            .http
            .post(format!("{}{path}", self.config.base_url))
            .header("api-key", self.config.api_key.as_str())
            .header("project-id", &self.config.project_id)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(GatewayError::Status { status, body });
        }

        let parsed: NetsResponse = response
            .json()
            .await
            .map_err(|error| GatewayError::UnexpectedResponse(error.to_string()))?;

        Ok(parsed.result.data)
    }
}

#[async_trait]
impl QrGateway for NetsClient {
    async fn request_qr(&self, amount: Money<'static, Currency>) -> Result<QrCode, GatewayError> {
        let dollars = to_decimal_string(&amount);

        let amt_in_dollars = Number::from_str(&dollars)
            .map_err(|error| GatewayError::UnexpectedResponse(error.to_string()))?;

        let body = json!({
            "txn_id": self.config.txn_id,
            "amt_in_dollars": amt_in_dollars,
            "notify_mobile": 0,
        });

        let body = &body;

        let data = self
            .retry
            .gateway("nets.request_qr", || async move {
                self.post(REQUEST_PATH, body).await
            })
            .await?;

        let issued = data.response_code.as_deref() == Some(APPROVED) && data.txn_status == Some(1);

        match (issued, data.qr_code, data.txn_retrieval_ref) {
            (true, Some(qr_code), Some(txn_retrieval_ref)) if !qr_code.is_empty() => {
                info!(%txn_retrieval_ref, amount = %dollars, "nets qr issued");

                Ok(QrCode {
                    txn_retrieval_ref,
                    qr_code,
                })
            }
            _ => {
                let reason = data
                    .error_message
                    .or(data.response_code)
                    .unwrap_or_else(|| "qr code not issued".to_string());

                warn!(%reason, "nets qr request declined");

                Err(GatewayError::Declined(reason))
            }
        }
    }

    async fn query_status(&self, txn_retrieval_ref: &str) -> Result<QrStatus, GatewayError> {
        let body = json!({
            "txn_retrieval_ref": txn_retrieval_ref,
            "frontend_timeout_status": 0,
        });

        let body = &body;

        let data = self
            .retry
            .gateway("nets.query_status", || async move {
                self.post(QUERY_PATH, body).await
            })
            .await?;

        let status = data.status();

        debug!(
            txn_retrieval_ref,
            response_code = data.response_code.as_deref().unwrap_or_default(),
            ?status,
            "nets qr status"
        );

        Ok(status)
    }
}

#[derive(Debug, Deserialize)]
struct NetsResponse {
    result: NetsResult,
}

#[derive(Debug, Deserialize)]
struct NetsResult {
    data: NetsResponseData,
}

#[derive(Debug, Default, Deserialize)]
struct NetsResponseData {
    #[serde(default)]
    response_code: Option<String>,

    #[serde(default)]
    txn_status: Option<i64>,

    #[serde(default)]
    qr_code: Option<String>,

    #[serde(default)]
    txn_retrieval_ref: Option<String>,

    #[serde(default)]
    error_message: Option<String>,
}

impl NetsResponseData {
    /// `"00"` with status 1 is paid, `"09"` or status 0 is still waiting, anything else failed.
    fn status(&self) -> QrStatus {
        match (self.response_code.as_deref(), self.txn_status) {
            (Some(APPROVED), Some(1)) => QrStatus::Paid,
            (Some("09"), _) | (_, Some(0) | None) => QrStatus::Pending,
            _ => QrStatus::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storefront::money::sgd;
    use testresult::TestResult;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use super::*;

    async fn client() -> (MockServer, NetsClient) {
        let server = MockServer::start().await;

        let client = NetsClient::new(
            NetsConfig {
                base_url: server.uri(),
                api_key: Zeroizing::new("key".to_string()),
                project_id: "project".to_string(),
                txn_id: "sandbox_nets|m|test".to_string(),
            },
            RetryPolicy::none(),
        );

        (server, client)
    }

    fn reply(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "result": { "data": data } }))
    }

    #[tokio::test]
    async fn issued_qr_carries_retrieval_reference() -> TestResult {
        let (server, client) = client().await;

        Mock::given(method("POST"))
            .and(path(REQUEST_PATH))
            .and(header("api-key", "key"))
            .and(header("project-id", "project"))
            .and(body_partial_json(json!({
                "txn_id": "sandbox_nets|m|test",
                "amt_in_dollars": 26.4,
                "notify_mobile": 0,
            })))
            .respond_with(reply(json!({
                "response_code": "00",
                "txn_status": 1,
                "qr_code": "iVBORw0KGgo=",
                "txn_retrieval_ref": "P1234",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let qr = client.request_qr(sgd(2_640)).await?;

        assert_eq!(qr.txn_retrieval_ref, "P1234");
        assert_eq!(qr.qr_code, "iVBORw0KGgo=");

        Ok(())
    }

    #[tokio::test]
    async fn missing_qr_code_is_declined() {
        let (server, client) = client().await;

        Mock::given(method("POST"))
            .and(path(REQUEST_PATH))
            .respond_with(reply(json!({
                "response_code": "00",
                "txn_status": 1,
                "qr_code": "",
                "txn_retrieval_ref": "P1234",
            })))
            .mount(&server)
            .await;

        let result = client.request_qr(sgd(2_640)).await;

        assert!(
            matches!(result, Err(GatewayError::Declined(_))),
            "expected Declined, got {result:?}"
        );
    }

    #[tokio::test]
    async fn query_maps_status_codes() -> TestResult {
        let (server, client) = client().await;

        for (reference, data, expected) in [
            ("paid", json!({ "response_code": "00", "txn_status": 1 }), QrStatus::Paid),
            ("waiting", json!({ "response_code": "09", "txn_status": 0 }), QrStatus::Pending),
            ("failed", json!({ "response_code": "68", "txn_status": 2 }), QrStatus::Failed),
        ] {
            Mock::given(method("POST"))
                .and(path(QUERY_PATH))
                .and(body_partial_json(json!({ "txn_retrieval_ref": reference })))
                .respond_with(reply(data))
                .mount(&server)
                .await;

            assert_eq!(client.query_status(reference).await?, expected);
        }

        Ok(())
    }
}
