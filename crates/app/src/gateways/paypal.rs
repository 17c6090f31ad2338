//! PayPal Orders API client.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::{
    Client, Response,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use storefront::money::to_decimal_string;
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::gateways::{CaptureOutcome, GatewayError, RedirectGateway, RedirectOrder, RetryPolicy};

/// Configuration for connecting to PayPal.
#[derive(Debug, Clone)]
pub struct PayPalConfig {
    /// API base URL, e.g. `"https://api-m.sandbox.paypal.com"`.
    pub api: String,

    pub client_id: String,

    pub client_secret: Zeroizing<String>,
}

/// HTTP client for PayPal order creation and capture.
#[derive(Debug, Clone)]
pub struct PayPalClient {
    config: PayPalConfig,
    http: Client,
    retry: RetryPolicy,
}

impl PayPalClient {
    #[must_use]
    pub fn new(config: PayPalConfig, retry: RetryPolicy) -> Self {
        Self {
            config,
            http: Client::new(),
            retry,
        }
    }

    fn basic_auth(&self) -> Zeroizing<String> {
        let credentials = Zeroizing::new(format!(
            "{}:{}",
            self.config.client_id,
            self.config.client_secret.as_str()
        ));

        Zeroizing::new(format!("Basic {}", BASE64.encode(credentials.as_bytes())))
    }

    async fn access_token(&self) -> Result<Zeroizing<String>, GatewayError> {
        let url = format!("{}/v1/oauth2/token", self.config.api);

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.basic_auth().as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let token: TokenResponse = parse(response).await?;

        Ok(Zeroizing::new(token.access_token))
    }
}

#[async_trait]
impl RedirectGateway for PayPalClient {
    async fn create_order(
        &self,
        amount: Money<'static, Currency>,
    ) -> Result<RedirectOrder, GatewayError> {
        let value = to_decimal_string(&amount);
        let currency_code = amount.currency().iso_alpha_code;

        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": format!("order-{}", Uuid::now_v7().simple()),
                "amount": {
                    "currency_code": currency_code,
                    "value": value,
                    "breakdown": {
                        "item_total": { "currency_code": currency_code, "value": value },
                    },
                },
                "items": [{
                    "name": "Order",
                    "sku": "order-item",
                    "unit_amount": { "currency_code": currency_code, "value": value },
                    "quantity": "1",
                }],
            }],
        });

        let body = &body;

        let order: OrderResponse = self
            .retry
            .gateway("paypal.create_order", || async move {
                let token = self.access_token().await?;

                let response = self
                    .http
                    .post(format!("{}/v2/checkout/orders", self.config.api))
                    .bearer_auth(token.as_str())
                    .json(body)
                    .send()
                    .await?;

                parse(response).await
            })
            .await?;

        info!(order_id = %order.id, amount = %value, "paypal order created");

        let approve_url = order
            .links
            .into_iter()
            .find(|link| link.rel == "approve" || link.rel == "payer-action")
            .map(|link| link.href);

        Ok(RedirectOrder {
            order_id: order.id,
            approve_url,
        })
    }

    async fn capture_order(&self, order_id: &str) -> Result<CaptureOutcome, GatewayError> {
        let capture: CaptureResponse = self
            .retry
            .gateway("paypal.capture_order", || async move {
                let token = self.access_token().await?;

                let response = self
                    .http
                    .post(format!(
                        "{}/v2/checkout/orders/{order_id}/capture",
                        self.config.api
                    ))
                    .bearer_auth(token.as_str())
                    .header(CONTENT_TYPE, "application/json")
                    .send()
                    .await?;

                parse(response).await
            })
            .await?;

        debug!(order_id, status = %capture.status, "paypal capture response");

        if capture.status == "COMPLETED" {
            Ok(CaptureOutcome::Completed)
        } else {
            Ok(CaptureOutcome::NotCompleted(capture.status))
        }
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();

        return Err(GatewayError::Status { status, body });
    }

    response
        .json()
        .await
        .map_err(|error| GatewayError::UnexpectedResponse(error.to_string()))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,

    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    status: String,
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

    async fn client() -> (MockServer, PayPalClient) {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .and(header("authorization", "Basic aWQ6c2VjcmV0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "token-123",
                "token_type": "Bearer",
            })))
            .mount(&server)
            .await;

        let client = PayPalClient::new(
            PayPalConfig {
                api: server.uri(),
                client_id: "id".to_string(),
                client_secret: Zeroizing::new("secret".to_string()),
            },
            RetryPolicy::none(),
        );

        (server, client)
    }

    #[tokio::test]
    async fn create_order_sends_two_decimal_amount() -> TestResult {
        let (server, client) = client().await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .and(header("authorization", "Bearer token-123"))
            .and(body_partial_json(json!({
                "intent": "CAPTURE",
                "purchase_units": [{ "amount": { "currency_code": "SGD", "value": "46.30" } }],
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "5O190127TN364715T",
                "status": "CREATED",
                "links": [
                    { "href": "https://example.test/self", "rel": "self" },
                    { "href": "https://example.test/approve", "rel": "approve" },
                ],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let order = client.create_order(sgd(4_630)).await?;

        assert_eq!(order.order_id, "5O190127TN364715T");
        assert_eq!(
            order.approve_url.as_deref(),
            Some("https://example.test/approve")
        );

        Ok(())
    }

    #[tokio::test]
    async fn only_completed_capture_counts() -> TestResult {
        let (server, client) = client().await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders/A/capture"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "status": "COMPLETED" })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders/B/capture"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "status": "PENDING" })))
            .mount(&server)
            .await;

        assert_eq!(client.capture_order("A").await?, CaptureOutcome::Completed);
        assert_eq!(
            client.capture_order("B").await?,
            CaptureOutcome::NotCompleted("PENDING".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn unapproved_capture_is_a_status_error() {
        let (server, client) = client().await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders/C/capture"))
            .respond_with(ResponseTemplate::new(422).set_body_string("ORDER_NOT_APPROVED"))
            .mount(&server)
            .await;

        let result = client.capture_order("C").await;

        assert!(
            matches!(&result, Err(GatewayError::Status { status, .. }) if status.as_u16() == 422),
            "expected 422, got {result:?}"
        );
    }
}
