//! # PayPal HTTP Client
//!
//! Signs and sends requests to the PayPal REST API. Callers only see
//! `PayPalRequest` going in and `PayPalResponse` coming out.

use crate::auth::TokenCache;
use crate::config::PayPalConfig;
use checkout_core::{ApiResponse, ErrorDetail, PaymentError, PaymentResult};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Default wait suggested when a 429 carries no `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// HTTP verb of a PayPal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
        }
    }
}

/// A request ready to be executed
#[derive(Debug, Clone)]
pub struct PayPalRequest {
    pub verb: Verb,
    /// Path below the API base URL, starting with `/`
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl PayPalRequest {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response of an executed request
#[derive(Debug, Clone)]
pub struct PayPalResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl PayPalResponse {
    /// Parse the body into a typed resource
    pub fn into_api_response<T: DeserializeOwned>(self) -> PaymentResult<ApiResponse<T>> {
        let result = serde_json::from_value(self.body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse PayPal response: {}", e))
        })?;
        Ok(ApiResponse {
            status_code: self.status_code,
            headers: self.headers,
            result,
        })
    }
}

/// PayPal's standard error body
#[derive(Debug, Deserialize)]
struct PayPalErrorBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    debug_id: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

/// Client bound to one PayPal account and environment
pub struct PayPalHttpClient {
    config: PayPalConfig,
    client: Client,
    tokens: TokenCache,
}

impl PayPalHttpClient {
    pub fn new(config: PayPalConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            client,
            tokens: TokenCache::new(),
        })
    }

    pub fn config(&self) -> &PayPalConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Absolute URL the request is sent to
    pub fn request_url(&self, request: &PayPalRequest) -> String {
        format!("{}{}", self.config.api_base_url(), request.path)
    }

    /// Execute a request and return the response on 2xx
    pub async fn execute(&self, request: PayPalRequest) -> PaymentResult<PayPalResponse> {
        let token = self.tokens.access_token(&self.client, &self.config).await?;
        let url = self.request_url(&request);

        debug!("PayPal request: {:?} {}", request.verb, request.path);

        let mut builder = self
            .client
            .request(request.verb.method(), &url)
            .bearer_auth(&token)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");

        if let Some(partner) = &self.config.partner_attribution_id {
            builder = builder.header("PayPal-Partner-Attribution-Id", partner);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let headers = collect_headers(response.headers());
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                warn!("PayPal rejected the access token, dropping it");
                self.tokens.invalidate().await;
            }
            let err = error_from_response(status.as_u16(), &headers, &text, &request.path);
            error!("PayPal API error: status={}, error={}", status, err);
            return Err(err);
        }

        let body = if text.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&text).map_err(|e| {
                PaymentError::Serialization(format!("PayPal returned invalid JSON: {}", e))
            })?
        };

        Ok(PayPalResponse {
            status_code: status.as_u16(),
            headers,
            body,
        })
    }
}

fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Map a non-2xx response to a `PaymentError`
pub fn error_from_response(
    status: u16,
    headers: &HashMap<String, String>,
    body: &str,
    path: &str,
) -> PaymentError {
    match status {
        404 => PaymentError::ResourceNotFound {
            resource_id: resource_id_from_path(path),
        },
        429 => PaymentError::RateLimited {
            retry_after_secs: headers
                .get(RETRY_AFTER.as_str())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        _ => match serde_json::from_str::<PayPalErrorBody>(body) {
            Ok(parsed) => PaymentError::Api {
                status,
                name: parsed.name.unwrap_or_else(|| "UNKNOWN_ERROR".to_string()),
                message: parsed.message.unwrap_or_else(|| body.to_string()),
                debug_id: parsed
                    .debug_id
                    .or_else(|| headers.get("paypal-debug-id").cloned()),
                details: parsed.details,
            },
            Err(_) => PaymentError::Api {
                status,
                name: "UNKNOWN_ERROR".to_string(),
                message: format!("HTTP {}: {}", status, body),
                debug_id: headers.get("paypal-debug-id").cloned(),
                details: Vec::new(),
            },
        },
    }
}

/// The id segment of a path like `/v2/checkout/orders/{id}/capture`
fn resource_id_from_path(path: &str) -> String {
    const ACTIONS: [&str; 3] = ["capture", "authorize", "refund"];
    path.split('/')
        .filter(|s| !s.is_empty() && !ACTIONS.contains(s))
        .last()
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "test-token",
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> PayPalHttpClient {
        PayPalHttpClient::new(PayPalConfig::new("id", "secret").with_api_base_url(server.uri()))
            .unwrap()
    }

    #[test]
    fn test_resource_id_from_path() {
        assert_eq!(resource_id_from_path("/v2/checkout/orders/ABC"), "ABC");
        assert_eq!(resource_id_from_path("/v2/checkout/orders/ABC/capture"), "ABC");
        assert_eq!(resource_id_from_path("/v2/payments/captures/CAP/refund"), "CAP");
    }

    #[test]
    fn test_error_mapping() {
        let headers = HashMap::from([("paypal-debug-id".to_string(), "hdr-debug".to_string())]);

        let body = json!({
            "name": "UNPROCESSABLE_ENTITY",
            "message": "The requested action could not be performed.",
            "debug_id": "90957fca61718",
            "details": [{ "issue": "ORDER_NOT_APPROVED", "description": "Payer has not yet approved the Order for payment." }]
        })
        .to_string();
        match error_from_response(422, &headers, &body, "/v2/checkout/orders/X/capture") {
            PaymentError::Api { status, name, debug_id, details, .. } => {
                assert_eq!(status, 422);
                assert_eq!(name, "UNPROCESSABLE_ENTITY");
                assert_eq!(debug_id.as_deref(), Some("90957fca61718"));
                assert_eq!(details[0].issue, "ORDER_NOT_APPROVED");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match error_from_response(500, &headers, "<html>oops</html>", "/v2/checkout/orders") {
            PaymentError::Api { name, debug_id, .. } => {
                assert_eq!(name, "UNKNOWN_ERROR");
                assert_eq!(debug_id.as_deref(), Some("hdr-debug"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let limited = HashMap::from([("retry-after".to_string(), "7".to_string())]);
        assert!(matches!(
            error_from_response(429, &limited, "", "/v2/checkout/orders"),
            PaymentError::RateLimited { retry_after_secs: 7 }
        ));

        assert!(matches!(
            error_from_response(404, &headers, "", "/v2/checkout/orders/NOPE"),
            PaymentError::ResourceNotFound { resource_id } if resource_id == "NOPE"
        ));
    }

    #[tokio::test]
    async fn test_execute_sends_bearer_and_body() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({ "intent": "CAPTURE" })))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("paypal-debug-id", "abc123")
                    .set_body_json(json!({ "id": "ORDER-1", "status": "CREATED" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = PayPalRequest::new(Verb::Post, "/v2/checkout/orders")
            .header("Prefer", "return=representation")
            .body(json!({ "intent": "CAPTURE" }));

        let response = client_for(&server).execute(request).await.unwrap();
        assert_eq!(response.status_code, 201);
        assert_eq!(response.body["id"], "ORDER-1");
        assert_eq!(response.headers.get("paypal-debug-id").map(String::as_str), Some("abc123"));
    }

    #[tokio::test]
    async fn test_execute_sends_partner_attribution_id() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/v2/checkout/orders/ORDER-1"))
            .and(header("paypal-partner-attribution-id", "BN-CODE_1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "ORDER-1", "status": "APPROVED" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut config = PayPalConfig::new("id", "secret").with_api_base_url(server.uri());
        config.partner_attribution_id = Some("BN-CODE_1".to_string());
        let client = PayPalHttpClient::new(config).unwrap();

        let response = client
            .execute(PayPalRequest::new(Verb::Get, "/v2/checkout/orders/ORDER-1"))
            .await
            .unwrap();
        assert_eq!(response.status_code, 200);
    }

    #[test]
    fn test_request_url_follows_mode() {
        let request = PayPalRequest::new(Verb::Get, "/v2/checkout/orders/ORDER-1");

        let sandbox = PayPalHttpClient::new(PayPalConfig::new("id", "secret")).unwrap();
        assert_eq!(
            sandbox.request_url(&request),
            "https://api-m.sandbox.paypal.com/v2/checkout/orders/ORDER-1"
        );

        let live = PayPalHttpClient::new(
            PayPalConfig::new("id", "secret").with_mode(crate::environment::Environment::Live),
        )
        .unwrap();
        assert_eq!(
            live.request_url(&request),
            "https://api-m.paypal.com/v2/checkout/orders/ORDER-1"
        );
    }

    #[tokio::test]
    async fn test_empty_success_body_becomes_object() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/v2/checkout/orders/EMPTY"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .execute(PayPalRequest::new(Verb::Get, "/v2/checkout/orders/EMPTY"))
            .await
            .unwrap();
        assert_eq!(response.status_code, 204);
        assert_eq!(response.body, json!({}));
    }

    #[tokio::test]
    async fn test_unauthorized_drops_token() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/v2/checkout/orders/X"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "name": "AUTHENTICATION_FAILURE",
                "message": "Authentication failed due to invalid authentication credentials or a missing Authorization header."
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .execute(PayPalRequest::new(Verb::Get, "/v2/checkout/orders/X"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Api { status: 401, .. }));
        assert!(client.tokens().cached().await.is_none());
    }

    #[test]
    fn test_into_api_response_type_mismatch() {
        let response = PayPalResponse {
            status_code: 200,
            headers: HashMap::new(),
            body: json!({ "unexpected": true }),
        };
        let parsed = response.into_api_response::<checkout_core::OrderResource>();
        assert!(matches!(parsed, Err(PaymentError::Serialization(_))));
    }
}
