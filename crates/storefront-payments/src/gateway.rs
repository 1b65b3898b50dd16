//! Gateway Client
//!
//! Paystack-compatible `transaction/initialize` and `transaction/verify`
//! calls, authenticated with the secret key as a bearer token.

use std::time::Duration;

use reqwest::{Client, Method, Url};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};

/// Gateway client configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Secret API key
    pub secret_key: String,

    /// API root, e.g. `https://api.paystack.co`
    pub base_url: String,

    /// Settlement currency code sent with every initialize call
    pub currency: String,

    /// Per-request deadline
    pub timeout: Duration,
}

impl GatewayConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.paystack.co";
    pub const DEFAULT_CURRENCY: &'static str = "ZAR";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: Self::DEFAULT_BASE_URL.into(),
            currency: Self::DEFAULT_CURRENCY.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("PAYSTACK_SECRET_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GatewayError::Config("PAYSTACK_SECRET_KEY not set".into()))?;

        let mut config = Self::new(secret_key);
        if let Ok(base_url) = std::env::var("PAYSTACK_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(currency) = std::env::var("PAYMENT_CURRENCY") {
            config.currency = currency.to_uppercase();
        }
        if let Some(secs) = std::env::var("OUTBOUND_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Convert a major-unit amount to the gateway's minor unit (×100, rounded to the nearest unit)
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    if amount <= Decimal::ZERO {
        return Err(GatewayError::InvalidAmount(format!("{amount} must be positive")));
    }
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| GatewayError::InvalidAmount(format!("{amount} is out of range")))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| GatewayError::InvalidAmount(format!("{amount} is out of range")))
}

/// Payment session returned by initialize
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySession {
    /// Opaque reference, passed back to `verify`
    pub reference: String,

    /// Access code for inline/popup checkout
    pub access_code: Option<String>,

    /// Hosted payment page to redirect the customer to
    pub authorization_url: Option<String>,

    /// Gateway response body as received
    pub raw: Value,
}

/// Gateway verification payload, passed through unmodified
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationOutcome {
    pub raw: Value,
}

impl VerificationOutcome {
    /// Top-level request status flag as reported by the gateway
    pub fn request_ok(&self) -> Option<bool> {
        self.raw.get("status").and_then(Value::as_bool)
    }

    /// Transaction status string (`success`, `failed`, `abandoned`, ...) as reported
    pub fn transaction_status(&self) -> Option<&str> {
        self.raw
            .get("data")
            .and_then(|d| d.get("status"))
            .and_then(Value::as_str)
    }
}

#[derive(Serialize)]
struct InitializeBody<'a> {
    email: &'a str,
    amount: i64,
    currency: &'a str,
}

/// Payment gateway client
pub struct GatewayClient {
    http: Client,
    base_url: Url,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::Config(format!("invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Config(format!("{base_url} cannot be a base url")));
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::Config("base url cannot take a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call(
        &self,
        method: Method,
        url: Url,
        body: Option<&InitializeBody<'_>>,
    ) -> Result<Value> {
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&self.config.secret_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(&e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::from_reqwest(&e))?;
        let parsed = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from));
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        parsed.map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    /// Start a payment session for `amount` (major units) in the configured currency
    pub async fn initialize(&self, email: &str, amount: Decimal) -> Result<GatewaySession> {
        let minor = to_minor_units(amount)?;
        let body = InitializeBody {
            email,
            amount: minor,
            currency: &self.config.currency,
        };

        let url = self.endpoint(&["transaction", "initialize"])?;
        let raw = self.call(Method::POST, url, Some(&body)).await?;

        let data = raw.get("data");
        let field = |name: &str| {
            data.and_then(|d| d.get(name))
                .and_then(Value::as_str)
                .map(String::from)
        };

        let Some(reference) = field("reference") else {
            let message = raw.get("message").and_then(Value::as_str).map(String::from);
            return Err(match raw.get("status").and_then(Value::as_bool) {
                Some(false) => GatewayError::Rejected {
                    status: 200,
                    message,
                },
                _ => GatewayError::InvalidResponse("no transaction reference returned".into()),
            });
        };

        tracing::info!(
            reference = %reference,
            amount = minor,
            currency = %self.config.currency,
            "Initialized payment"
        );

        Ok(GatewaySession {
            access_code: field("access_code"),
            authorization_url: field("authorization_url"),
            reference,
            raw,
        })
    }

    /// Look up a transaction by reference
    pub async fn verify(&self, reference: &str) -> Result<VerificationOutcome> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(GatewayError::InvalidReference("reference is empty".into()));
        }

        let url = self.endpoint(&["transaction", "verify", reference])?;
        let raw = self.call(Method::GET, url, None).await?;
        let outcome = VerificationOutcome { raw };

        tracing::info!(
            reference,
            status = outcome.transaction_status().unwrap_or("unknown"),
            "Verified payment"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GatewayClient {
        let mut config = GatewayConfig::new("sk_test_123");
        config.base_url = server.uri();
        config.timeout = Duration::from_secs(2);
        GatewayClient::new(config).unwrap()
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(dec!(250)).unwrap(), 25000);
        assert_eq!(to_minor_units(dec!(19.99)).unwrap(), 1999);
        assert_eq!(to_minor_units(dec!(0.005)).unwrap(), 1);
        assert!(to_minor_units(Decimal::ZERO).is_err());
        assert!(to_minor_units(dec!(-5)).is_err());
        assert!(matches!(
            to_minor_units(Decimal::MAX),
            Err(GatewayError::InvalidAmount(_))
        ));
        assert!(matches!(
            to_minor_units(dec!(100000000000000000)),
            Err(GatewayError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_initialize_sends_minor_units() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transaction/initialize"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_json(json!({"email": "a@b.com", "amount": 25000, "currency": "ZAR"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "message": "Authorization URL created",
                "data": {
                    "authorization_url": "https://checkout.paystack.com/abc",
                    "access_code": "abc",
                    "reference": "ref-1"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server).initialize("a@b.com", dec!(250)).await.unwrap();
        assert_eq!(session.reference, "ref-1");
        assert_eq!(session.access_code.as_deref(), Some("abc"));
        assert_eq!(session.raw["message"], "Authorization URL created");
    }

    #[tokio::test]
    async fn test_gateway_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": false,
                "message": "Invalid Email Address Passed"
            })))
            .mount(&server)
            .await;

        let err = client(&server).initialize("nope", dec!(10)).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { status: 400, .. }));
        assert_eq!(err.user_message("fallback"), "Invalid Email Address Passed");
    }

    #[tokio::test]
    async fn test_verify_passes_payload_through() {
        let server = MockServer::start().await;
        let payload = json!({
            "status": true,
            "message": "Verification successful",
            "data": {"status": "success", "reference": "ref-1", "amount": 25000}
        });
        Mock::given(method("GET"))
            .and(path("/transaction/verify/ref-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
            .mount(&server)
            .await;

        let outcome = client(&server).verify("ref-1").await.unwrap();
        assert_eq!(outcome.raw, payload);
        assert_eq!(outcome.transaction_status(), Some("success"));
        assert_eq!(outcome.request_ok(), Some(true));
    }

    #[tokio::test]
    async fn test_verify_escapes_reference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transaction/verify/a%2Fb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client(&server).verify("a/b").await.is_ok());
        assert!(matches!(
            client(&server).verify("  ").await,
            Err(GatewayError::InvalidReference(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let mut config = GatewayConfig::new("sk_test_123");
        config.base_url = "http://127.0.0.1:9".into();
        let err = GatewayClient::new(config).unwrap().verify("ref").await.unwrap_err();
        assert!(matches!(err, GatewayError::Http(_) | GatewayError::Timeout));
        assert_eq!(err.user_message("Verification failed."), "Verification failed.");
    }
}
