//! FPS operations client.
//!
//! Every API operation is the same explicit three-step sequence: build the
//! flat parameter set, sign it, dispatch the GET request; the response body
//! then goes through the streaming tree builder keyed by the action name.
//! The CBUI path differs only in that it signs with the lowercase parameter
//! names and produces a redirect URL instead of dispatching.

use std::time::Duration;

use chrono::Utc;
use url::Url;

use crate::config::ApiConfig;
use crate::errors::FlexPayError;
use crate::params::Params;
use crate::response::{parse_response, ResponseNode};
use crate::signature::{sign, SignatureMethod};
use crate::types::{CbuiPipeline, ChargeFeeTo, CurrencyCode, PaymentMethod, RefundPolicy};
use crate::Result;

/// API version token sent with every REST request.
const API_VERSION: &str = "2010-08-28";

/// Signature version token for the signing scheme implemented here.
const SIGNATURE_VERSION: i64 = 2;

/// Client for the FPS REST API.
///
/// Holds the caller's credentials and a configured HTTP client. Each
/// operation is independent; no state is shared between calls beyond the
/// connection pool, so one client may serve concurrent requests.
///
/// # Example
///
/// ```rust,ignore
/// use flexpay::{ApiConfig, FlexPayClient, ChargeFeeTo};
///
/// let client = FlexPayClient::sandbox("AKIA...", "secret...")?;
/// let result = client.pay("order-1", "token-5", 9.99, ChargeFeeTo::Recipient).await?;
/// println!("transaction: {}", result.get_child("TransactionId").unwrap());
/// ```
pub struct FlexPayClient {
    config: ApiConfig,
    access_key: String,
    secret_key: String,
    currency: CurrencyCode,
    client: reqwest::Client,
}

impl FlexPayClient {
    /// Create a client with the given configuration and credentials.
    pub fn new(
        config: ApiConfig,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FlexPayError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            currency: CurrencyCode::default(),
            client,
        })
    }

    /// Create a client for the FPS sandbox environment.
    pub fn sandbox(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self> {
        Self::new(ApiConfig::sandbox(), access_key, secret_key)
    }

    /// Set the currency used for transaction amounts.
    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Ambient parameters for REST API calls.
    fn api_parameters(&self, params: &mut Params) {
        params.insert("AWSAccessKeyId", self.access_key.as_str());
        params.insert("SignatureMethod", SignatureMethod::HmacSha256);
        params.insert("SignatureVersion", SIGNATURE_VERSION);
        params.insert("Version", API_VERSION);
        params.insert(
            "Timestamp",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        );
    }

    /// Ambient parameters for the browser-redirect (CBUI) call style.
    fn cbui_parameters(&self, params: &mut Params) {
        params.insert("callerKey", self.access_key.as_str());
        params.insert("signatureMethod", SignatureMethod::HmacSha256);
        params.insert("signatureVersion", SIGNATURE_VERSION);
    }

    /// Sign and dispatch a REST API call, returning the parsed result tree.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, params), fields(action = action))
    )]
    async fn call(&self, action: &'static str, mut params: Params) -> Result<ResponseNode> {
        params.insert("Action", action);
        self.api_parameters(&mut params);

        let endpoint = Url::parse(&self.config.api_url)?;
        let signature = sign(&params, &endpoint, self.secret_key.as_bytes())?;
        params.insert("Signature", signature);

        let pairs = params.render()?;
        let response = self
            .client
            .get(endpoint)
            .query(&pairs)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FlexPayError::Transport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(FlexPayError::RestApi {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_string(),
                body,
            });
        }

        parse_response(&body, action)
    }

    /// Map reqwest errors to FlexPayError.
    fn map_reqwest_error(&self, e: reqwest::Error) -> FlexPayError {
        if e.is_timeout() {
            FlexPayError::ConnectionTimeout {
                operation: "FPS request".to_string(),
                timeout_ms: self.config.timeout_secs * 1000,
            }
        } else if e.is_connect() {
            FlexPayError::Transport(format!(
                "connection to {} failed: {}",
                self.config.api_url, e
            ))
        } else {
            FlexPayError::Transport(format!("FPS request failed: {}", e))
        }
    }

    // ========================================================================
    // REST API operations
    // ========================================================================

    /// Get the caller account's balance.
    pub async fn get_account_balance(&self) -> Result<ResponseNode> {
        self.call("GetAccountBalance", Params::new()).await
    }

    /// Transfer money from a sender token to the caller's account.
    ///
    /// `caller_reference` is the caller-scoped idempotency key for the order;
    /// `sender_token_id` identifies the payment instrument authorized through
    /// the CBUI pipeline.
    pub async fn pay(
        &self,
        caller_reference: &str,
        sender_token_id: &str,
        amount: f64,
        charge_fee_to: ChargeFeeTo,
    ) -> Result<ResponseNode> {
        let mut params = Params::new();
        params.insert("CallerReference", caller_reference);
        params.insert("SenderTokenId", sender_token_id);
        params.insert("TransactionAmount.Value", amount);
        params.insert("TransactionAmount.CurrencyCode", self.currency);
        params.insert("ChargeFeeTo", charge_fee_to);
        self.call("Pay", params).await
    }

    /// Refund a previously completed transaction, fully (no amount) or
    /// partially.
    pub async fn refund(
        &self,
        caller_reference: &str,
        transaction_id: &str,
        amount: Option<f64>,
        refund_policy: RefundPolicy,
        description: Option<&str>,
    ) -> Result<ResponseNode> {
        let mut params = Params::new();
        params.insert("CallerReference", caller_reference);
        params.insert("TransactionId", transaction_id);
        params.insert("MarketplaceRefundPolicy", refund_policy);
        if let Some(amount) = amount {
            params.insert("RefundAmount.Value", amount);
            params.insert("RefundAmount.CurrencyCode", self.currency);
        }
        params.insert_opt("CallerDescription", description);
        self.call("Refund", params).await
    }

    /// Reserve funds on a sender token for a later [`settle`](Self::settle).
    pub async fn reserve(
        &self,
        caller_reference: &str,
        sender_token_id: &str,
        amount: f64,
        charge_fee_to: ChargeFeeTo,
        description: Option<&str>,
    ) -> Result<ResponseNode> {
        let mut params = Params::new();
        params.insert("CallerReference", caller_reference);
        params.insert("SenderTokenId", sender_token_id);
        params.insert("TransactionAmount.Value", amount);
        params.insert("TransactionAmount.CurrencyCode", self.currency);
        params.insert("ChargeFeeTo", charge_fee_to);
        params.insert_opt("CallerDescription", description);
        self.call("Reserve", params).await
    }

    /// Settle a previously reserved transaction, fully (no amount) or
    /// partially.
    pub async fn settle(
        &self,
        reserve_transaction_id: &str,
        amount: Option<f64>,
    ) -> Result<ResponseNode> {
        let mut params = Params::new();
        params.insert("ReserveTransactionId", reserve_transaction_id);
        if let Some(amount) = amount {
            params.insert("TransactionAmount.Value", amount);
            params.insert("TransactionAmount.CurrencyCode", self.currency);
        }
        self.call("Settle", params).await
    }

    /// Cancel a pending or reserved transaction.
    pub async fn cancel(&self, transaction_id: &str) -> Result<ResponseNode> {
        let mut params = Params::new();
        params.insert("TransactionId", transaction_id);
        self.call("Cancel", params).await
    }

    /// Cancel a payment token so it can no longer be charged.
    pub async fn cancel_token(
        &self,
        token_id: &str,
        reason_text: Option<&str>,
    ) -> Result<ResponseNode> {
        let mut params = Params::new();
        params.insert("TokenId", token_id);
        params.insert_opt("ReasonText", reason_text);
        self.call("CancelToken", params).await
    }

    /// Get the current status of a transaction.
    pub async fn get_transaction_status(&self, transaction_id: &str) -> Result<ResponseNode> {
        let mut params = Params::new();
        params.insert("TransactionId", transaction_id);
        self.call("GetTransactionStatus", params).await
    }

    /// Look up tokens installed by this caller, by caller reference or token
    /// id.
    pub async fn get_token_by_caller(
        &self,
        caller_reference: Option<&str>,
        token_id: Option<&str>,
    ) -> Result<ResponseNode> {
        let mut params = Params::new();
        params.insert_opt("CallerReference", caller_reference);
        params.insert_opt("TokenId", token_id);
        self.call("GetTokenByCaller", params).await
    }

    /// Ask the service to verify the signature on a redirect-back URL.
    ///
    /// The URL is decomposed into the endpoint (scheme, authority, path) and
    /// the raw query, which the service checks against its own record of the
    /// signature it issued.
    pub async fn verify_signature(&self, redirect_url: &str) -> Result<ResponseNode> {
        let url = Url::parse(redirect_url)?;
        let mut params = Params::new();
        params.insert("UrlEndPoint", url_end_point(&url)?);
        params.insert("HttpParameters", url.query().unwrap_or(""));
        self.call("VerifySignature", params).await
    }

    // ========================================================================
    // Co-Branded UI
    // ========================================================================

    /// Build a signed Co-Branded UI redirect URL for a payment authorization.
    ///
    /// No request is dispatched; the returned URL is where the sender's
    /// browser is sent to walk the pipeline. The signature rides along under
    /// the lowercase `signature` key and is verified by the provider when the
    /// sender arrives.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, request), fields(caller_reference = %request.caller_reference))
    )]
    pub fn cbui_url(&self, request: &CbuiRequest) -> Result<String> {
        let methods = request
            .payment_methods
            .iter()
            .map(PaymentMethod::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut params = Params::new();
        params.insert("callerReference", request.caller_reference.as_str());
        params.insert("currencyCode", self.currency);
        params.insert("paymentMethod", methods);
        params.insert("transactionAmount", request.transaction_amount);
        params.insert("pipelineName", request.pipeline);
        params.insert("returnURL", request.return_url.as_str());
        params.insert_opt("paymentReason", request.payment_reason.as_deref());
        self.cbui_parameters(&mut params);

        let endpoint = Url::parse(&self.config.cbui_url)?;
        let signature = sign(&params, &endpoint, self.secret_key.as_bytes())?;
        params.insert("signature", signature);

        let mut pairs = params.render()?;
        pairs.sort_unstable();

        let mut url = endpoint;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in &pairs {
                query.append_pair(name, value);
            }
        }
        Ok(url.to_string())
    }
}

/// The scheme://authority/path part of a URL, query dropped.
fn url_end_point(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| FlexPayError::InvalidEndpoint("redirect URL has no host".to_string()))?;
    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    Ok(format!("{}://{}{}", url.scheme(), authority, url.path()))
}

/// Inputs for a Co-Branded UI redirect URL.
///
/// Defaults match the common case: the single-use pipeline offering all
/// payment methods.
#[derive(Clone, Debug)]
pub struct CbuiRequest {
    /// Caller-scoped reference identifying the order.
    pub caller_reference: String,
    /// Where the sender's browser returns after the pipeline completes.
    pub return_url: String,
    /// Transaction amount. In the sandbox, decimals between .60 and .89
    /// simulate various error conditions.
    pub transaction_amount: f64,
    /// Reason shown to the sender on the checkout page.
    pub payment_reason: Option<String>,
    /// Pipeline to walk.
    pub pipeline: CbuiPipeline,
    /// Payment methods offered to the sender.
    pub payment_methods: Vec<PaymentMethod>,
}

impl CbuiRequest {
    /// Create a request with the default pipeline and payment methods.
    pub fn new(
        caller_reference: impl Into<String>,
        return_url: impl Into<String>,
        transaction_amount: f64,
    ) -> Self {
        Self {
            caller_reference: caller_reference.into(),
            return_url: return_url.into(),
            transaction_amount,
            payment_reason: None,
            pipeline: CbuiPipeline::default(),
            payment_methods: PaymentMethod::ALL.to_vec(),
        }
    }

    /// Set the payment reason shown to the sender.
    pub fn with_payment_reason(mut self, reason: impl Into<String>) -> Self {
        self.payment_reason = Some(reason.into());
        self
    }

    /// Set the pipeline.
    pub fn with_pipeline(mut self, pipeline: CbuiPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Restrict the payment methods offered.
    pub fn with_payment_methods(mut self, methods: Vec<PaymentMethod>) -> Self {
        self.payment_methods = methods;
        self
    }
}
