//! Client layer: orchestrates signing and delegates HTTP to a transport.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::{SendSms, SharedKey, TransactionId, Username, ValidationError};
use crate::transport::{self, HttpVerb};

const DEFAULT_BASE_URL: &str = "https://rest.spirius.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
/// Raw HTTP response passed through from the transport.
///
/// The client performs no interpretation of status codes: an authentication
/// rejection or a 404 for an unknown transaction id comes back here, not as
/// an error.
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Response body text.
    pub body: String,
}

trait HttpTransport: Send + Sync {
    fn send(
        &self,
        verb: HttpVerb,
        url: String,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<ApiResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        verb: HttpVerb,
        url: String,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<ApiResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let method = match verb {
                HttpVerb::Get => reqwest::Method::GET,
                HttpVerb::Post => reqwest::Method::POST,
                HttpVerb::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, url).timeout(timeout);
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(bytes) = body {
                // The pre-serialized bytes go out verbatim; re-encoding here
                // would invalidate the body hash in the signature.
                builder = builder.body(bytes);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_owned(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response.text().await?;
            Ok(ApiResponse {
                status,
                headers,
                body,
            })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SpiriusClient`].
///
/// Server-side rejections are not represented here: any HTTP response,
/// 2xx or not, is returned as an [`ApiResponse`].
pub enum SpiriusError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// The configured base URL could not be parsed.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[source] url::ParseError),

    /// The request body could not be serialized to JSON.
    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
/// Builder for [`SpiriusClient`].
///
/// Use this when you need to customize the base URL, timeout, or user-agent.
pub struct SpiriusClientBuilder {
    shared_key: SharedKey,
    username: Username,
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
}

impl SpiriusClientBuilder {
    /// Create a builder with the default base URL and timeout.
    pub fn new(shared_key: SharedKey, username: Username) -> Self {
        Self {
            shared_key,
            username,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Override the gateway base URL (useful for test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout. Defaults to 5 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`SpiriusClient`].
    pub fn build(self) -> Result<SpiriusClient, SpiriusError> {
        url::Url::parse(&self.base_url).map_err(SpiriusError::InvalidBaseUrl)?;
        // Request paths always start with '/', so a trailing slash here would
        // produce "//" in both the URL and the signed path.
        let base_url = self.base_url.trim_end_matches('/').to_owned();

        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| SpiriusError::Transport(Box::new(err)))?;

        Ok(SpiriusClient {
            shared_key: self.shared_key,
            username: self.username,
            base_url,
            timeout: self.timeout,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// Client for the Spirius SMS Gateway REST API.
///
/// Each call signs its own request with the `SpiriusSmsV1` scheme and
/// performs one HTTP round trip; there is no per-call state, no retries,
/// and no shared mutable state, so a client may be cloned and used from
/// any number of tasks concurrently.
pub struct SpiriusClient {
    shared_key: SharedKey,
    username: Username,
    base_url: String,
    timeout: Duration,
    http: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for SpiriusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpiriusClient")
            .field("shared_key", &self.shared_key)
            .field("username", &self.username)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SpiriusClient {
    /// Create a client with the default base URL and a 5-second timeout.
    ///
    /// For more customization, use [`SpiriusClient::builder`].
    pub fn new(shared_key: SharedKey, username: Username) -> Self {
        Self {
            shared_key,
            username,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(shared_key: SharedKey, username: Username) -> SpiriusClientBuilder {
        SpiriusClientBuilder::new(shared_key, username)
    }

    /// Send a mobile-terminated SMS (`POST /sms/mt/send`).
    pub async fn send_sms(&self, request: &SendSms) -> Result<ApiResponse, SpiriusError> {
        let body = transport::encode_send_sms_body(request).map_err(SpiriusError::Encode)?;
        self.perform_request(HttpVerb::Post, "/sms/mt/send".to_owned(), Some(body))
            .await
    }

    /// Query delivery status for a sent message (`GET /sms/mo/status/{id}`).
    pub async fn message_status(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<ApiResponse, SpiriusError> {
        self.perform_request(
            HttpVerb::Get,
            format!("/sms/mo/status/{}", transaction_id.as_str()),
            None,
        )
        .await
    }

    /// List queued mobile-originated messages (`GET /sms/mo`).
    pub async fn list_inbound_messages(&self) -> Result<ApiResponse, SpiriusError> {
        self.perform_request(HttpVerb::Get, "/sms/mo".to_owned(), None)
            .await
    }

    /// Fetch one queued mobile-originated message without removing it
    /// (`GET /sms/mo/{id}`).
    pub async fn inbound_message(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<ApiResponse, SpiriusError> {
        self.perform_request(
            HttpVerb::Get,
            format!("/sms/mo/{}", transaction_id.as_str()),
            None,
        )
        .await
    }

    /// Fetch and remove one queued mobile-originated message
    /// (`DELETE /sms/mo/{id}`).
    pub async fn pop_inbound_message(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<ApiResponse, SpiriusError> {
        self.perform_request(
            HttpVerb::Delete,
            format!("/sms/mo/{}", transaction_id.as_str()),
            None,
        )
        .await
    }

    /// Fetch and remove the oldest queued mobile-originated message
    /// (`DELETE /sms/mo/next`).
    pub async fn pop_next_inbound_message(&self) -> Result<ApiResponse, SpiriusError> {
        self.perform_request(HttpVerb::Delete, "/sms/mo/next".to_owned(), None)
            .await
    }

    async fn perform_request(
        &self,
        verb: HttpVerb,
        path: String,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse, SpiriusError> {
        let timestamp = transport::unix_timestamp();
        let signature = transport::sign(
            self.shared_key.as_str(),
            &timestamp,
            verb.as_str(),
            &path,
            body.as_deref(),
        );
        let headers = transport::auth_headers(self.username.as_str(), &timestamp, &signature);
        let url = format!("{}{}", self.base_url, path);

        debug!(verb = verb.as_str(), %url, "dispatching signed request");

        self.http
            .send(verb, url, headers, body, self.timeout)
            .await
            .map_err(SpiriusError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use crate::domain::{MessageText, RawPhoneNumber, SenderId};

    use super::*;

    #[derive(Debug, Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        last_verb: Option<HttpVerb>,
        last_url: Option<String>,
        last_headers: Vec<(String, String)>,
        last_body: Option<Vec<u8>>,
        last_timeout: Option<Duration>,
        response_status: u16,
        response_body: String,
        fail: bool,
    }

    impl FakeTransport {
        fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    last_verb: None,
                    last_url: None,
                    last_headers: Vec::new(),
                    last_body: None,
                    last_timeout: None,
                    response_status,
                    response_body: response_body.into(),
                    fail: false,
                })),
            }
        }

        fn failing() -> Self {
            let transport = Self::new(0, "");
            transport.state.lock().unwrap().fail = true;
            transport
        }

        fn last_request(&self) -> (Option<HttpVerb>, Option<String>, Vec<(String, String)>) {
            let state = self.state.lock().unwrap();
            (
                state.last_verb,
                state.last_url.clone(),
                state.last_headers.clone(),
            )
        }

        fn last_body(&self) -> Option<Vec<u8>> {
            self.state.lock().unwrap().last_body.clone()
        }

        fn last_timeout(&self) -> Option<Duration> {
            self.state.lock().unwrap().last_timeout
        }
    }

    impl HttpTransport for FakeTransport {
        fn send(
            &self,
            verb: HttpVerb,
            url: String,
            headers: Vec<(String, String)>,
            body: Option<Vec<u8>>,
            timeout: Duration,
        ) -> BoxFuture<'_, Result<ApiResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move {
                let (status, response_body, fail) = {
                    let mut state = self.state.lock().unwrap();
                    state.last_verb = Some(verb);
                    state.last_url = Some(url);
                    state.last_headers = headers;
                    state.last_body = body;
                    state.last_timeout = Some(timeout);
                    (state.response_status, state.response_body.clone(), state.fail)
                };
                if fail {
                    return Err(Box::new(io::Error::new(
                        io::ErrorKind::ConnectionRefused,
                        "connection refused",
                    )) as Box<dyn StdError + Send + Sync>);
                }
                Ok(ApiResponse {
                    status,
                    headers: Vec::new(),
                    body: response_body,
                })
            })
        }
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn make_client(transport: FakeTransport) -> SpiriusClient {
        SpiriusClient {
            shared_key: SharedKey::new("secret").unwrap(),
            username: Username::new("test").unwrap(),
            base_url: "https://example.invalid/v1".to_owned(),
            timeout: DEFAULT_TIMEOUT,
            http: Arc::new(transport),
        }
    }

    fn sample_send_request() -> SendSms {
        SendSms::new(
            RawPhoneNumber::new("+46123456789").unwrap(),
            SenderId::new("SPIRIUS").unwrap(),
            MessageText::new("Hello world!").unwrap(),
        )
    }

    fn assert_signed(headers: &[(String, String)], verb: &str, path: &str, body: Option<&[u8]>) {
        let timestamp = header(headers, "X-SMS-Timestamp").expect("missing X-SMS-Timestamp");
        assert!(timestamp.chars().all(|c| c.is_ascii_digit()));

        let expected = transport::sign("secret", timestamp, verb, path, body);
        assert_eq!(
            header(headers, "Authorization"),
            Some(format!("SpiriusSmsV1 test:{expected}").as_str())
        );
        assert_eq!(header(headers, "Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn send_sms_posts_signed_body_to_mt_send() {
        let transport = FakeTransport::new(200, r#"{"TransactionId":"abc123"}"#);
        let client = make_client(transport.clone());

        let response = client.send_sms(&sample_send_request()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"TransactionId":"abc123"}"#);

        let (verb, url, headers) = transport.last_request();
        assert_eq!(verb, Some(HttpVerb::Post));
        assert_eq!(
            url.as_deref(),
            Some("https://example.invalid/v1/sms/mt/send")
        );

        let body = transport.last_body().expect("send must carry a body");
        assert_eq!(
            body,
            br#"{"message":"Hello world!","to":"+46123456789","from":"SPIRIUS"}"#
        );
        assert_signed(&headers, "POST", "/sms/mt/send", Some(&body));
    }

    #[tokio::test]
    async fn message_status_gets_status_path_without_body() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client(transport.clone());
        let id = TransactionId::new("abc123").unwrap();

        client.message_status(&id).await.unwrap();

        let (verb, url, headers) = transport.last_request();
        assert_eq!(verb, Some(HttpVerb::Get));
        assert_eq!(
            url.as_deref(),
            Some("https://example.invalid/v1/sms/mo/status/abc123")
        );
        assert_eq!(transport.last_body(), None);
        assert_signed(&headers, "GET", "/sms/mo/status/abc123", None);
    }

    #[tokio::test]
    async fn list_inbound_messages_gets_mo_root() {
        let transport = FakeTransport::new(200, "[]");
        let client = make_client(transport.clone());

        client.list_inbound_messages().await.unwrap();

        let (verb, url, headers) = transport.last_request();
        assert_eq!(verb, Some(HttpVerb::Get));
        assert_eq!(url.as_deref(), Some("https://example.invalid/v1/sms/mo"));
        assert_eq!(transport.last_body(), None);
        assert_signed(&headers, "GET", "/sms/mo", None);
    }

    #[tokio::test]
    async fn inbound_message_gets_mo_by_id() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client(transport.clone());
        let id = TransactionId::new("tx-1").unwrap();

        client.inbound_message(&id).await.unwrap();

        let (verb, url, headers) = transport.last_request();
        assert_eq!(verb, Some(HttpVerb::Get));
        assert_eq!(
            url.as_deref(),
            Some("https://example.invalid/v1/sms/mo/tx-1")
        );
        assert_signed(&headers, "GET", "/sms/mo/tx-1", None);
    }

    #[tokio::test]
    async fn pop_inbound_message_deletes_mo_by_id() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client(transport.clone());
        let id = TransactionId::new("tx-1").unwrap();

        client.pop_inbound_message(&id).await.unwrap();

        let (verb, url, headers) = transport.last_request();
        assert_eq!(verb, Some(HttpVerb::Delete));
        assert_eq!(
            url.as_deref(),
            Some("https://example.invalid/v1/sms/mo/tx-1")
        );
        assert_eq!(transport.last_body(), None);
        assert_signed(&headers, "DELETE", "/sms/mo/tx-1", None);
    }

    #[tokio::test]
    async fn pop_next_inbound_message_deletes_mo_next() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client(transport.clone());

        client.pop_next_inbound_message().await.unwrap();

        let (verb, url, headers) = transport.last_request();
        assert_eq!(verb, Some(HttpVerb::Delete));
        assert_eq!(
            url.as_deref(),
            Some("https://example.invalid/v1/sms/mo/next")
        );
        assert_signed(&headers, "DELETE", "/sms/mo/next", None);
    }

    #[tokio::test]
    async fn non_success_statuses_pass_through_unmodified() {
        let transport = FakeTransport::new(404, "not found");
        let client = make_client(transport);

        let response = client
            .message_status(&TransactionId::new("missing").unwrap())
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, "not found");
    }

    #[tokio::test]
    async fn transport_failures_surface_as_transport_errors() {
        let client = make_client(FakeTransport::failing());

        let err = client.list_inbound_messages().await.unwrap_err();
        assert!(matches!(err, SpiriusError::Transport(_)));
    }

    #[tokio::test]
    async fn default_timeout_is_five_seconds() {
        let transport = FakeTransport::new(200, "[]");
        let client = make_client(transport.clone());

        client.list_inbound_messages().await.unwrap();
        assert_eq!(transport.last_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn builder_applies_overrides_and_trims_trailing_slash() {
        let client = SpiriusClient::builder(
            SharedKey::new("secret").unwrap(),
            Username::new("test").unwrap(),
        )
        .base_url("https://example.invalid/v1/")
        .timeout(Duration::from_secs(30))
        .user_agent("spirius-tests")
        .build()
        .unwrap();

        assert_eq!(client.base_url, "https://example.invalid/v1");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn builder_rejects_unparseable_base_url() {
        let err = SpiriusClient::builder(
            SharedKey::new("secret").unwrap(),
            Username::new("test").unwrap(),
        )
        .base_url("not a url")
        .build()
        .unwrap_err();

        assert!(matches!(err, SpiriusError::InvalidBaseUrl(_)));
    }

    #[tokio::test]
    async fn clones_share_credentials_and_sign_independently() {
        let transport = FakeTransport::new(200, "[]");
        let client = make_client(transport.clone());
        let clone = client.clone();

        clone.list_inbound_messages().await.unwrap();
        let (_, _, headers) = transport.last_request();
        assert_signed(&headers, "GET", "/sms/mo", None);
    }
}
