//! HTTP transport for the connected-vehicle API

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::{ServiceConfig, COMMANDS_PREFIX, VEHICLE_LIST};
use crate::error::{NightguardError, Result};
use crate::types::*;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the application key
pub const API_KEY_HEADER: &str = "vcc-api-key";

/// Connected-vehicle REST API client
///
/// Sends the bearer token and API key with every request and interprets the
/// status embedded in each response body. Any status other than 200 or 202
/// terminates the session: the failing call returns
/// [`NightguardError::ApiStatus`] and every later call on this client (or a
/// clone of it) returns [`NightguardError::SessionTerminated`] without
/// touching the network.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ServiceConfig>,
    terminated: Arc<AtomicBool>,
}

impl ApiClient {
    /// Create a new client from a service configuration
    pub fn new(config: ServiceConfig) -> Result<Self> {
        Self::with_config(config, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new client with custom timeouts
    pub fn with_config(
        config: ServiceConfig,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        Url::parse(&config.base_uri)?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| NightguardError::InvalidHeader("Authorization"))?;
        bearer.set_sensitive(true);
        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| NightguardError::InvalidHeader(API_KEY_HEADER))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
            terminated: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get the service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Whether a fatal response has ended this session
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    pub(crate) fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
    }

    /// Match an endpoint name to its media type; `None` when unmapped
    pub fn get_service_data(&self, endpoint: &str) -> Option<&str> {
        self.config.media_type(endpoint)
    }

    /// Like [`get_service_data`](Self::get_service_data) but unmapped
    /// endpoints are an error
    pub fn media_type(&self, endpoint: &str) -> Result<&str> {
        self.get_service_data(endpoint).ok_or_else(|| {
            warn!("No media type configured for endpoint '{}'", endpoint);
            NightguardError::UnmappedEndpoint(endpoint.to_string())
        })
    }

    /// Media type of the `accept` header for an action on `endpoint`
    pub fn command_media_type(&self, endpoint: &str) -> Result<&str> {
        self.media_type(&format!("{}{}", COMMANDS_PREFIX, endpoint))
    }

    /// Build the full URL for a resource path.
    ///
    /// The path is appended to the base URI verbatim so any base path
    /// (e.g. `/connected-vehicle/v1/vehicles`) is kept.
    pub fn url(&self, path: &str) -> Result<Url> {
        let base = self.config.base_uri.trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }

    /// Build the URL for `path` with one more path segment appended.
    ///
    /// The segment is percent-encoded, so reserved characters such as `/`,
    /// `?` or `#` stay inside it.
    pub fn url_with_segment(&self, path: &str, segment: &str) -> Result<Url> {
        let mut url = self.url(path)?;
        let cannot_be_base = url::ParseError::RelativeUrlWithCannotBeABaseBase;
        url.path_segments_mut()
            .map_err(|_| NightguardError::InvalidUrl(cannot_be_base))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    // =========================================================================
    // Vehicle List
    // =========================================================================

    /// List the vehicles registered on the account
    #[instrument(skip(self))]
    pub async fn vehicles(&self) -> Result<Vec<VehicleListEntry>> {
        let response = self.get_endpoint("/", VEHICLE_LIST).await?;
        response.data_as()
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// GET `path`, sending the media type of `endpoint` as `accept`.
    ///
    /// Nothing is sent when the endpoint is unmapped.
    pub async fn get_endpoint(&self, path: &str, endpoint: &str) -> Result<ApiResponse> {
        let accept = self.media_type(endpoint)?;
        self.get(path, accept).await
    }

    /// GET `path` with an explicit `accept` media type
    #[instrument(skip(self))]
    pub async fn get(&self, path: &str, accept: &str) -> Result<ApiResponse> {
        let url = self.url(path)?;
        self.get_url(url, accept).await
    }

    /// GET an already built URL with an explicit `accept` media type
    #[instrument(skip(self))]
    pub async fn get_url(&self, url: Url, accept: &str) -> Result<ApiResponse> {
        self.ensure_active()?;
        debug!("GET {}", url);

        let response = self.client.get(url).header(ACCEPT, accept).send().await?;
        self.handle_response(response).await
    }

    /// POST to `path` with explicit `content-Type` and `accept` media types
    #[instrument(skip(self))]
    pub async fn post(&self, path: &str, content_type: &str, accept: &str) -> Result<ApiResponse> {
        self.ensure_active()?;
        let url = self.url(path)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, accept)
            .send()
            .await?;
        self.handle_response(response).await
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    fn ensure_active(&self) -> Result<()> {
        if self.is_terminated() {
            Err(NightguardError::SessionTerminated)
        } else {
            Ok(())
        }
    }

    /// Parse the envelope and apply the status rules
    async fn handle_response(&self, response: reqwest::Response) -> Result<ApiResponse> {
        let http_status = response.status();
        let body = response.text().await?;

        let mut envelope = if body.trim().is_empty() {
            empty_envelope()
        } else {
            match serde_json::from_str::<ApiResponse>(&body) {
                Ok(envelope) => envelope,
                Err(e) if http_status.is_success() => {
                    return Err(NightguardError::Parse(e.to_string()))
                }
                Err(_) => empty_envelope(),
            }
        };

        if envelope.status == 0 {
            envelope.status = http_status.as_u16();
        }
        if envelope.error.is_none() && !http_status.is_success() {
            envelope.error = Some(transport_error(http_status));
        }

        self.check_status(envelope)
    }

    fn check_status(&self, response: ApiResponse) -> Result<ApiResponse> {
        match response.status {
            STATUS_OK => Ok(response),
            STATUS_ACCEPTED => {
                info!(
                    "Status: {}, Message: {}",
                    response.status,
                    response.error_message()
                );
                Ok(response)
            }
            status => {
                let message = response.error_message();
                error!("Status: {}, Message: {}", status, message);
                self.terminate();
                Err(NightguardError::api_status(status, message))
            }
        }
    }
}

fn empty_envelope() -> ApiResponse {
    ApiResponse {
        status: 0,
        operation_id: None,
        error: None,
        data: serde_json::Value::Null,
    }
}

fn transport_error(status: StatusCode) -> ApiErrorBody {
    ApiErrorBody {
        message: None,
        description: Some(format!("HTTP {}", status)),
    }
}
