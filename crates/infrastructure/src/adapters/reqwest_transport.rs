//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It resolves request
//! paths against the configured base address, keeps a cookie jar when the
//! configuration asks for ambient credentials, and reports every status code
//! as a successful execution.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use groupguard_application::{HttpTransport, TransportError};
use groupguard_domain::request::FormValue;
use groupguard_domain::{ApiRequest, ApiResponse, ClientConfig, FormPart, HttpMethod, RequestBody};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Url};
use tracing::debug;

/// Redirect ceiling.
const MAX_REDIRECTS: u32 = 10;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the base address does not parse, or `Other`
    /// if the underlying client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        Url::parse(&config.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", config.base_url)))?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS as usize))
            .cookie_store(config.with_credentials)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self::with_client(client, config))
    }

    /// Creates a transport around an existing reqwest client.
    #[must_use]
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Absolute URL for a request, query pairs included.
    fn resolve(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let raw = format!("{}{}", self.base_url, request.path);
        let mut url =
            Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{e}: {raw}")))?;

        if !request.query.is_empty() {
            let encoded = serde_urlencoded::to_string(&request.query)
                .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
                _ => encoded,
            };
            url.set_query(Some(&query));
        }
        Ok(url)
    }

    /// Attaches the body to the builder.
    fn build_body(
        builder: RequestBuilder,
        body: &RequestBody,
    ) -> Result<RequestBuilder, TransportError> {
        match body {
            RequestBody::Empty => Ok(builder),
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| TransportError::InvalidBody(format!("Invalid JSON: {e}")))?;
                Ok(builder.body(bytes))
            }
            RequestBody::Multipart(parts) => {
                let form = parts.iter().try_fold(Form::new(), |form, part| {
                    Self::build_part(part).map(|built| form.part(part.name.clone(), built))
                })?;
                Ok(builder.multipart(form))
            }
        }
    }

    /// Builds one multipart field; file parts get a guessed content type.
    fn build_part(part: &FormPart) -> Result<Part, TransportError> {
        match &part.value {
            FormValue::Text(text) => Ok(Part::text(text.clone())),
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let mime = content_type.clone().unwrap_or_else(|| {
                    mime_guess::from_path(file_name)
                        .first_or(mime::APPLICATION_OCTET_STREAM)
                        .to_string()
                });
                Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(&mime)
                    .map_err(|e| TransportError::InvalidBody(format!("{}: {e}", part.name)))
            }
        }
    }

    /// Maps reqwest errors to `TransportError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error.to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") {
                return TransportError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lower.contains("refused") {
                return TransportError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return TransportError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return TransportError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        TransportError::Other(error.to_string())
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + '_>> {
        let method = request.method;
        let url = self.resolve(request);
        let headers = request.headers.clone();
        let body = request.body.clone();
        let timeout_ms = request.timeout_ms.unwrap_or(self.timeout_ms);

        Box::pin(async move {
            let url = url?;
            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), url.clone())
                .timeout(Duration::from_millis(timeout_ms));

            for (name, value) in &headers {
                builder = builder.header(name, value);
            }

            if let Some(content_type) = body.content_type() {
                let has_content_type = headers
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
                if !has_content_type {
                    builder = builder.header("Content-Type", content_type);
                }
            }

            builder = Self::build_body(builder, &body)?;

            debug!(%method, %url, "sending request");
            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let response_headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| TransportError::Other(format!("Failed to read body: {e}")))?
                .to_vec();

            let duration = start.elapsed();
            debug!(
                %method,
                path = url.path(),
                status,
                elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                "received response"
            );

            Ok(ApiResponse::new(status, response_headers, body_bytes, duration))
        })
    }
}
