use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::Error;
use crate::request::{Body, FormPart, PartValue, RequestDescriptor, Response};

/// Issues a single HTTP call. Non-2xx responses come back as `Error::Http`.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: &RequestDescriptor,
    ) -> impl Future<Output = Result<Response, Error>> + Send;
}

/// `reqwest`-backed transport with a cookie store for the API's HTTP-only session cookies.
///
/// Redirects are not followed: a 3xx is returned as a successful response so
/// callers can read the `Location` header.
pub struct HttpTransport {
    http_client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(after) if err.is_timeout() => Error::Timeout(after),
            _ => Error::Reqwest(err),
        }
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, Error> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            PartValue::Text(value) => form.text(part.name.clone(), value.clone()),
            PartValue::File {
                file_name,
                mime,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime)?;
                }
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}

impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<Response, Error> {
        let url = format!("{}{}", self.base_url, request.path());
        let mut builder = self
            .http_client
            .request(request.method().clone(), &url)
            .headers(request.headers().clone())
            .header("X-Request-ID", request.request_id().to_string());
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        builder = match request.body() {
            Body::Empty => builder,
            Body::Json(bytes) => builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes.clone()),
            Body::Form(pairs) => builder.form(pairs),
            Body::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| self.map_send_error(e))?
            .to_vec();

        debug!(
            method = %request.method(),
            path = request.path(),
            request_id = %request.request_id(),
            status = status.as_u16(),
            bytes = body.len(),
            "transport.response"
        );

        if status.is_success() || status.is_redirection() {
            Ok(Response::new(status, headers, body))
        } else {
            Err(Error::Http(
                status,
                String::from_utf8_lossy(&body).into_owned(),
            ))
        }
    }
}
