use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{ApiResponse, AuthApi, RegistrantApi, TicketApi, UserApi, into_api_error};
use crate::config::{ClientConfig, ConfigLocation, read_config};
use crate::errors::Error;
use crate::request::{RequestDescriptor, Response};
use crate::session::SessionCoordinator;
use crate::transport::{HttpTransport, Transport};

/// HTTP client for the ticketing API that renews an expired session transparently.
///
/// A request answered with 401 is parked behind a single renewal call
/// (`POST {refresh_path}`) and re-sent once the session is renewed. Callers
/// only ever see the replayed outcome or the renewal failure.
pub struct SessionClient<T: Transport = HttpTransport> {
    transport: Arc<T>,
    coordinator: Arc<SessionCoordinator>,
    base_url: String,
}

impl<T: Transport> Clone for SessionClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            coordinator: Arc::clone(&self.coordinator),
            base_url: self.base_url.clone(),
        }
    }
}

impl SessionClient<HttpTransport> {
    /// Create a client talking to `config.base_url` over HTTP.
    /// # ENV Vars (when the config comes from `ClientConfig::from_env`)
    /// * `TICKETING_API_URL` - API root, e.g. `https://api.example.com/api/v1`
    /// * `TICKETING_REFRESH_PATH` - Optional renewal path, defaults to `/auth/refresh`
    /// * `TICKETING_TIMEOUT_SECS` - Optional per-request timeout
    /// * `TICKETING_USER_AGENT` - Optional User-Agent override
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let config = config.validated()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(transport, &config))
    }

    pub async fn from_location(location: ConfigLocation) -> Result<Self, Error> {
        Self::new(read_config(location).await?)
    }
}

impl<T: Transport> SessionClient<T> {
    pub fn with_transport(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            coordinator: Arc::new(SessionCoordinator::new(config.refresh_path.as_str(), None)),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Registers the handler run when a renewal fails (e.g. navigate to the login page).
    ///
    /// The handler is stored on the shared coordinator, so clones taken before
    /// this call pick it up as well.
    pub fn on_unauthenticated<F>(self, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.coordinator.set_unauthenticated_handler(Arc::new(handler));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Response, Error> {
        let outcome = self.transport.send(&descriptor).await;
        match outcome {
            Err(err) if err.is_auth_expiry() && !descriptor.retried() => {
                warn!(
                    method = %descriptor.method(),
                    path = descriptor.path(),
                    request_id = %descriptor.request_id(),
                    status = 401,
                    "request.session_expired"
                );
                self.coordinator
                    .on_auth_expiry(&self.transport, descriptor)
                    .await
            }
            Err(err) => {
                debug!(
                    method = %descriptor.method(),
                    path = descriptor.path(),
                    request_id = %descriptor.request_id(),
                    error = %err,
                    "request.failed"
                );
                Err(err)
            }
            ok => ok,
        }
    }

    /// Runs `request` and decodes the `{ data, meta }` envelope.
    pub async fn fetch<D: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<ApiResponse<D>, Error> {
        match self.request(descriptor).await {
            Ok(resp) => resp.json(),
            Err(err) => Err(into_api_error(err)),
        }
    }

    pub fn auth(&self) -> AuthApi<'_, T> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UserApi<'_, T> {
        UserApi::new(self)
    }

    pub fn tickets(&self) -> TicketApi<'_, T> {
        TicketApi::new(self)
    }

    pub fn registrants(&self) -> RegistrantApi<'_, T> {
        RegistrantApi::new(self)
    }
}
