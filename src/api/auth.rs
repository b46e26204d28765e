use crate::client::SessionClient;
use crate::errors::Error;
use crate::request::RequestDescriptor;
use crate::transport::Transport;

pub struct AuthApi<'a, T: Transport> {
    client: &'a SessionClient<T>,
}

impl<'a, T: Transport> AuthApi<'a, T> {
    pub(crate) fn new(client: &'a SessionClient<T>) -> Self {
        Self { client }
    }

    /// URL that starts the browser OAuth login; the API sends the user back to `redirect`.
    pub fn login_url(&self, redirect: Option<&str>) -> String {
        let base = format!("{}/login/google", self.client.base_url());
        match redirect {
            Some(path) => format!("{base}?redirect={}", urlencoding::encode(path)),
            None => base,
        }
    }

    /// Clears the session cookies server side.
    pub async fn logout(&self) -> Result<String, Error> {
        let resp = self
            .client
            .fetch::<serde_json::Value>(RequestDescriptor::post("/auth/logout"))
            .await?;
        Ok(resp.meta.message)
    }
}
