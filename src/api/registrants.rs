use reqwest::Url;
use reqwest::header::LOCATION;

use crate::client::SessionClient;
use crate::errors::Error;
use crate::request::RequestDescriptor;
use crate::transport::Transport;
use crate::types::{PaginatedRegistrants, RegistrantByUser, RegistrantQuery, Verification};

use super::segment;

pub struct RegistrantApi<'a, T: Transport> {
    client: &'a SessionClient<T>,
}

impl<'a, T: Transport> RegistrantApi<'a, T> {
    pub(crate) fn new(client: &'a SessionClient<T>) -> Self {
        Self { client }
    }

    /// Claims a spot on `ticket_id`. Private tickets need the state code from `generate_state`.
    pub async fn register(&self, ticket_id: &str, state: Option<&str>) -> Result<String, Error> {
        let mut desc = RequestDescriptor::post(format!("/registrant/{}", segment(ticket_id)));
        if let Some(state) = state {
            desc = desc.query("state", state);
        }
        Ok(self.client.fetch::<serde_json::Value>(desc).await?.meta.message)
    }

    pub async fn by_ticket(
        &self,
        ticket_id: &str,
        query: &RegistrantQuery,
    ) -> Result<PaginatedRegistrants, Error> {
        let desc = RequestDescriptor::get(format!("/registrant/{}", segment(ticket_id)))
            .query("page", query.page.to_string())
            .query("limit", query.limit.to_string())
            .query("search", query.search.as_str());
        Ok(self
            .client
            .fetch::<PaginatedRegistrants>(desc)
            .await?
            .data)
    }

    /// Short-lived state code for a private ticket; empty for public tickets.
    pub async fn generate_state(&self, ticket_id: &str) -> Result<String, Error> {
        let desc = RequestDescriptor::get(format!("/registrant/gen/{}", segment(ticket_id)));
        let resp = self.client.fetch::<Option<String>>(desc).await?;
        Ok(resp.data.unwrap_or_default())
    }

    /// Registrations of the signed-in user.
    pub async fn mine(&self) -> Result<Vec<RegistrantByUser>, Error> {
        let resp = self
            .client
            .fetch::<Option<Vec<RegistrantByUser>>>(RequestDescriptor::get("/registrant"))
            .await?;
        Ok(resp.data.unwrap_or_default())
    }

    /// Marks a registrant as checked in. The API answers with a redirect whose
    /// `err` query parameter carries the outcome.
    pub async fn verify(&self, id: &str, ticket_id: &str) -> Result<Verification, Error> {
        let desc = RequestDescriptor::get(format!(
            "/registrant/verify/{}/{}",
            segment(id),
            segment(ticket_id)
        ));
        let resp = match self.client.request(desc).await {
            Ok(resp) => resp,
            Err(err) => return Err(super::into_api_error(err)),
        };
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::MissingRedirect(resp.status()))?;
        parse_verification(location, ticket_id)
    }

    /// Verifies from the URL a scanned entry QR code carries.
    pub async fn verify_url(&self, url: &str) -> Result<Verification, Error> {
        let (id, ticket_id) = parse_verify_url(url)?;
        self.verify(&id, &ticket_id).await
    }
}

fn parse_verification(location: &str, ticket_id: &str) -> Result<Verification, Error> {
    let url = Url::parse(location)
        .or_else(|_| Url::parse("http://localhost").and_then(|base| base.join(location)))
        .map_err(|e| Error::Config(format!("Invalid verification redirect '{}': {}", location, e)))?;
    let ticket_id = url
        .query_pairs()
        .find(|(key, _)| key == "ticket")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| ticket_id.to_string());
    let verified = url
        .query_pairs()
        .any(|(key, value)| key == "err" && value == "0");
    if verified {
        Ok(Verification::Verified { ticket_id })
    } else {
        Ok(Verification::Rejected { ticket_id })
    }
}

/// Extracts `(registrant_id, ticket_id)` from `.../registrant/verify/{id}/{ticket_id}`.
fn parse_verify_url(raw: &str) -> Result<(String, String), Error> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid verification URL '{}': {}", raw, e)))?;
    let segments: Vec<String> = url
        .path_segments()
        .map(|segs| {
            segs.filter(|s| !s.is_empty())
                .map(|s| {
                    urlencoding::decode(s)
                        .map(|d| d.into_owned())
                        .unwrap_or_else(|_| s.to_string())
                })
                .collect()
        })
        .unwrap_or_default();
    segments
        .windows(4)
        .find(|w| w[0] == "registrant" && w[1] == "verify")
        .map(|w| (w[2].clone(), w[3].clone()))
        .ok_or_else(|| Error::Config(format!("'{}' is not a verification URL", raw)))
}
