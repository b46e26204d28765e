use crate::client::SessionClient;
use crate::errors::Error;
use crate::request::{FormPart, RequestDescriptor};
use crate::transport::Transport;
use crate::types::{PublicTicket, Ticket, TicketMutation};

use super::segment;

pub struct TicketApi<'a, T: Transport> {
    client: &'a SessionClient<T>,
}

fn mutation_parts(mutation: TicketMutation) -> Vec<FormPart> {
    let mut parts = vec![
        FormPart::text("title", mutation.title),
        FormPart::text("description", mutation.description),
        FormPart::text("mode", mutation.mode.to_string()),
        FormPart::text("quota", mutation.quota.to_string()),
    ];
    if let Some(image) = mutation.image {
        parts.push(FormPart::file(
            "image",
            image.file_name,
            image.mime,
            image.bytes,
        ));
    }
    parts
}

impl<'a, T: Transport> TicketApi<'a, T> {
    pub(crate) fn new(client: &'a SessionClient<T>) -> Self {
        Self { client }
    }

    /// Tickets owned by the signed-in organizer.
    pub async fn list(&self) -> Result<Vec<Ticket>, Error> {
        let resp = self
            .client
            .fetch::<Option<Vec<Ticket>>>(RequestDescriptor::get("/ticket"))
            .await?;
        Ok(resp.data.unwrap_or_default())
    }

    pub async fn get(&self, id: &str) -> Result<Ticket, Error> {
        let path = format!("/ticket/{}", segment(id));
        Ok(self.client.fetch::<Ticket>(RequestDescriptor::get(path)).await?.data)
    }

    pub async fn create(&self, mutation: TicketMutation) -> Result<String, Error> {
        let desc = RequestDescriptor::post("/ticket").multipart(mutation_parts(mutation));
        Ok(self.client.fetch::<serde_json::Value>(desc).await?.meta.message)
    }

    pub async fn update(&self, id: &str, mutation: TicketMutation) -> Result<String, Error> {
        let desc = RequestDescriptor::patch(format!("/ticket/{}", segment(id)))
            .multipart(mutation_parts(mutation));
        Ok(self.client.fetch::<serde_json::Value>(desc).await?.meta.message)
    }

    pub async fn delete(&self, id: &str) -> Result<String, Error> {
        let desc = RequestDescriptor::delete(format!("/ticket/{}", segment(id)));
        Ok(self.client.fetch::<serde_json::Value>(desc).await?.meta.message)
    }

    pub async fn public_by_username(&self, username: &str) -> Result<Vec<PublicTicket>, Error> {
        let path = format!("/public/ticket/{}", segment(username));
        let resp = self
            .client
            .fetch::<Option<Vec<PublicTicket>>>(RequestDescriptor::get(path))
            .await?;
        Ok(resp.data.unwrap_or_default())
    }

    pub async fn public_by_id(&self, id: &str) -> Result<PublicTicket, Error> {
        let path = format!("/public/ticket/id/{}", segment(id));
        Ok(self
            .client
            .fetch::<PublicTicket>(RequestDescriptor::get(path))
            .await?
            .data)
    }
}
