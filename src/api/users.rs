use crate::client::SessionClient;
use crate::errors::Error;
use crate::request::{FormPart, RequestDescriptor};
use crate::transport::Transport;
use crate::types::{User, UserUpdate};

use super::segment;

pub struct UserApi<'a, T: Transport> {
    client: &'a SessionClient<T>,
}

impl<'a, T: Transport> UserApi<'a, T> {
    pub(crate) fn new(client: &'a SessionClient<T>) -> Self {
        Self { client }
    }

    pub async fn me(&self) -> Result<User, Error> {
        let resp = self
            .client
            .fetch::<User>(RequestDescriptor::get("/user/me"))
            .await?;
        Ok(resp.data)
    }

    pub async fn update_me(&self, update: UserUpdate) -> Result<String, Error> {
        let mut parts = vec![
            FormPart::text("name", update.name),
            FormPart::text("username", update.username),
        ];
        if let Some(picture) = update.picture {
            parts.push(FormPart::file(
                "picture",
                picture.file_name,
                picture.mime,
                picture.bytes,
            ));
        }
        let resp = self
            .client
            .fetch::<serde_json::Value>(RequestDescriptor::patch("/user/me").multipart(parts))
            .await?;
        Ok(resp.meta.message)
    }

    pub async fn public_profile(&self, username: &str) -> Result<User, Error> {
        let path = format!("/public/user/{}", segment(username));
        Ok(self.client.fetch::<User>(RequestDescriptor::get(path)).await?.data)
    }

    /// Profile of the organizer who owns `ticket_id`.
    pub async fn owner_of_ticket(&self, ticket_id: &str) -> Result<User, Error> {
        let path = format!("/public/user/id/{}", segment(ticket_id));
        Ok(self.client.fetch::<User>(RequestDescriptor::get(path)).await?.data)
    }
}
