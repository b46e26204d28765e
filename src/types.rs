use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// `mode == true` marks a private ticket: registering needs a state code.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub mode: bool,
    pub registered_count: u32,
    pub quota: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl Ticket {
    pub fn remaining(&self) -> u32 {
        self.quota.saturating_sub(self.registered_count)
    }

    pub fn is_private(&self) -> bool {
        self.mode
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PublicTicket {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct TicketMutation {
    pub title: String,
    pub description: String,
    pub mode: bool,
    pub quota: u32,
    pub image: Option<ImageUpload>,
}

#[derive(Clone, Debug)]
pub struct UserUpdate {
    pub name: String,
    pub username: String,
    pub picture: Option<ImageUpload>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RegistrantByTicket {
    pub username: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub is_verified: bool,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PaginatedRegistrants {
    #[serde(default)]
    pub data: Vec<RegistrantByTicket>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// One of the caller's registrations; `url` is what the entry QR code encodes.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RegistrantByUser {
    pub id: String,
    #[serde(default)]
    pub ticket_id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub is_verified: bool,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrantQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
}

impl Default for RegistrantQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    Verified { ticket_id: String },
    Rejected { ticket_id: String },
}
