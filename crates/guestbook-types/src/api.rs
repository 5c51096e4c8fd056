use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

// -- Accounts --

#[derive(Debug, Deserialize)]
pub struct RegisterQuery {
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ActivateQuery {
    pub token: String,
}

/// Body for every endpoint that only reports an outcome.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self { status: status.into() }
    }
}

// -- Messages --

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page_size")]
    pub num: u32,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search_term: String,
    #[serde(default = "default_page_size")]
    pub num: u32,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub message_id: i64,
}

/// Form body for creating or editing a message.
#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub message: String,
    #[serde(default, deserialize_with = "checkbox_bool")]
    pub private: bool,
}

/// Accepts the spellings browsers and form libraries send for a boolean
/// field: `true/false`, `1/0`, `on/off`, `yes/no`, `t/f`, `y/n`, any case.
fn checkbox_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct CheckboxVisitor;

    impl de::Visitor<'_> for CheckboxVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a boolean such as true, 1, on or yes")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" | "t" | "y" => Ok(true),
                "false" | "0" | "off" | "no" | "f" | "n" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }

    deserializer.deserialize_any(CheckboxVisitor)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMessageResponse {
    pub message_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: i64,
    pub message: String,
    pub private: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub message: String,
    pub private: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageDetail {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PopularMessage {
    pub id: i64,
    pub message: String,
    pub upvotes: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PopularResponse {
    pub messages: Vec<PopularMessage>,
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
