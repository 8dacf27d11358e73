//! Board entities as returned by the Trello REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "desc")]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "shortUrl")]
    pub short_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BoardList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, rename = "idBoard")]
    pub board_id: String,
    #[serde(default)]
    pub pos: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Label {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "desc")]
    pub description: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, rename = "idBoard")]
    pub board_id: String,
    #[serde(default, rename = "idList")]
    pub list_id: String,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default, rename = "idMembers")]
    pub member_ids: Vec<String>,
    #[serde(default, rename = "dateLastActivity")]
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub id: String,
    #[serde(default, rename = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
}

/// Actor embedded in an activity event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityMember {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
}

/// A board action (card created, moved, commented ...).
///
/// `data` is kept as raw JSON because its shape depends on `action_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub action_type: String,
    pub date: DateTime<Utc>,
    #[serde(default, rename = "memberCreator")]
    pub member_creator: Option<ActivityMember>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl ActivityEvent {
    /// Display name of whoever performed the action.
    pub fn actor(&self) -> &str {
        match &self.member_creator {
            Some(m) if !m.full_name.is_empty() => &m.full_name,
            Some(m) if !m.username.is_empty() => &m.username,
            _ => "Someone",
        }
    }
}

/// Everything the narrative generator needs to describe one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: Board,
    pub lists: Vec<BoardList>,
    pub cards: Vec<Card>,
    pub members: Vec<Member>,
    /// Most recent first, at most [`crate::MAX_SNAPSHOT_ACTIVITIES`] entries
    pub activities: Vec<ActivityEvent>,
}
