use crate::error::{BoardApiError, Result};
use crate::oauth;
use crate::source::BoardSource;
use async_trait::async_trait;
use boardpulse_common::{ActivityEvent, Board, BoardList, Card, Member};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

const BOARD_FIELDS: &str = "name,desc,url,shortUrl";
const LIST_FIELDS: &str = "name,closed,idBoard,pos";
const CARD_FIELDS: &str = "name,desc,closed,idBoard,idList,due,labels,idMembers,dateLastActivity";
const MEMBER_FIELDS: &str = "fullName,username";
const ACTIVITY_LIMIT: &str = "50";

/// Application key/secret plus the delegated user token/secret.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TrelloCredentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_secret: String,
}

impl std::fmt::Debug for TrelloCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrelloCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("access_token", &"***")
            .field("access_secret", &"***")
            .finish()
    }
}

/// Trello REST client signing every request with OAuth 1.0a.
#[derive(Clone)]
pub struct TrelloClient {
    credentials: TrelloCredentials,
    base_url: String,
    client: Client,
}

impl TrelloClient {
    pub fn new(
        credentials: TrelloCredentials,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(30)))
            .build()?;

        Ok(Self {
            credentials,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let auth = oauth::authorization_header(&self.credentials, "GET", &url, &params)?;

        tracing::debug!(resource, path = %path, "Calling Trello API");

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .header(AUTHORIZATION, auth)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::error!(
                resource,
                status = %status,
                body = %body,
                "Trello API request failed"
            );
            return Err(BoardApiError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| BoardApiError::DecodeError { resource, source })
    }
}

fn fields(value: &str) -> Vec<(String, String)> {
    vec![("fields".to_string(), value.to_string())]
}

#[async_trait]
impl BoardSource for TrelloClient {
    async fn list_boards(&self) -> Result<Vec<Board>> {
        self.get_json("boards", "/members/me/boards", fields(BOARD_FIELDS))
            .await
    }

    async fn get_board_details(&self, board_id: &str) -> Result<Board> {
        let path = format!("/boards/{}", urlencoding::encode(board_id));
        self.get_json("board", &path, fields(BOARD_FIELDS)).await
    }

    async fn get_lists(&self, board_id: &str) -> Result<Vec<BoardList>> {
        let path = format!("/boards/{}/lists", urlencoding::encode(board_id));
        self.get_json("lists", &path, fields(LIST_FIELDS)).await
    }

    async fn get_cards(&self, board_id: &str) -> Result<Vec<Card>> {
        let path = format!("/boards/{}/cards", urlencoding::encode(board_id));
        self.get_json("cards", &path, fields(CARD_FIELDS)).await
    }

    async fn get_board_members(&self, board_id: &str) -> Result<Vec<Member>> {
        let path = format!("/boards/{}/members", urlencoding::encode(board_id));
        self.get_json("members", &path, fields(MEMBER_FIELDS)).await
    }

    async fn get_board_activity(
        &self,
        board_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityEvent>> {
        let path = format!("/boards/{}/actions", urlencoding::encode(board_id));
        let mut params = vec![("limit".to_string(), ACTIVITY_LIMIT.to_string())];
        if let Some(since) = since {
            params.push((
                "since".to_string(),
                since.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        self.get_json("actions", &path, params).await
    }
}
