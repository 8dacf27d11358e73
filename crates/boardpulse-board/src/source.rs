use crate::error::Result;
use async_trait::async_trait;
use boardpulse_common::{
    ActivityEvent, Board, BoardList, BoardSnapshot, Card, Member, MAX_SNAPSHOT_ACTIVITIES,
};
use chrono::{DateTime, Utc};

/// Read-only access to a user's task boards.
#[async_trait]
pub trait BoardSource: Send + Sync {
    /// Boards visible to the authenticated user.
    async fn list_boards(&self) -> Result<Vec<Board>>;

    async fn get_board_details(&self, board_id: &str) -> Result<Board>;

    async fn get_lists(&self, board_id: &str) -> Result<Vec<BoardList>>;

    async fn get_cards(&self, board_id: &str) -> Result<Vec<Card>>;

    async fn get_board_members(&self, board_id: &str) -> Result<Vec<Member>>;

    /// Recent activity, most recent first. `since = None` means no lower bound.
    async fn get_board_activity(
        &self,
        board_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityEvent>>;

    /// Gather everything needed to describe one board.
    ///
    /// Board, list, card and member failures are returned to the caller.
    /// An activity failure is logged and replaced by an empty list.
    async fn get_board_snapshot(
        &self,
        board_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<BoardSnapshot> {
        let board = self.get_board_details(board_id).await?;
        let lists = self.get_lists(board_id).await?;
        let cards = self.get_cards(board_id).await?;
        let members = self.get_board_members(board_id).await?;

        let mut activities = match self.get_board_activity(board_id, since).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(
                    board_id = %board_id,
                    error = %e,
                    "Failed to fetch board activity, continuing without it"
                );
                Vec::new()
            }
        };
        activities.truncate(MAX_SNAPSHOT_ACTIVITIES);

        Ok(BoardSnapshot {
            board,
            lists,
            cards,
            members,
            activities,
        })
    }
}
