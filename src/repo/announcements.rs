use async_trait::async_trait;
use crate::domain::{AnnouncementState, ANNOUNCEMENT_STATE_KEY};
use crate::repo::{ensure_only_one_row_updated, StateStore};
use crate::repository;

#[derive(sqlx::FromRow)]
struct AnnouncementStateEntity {
    last_message_id: Option<i32>,
}

impl From<AnnouncementStateEntity> for AnnouncementState {
    fn from(value: AnnouncementStateEntity) -> Self {
        value.last_message_id.into()
    }
}

repository!(Announcements,
    pub async fn get(&self) -> anyhow::Result<Option<AnnouncementState>> {
        sqlx::query_as::<_, AnnouncementStateEntity>(
            "SELECT last_message_id FROM Announcement_State WHERE id = $1")
            .bind(ANNOUNCEMENT_STATE_KEY)
            .fetch_optional(&self.pool)
            .await
            .map(|opt| opt.map(Into::into))
            .map_err(Into::into)
    }
,
    pub async fn upsert(&self, state: &AnnouncementState) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO Announcement_State (id, last_message_id) VALUES ($1, $2)
                ON CONFLICT (id) DO UPDATE SET last_message_id = excluded.last_message_id, updated_at = now()")
            .bind(ANNOUNCEMENT_STATE_KEY)
            .bind(state.last_message_id.map(|id| id.0))
            .execute(&self.pool)
            .await
            .map_err(Into::into)
            .and_then(ensure_only_one_row_updated)
            .map(|_| ())
    }
);

#[async_trait]
impl StateStore for Announcements {
    async fn read(&self) -> anyhow::Result<AnnouncementState> {
        Ok(self.get().await?.unwrap_or_default())
    }

    async fn write(&self, state: &AnnouncementState) -> anyhow::Result<()> {
        self.upsert(state).await
    }
}
