use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::domain::{ContentPage, ContentRecord};
use crate::repo::{ContentStore, PAGE_LIMIT};
use crate::repository;

repository!(Videos,
    pub async fn find_created_after(&self, window_start: DateTime<Utc>) -> anyhow::Result<Vec<ContentRecord>> {
        sqlx::query_as::<_, ContentRecord>(
            "SELECT id::text AS id, title, created_at FROM Videos
                WHERE created_at > $1
                ORDER BY created_at DESC
                LIMIT $2")
            .bind(window_start)
            .bind(i64::from(PAGE_LIMIT))
            .fetch_all(&self.pool)
            .await
            .map_err(Into::into)
    }
,
    pub async fn count_created_after(&self, window_start: DateTime<Utc>) -> anyhow::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT count(*) FROM Videos WHERE created_at > $1")
            .bind(window_start)
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }
);

#[async_trait]
impl ContentStore for Videos {
    async fn find_records_since(&self, window_start: DateTime<Utc>) -> anyhow::Result<ContentPage> {
        let records = self.find_created_after(window_start).await?;
        if records.len() < usize::from(PAGE_LIMIT) {
            return Ok(records.into())
        }
        let total = self.count_created_after(window_start).await?;
        Ok(ContentPage::new(records, usize::try_from(total)?))
    }
}
