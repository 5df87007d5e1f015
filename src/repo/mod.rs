mod videos;
mod announcements;
mod appwrite;

#[cfg(test)]
pub(crate) mod test;

use std::sync::Arc;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use sqlx::postgres::PgQueryResult;
pub use videos::*;
pub use announcements::*;
pub use appwrite::*;
use crate::config::{DatabaseConfig, StoreConfig};
use crate::domain::{AnnouncementState, ContentPage};

/// Upper bound of records fetched per cycle. Volumes are expected to be far below it.
pub const PAGE_LIMIT: u16 = 100;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Records created strictly after `window_start`, newest first, at most [PAGE_LIMIT] of them.
    async fn find_records_since(&self, window_start: DateTime<Utc>) -> anyhow::Result<ContentPage>;
}

#[async_trait]
pub trait StateStore: Send + Sync {
    /// A missing state document yields the empty state.
    async fn read(&self) -> anyhow::Result<AnnouncementState>;
    async fn write(&self, state: &AnnouncementState) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    async fn find_records_since(&self, window_start: DateTime<Utc>) -> anyhow::Result<ContentPage> {
        (**self).find_records_since(window_start).await
    }
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn read(&self) -> anyhow::Result<AnnouncementState> {
        (**self).read().await
    }

    async fn write(&self, state: &AnnouncementState) -> anyhow::Result<()> {
        (**self).write(state).await
    }
}

/// Both stores live in the same backend, chosen at startup.
#[derive(Clone)]
pub enum Repositories {
    Appwrite(AppwriteClient),
    Postgres {
        videos: Videos,
        announcements: Announcements,
    },
}

impl Repositories {
    pub async fn connect(config: &StoreConfig) -> anyhow::Result<Self> {
        let repos = match config {
            StoreConfig::Appwrite(config) => {
                log::info!("Store: Appwrite at {}", config.endpoint);
                Self::Appwrite(AppwriteClient::new(config)?)
            }
            StoreConfig::Postgres(config) => {
                log::info!("Store: PostgreSQL");
                let pool = establish_database_connection(config).await?;
                Self::Postgres {
                    videos: Videos::new(pool.clone()),
                    announcements: Announcements::new(pool),
                }
            }
        };
        Ok(repos)
    }
}

#[async_trait]
impl ContentStore for Repositories {
    async fn find_records_since(&self, window_start: DateTime<Utc>) -> anyhow::Result<ContentPage> {
        match self {
            Self::Appwrite(client) => client.find_records_since(window_start).await,
            Self::Postgres { videos, .. } => videos.find_records_since(window_start).await,
        }
    }
}

#[async_trait]
impl StateStore for Repositories {
    async fn read(&self) -> anyhow::Result<AnnouncementState> {
        match self {
            Self::Appwrite(client) => client.read().await,
            Self::Postgres { announcements, .. } => announcements.read().await,
        }
    }

    async fn write(&self, state: &AnnouncementState) -> anyhow::Result<()> {
        match self {
            Self::Appwrite(client) => client.write(state).await,
            Self::Postgres { announcements, .. } => announcements.write(state).await,
        }
    }
}


pub async fn establish_database_connection(config: &DatabaseConfig) -> Result<Pool<Postgres>, anyhow::Error> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.url.as_str()).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}


#[macro_export]
macro_rules! repository {
    ($name:ident $(, $methods:item)*) => {
        #[derive(Clone)]
        pub struct $name {
            pool: sqlx::Pool<sqlx::Postgres>,
        }

        impl $name {
            pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
                Self { pool }
            }

            $($methods)*
        }
    };
}

fn ensure_only_one_row_updated(res: PgQueryResult) -> Result<PgQueryResult, anyhow::Error> {
    match res.rows_affected() {
        1 => Ok(res),
        x => Err(anyhow!("not only one row was updated but {x}"))
    }
}
