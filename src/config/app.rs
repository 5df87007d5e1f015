use anyhow::anyhow;
use reqwest::Url;
use teloxide::types::{ChatId, Recipient};
use crate::config::env::*;
use crate::config::AnnouncementsConfig;

const DEFAULT_BRAND_NAME: &str = "Afrowrld";
const DEFAULT_APPWRITE_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Built once at startup and shared read-only by the scheduler, the handlers and the HTTP server.
#[derive(Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub bot_username: Option<String>,
    pub web_app_url: Url,
    pub web_app_short_name: String,
    pub channel: Recipient,
    pub brand: String,
    pub http_port: u16,
    pub announcements: AnnouncementsConfig,
    pub store: StoreConfig,
}

#[derive(Clone, Debug)]
pub enum StoreConfig {
    Appwrite(AppwriteConfig),
    Postgres(DatabaseConfig),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, strum_macros::EnumString, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Appwrite,
    Postgres,
}

#[derive(Clone, Debug)]
pub struct AppwriteConfig {
    pub endpoint: Url,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub videos_collection: String,
    pub state_collection: String,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Url,
    pub max_connections: u32
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let channel_id: String = get_env_mandatory_value("CHANNEL_ID")?;
        Ok(Self {
            bot_token: get_env_mandatory_value("BOT_TOKEN")?,
            bot_username: get_optional_env_value("BOT_USERNAME"),
            web_app_url: get_env_mandatory_value("WEB_APP_URL")?,
            web_app_short_name: get_env_mandatory_value("WEB_APP_SHORT_NAME")?,
            channel: parse_channel(&channel_id)?,
            brand: get_env_value_or_default("BRAND_NAME", DEFAULT_BRAND_NAME.to_owned()),
            http_port: get_env_value_or_default("PORT", 3000),
            announcements: AnnouncementsConfig::from_env()?,
            store: StoreConfig::from_env()?,
        })
    }
}

impl StoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = match get_env_value_or_default("STORE_BACKEND", StoreBackend::default()) {
            StoreBackend::Appwrite => Self::Appwrite(AppwriteConfig::from_env()?),
            StoreBackend::Postgres => Self::Postgres(DatabaseConfig::from_env()?),
        };
        Ok(config)
    }
}

impl AppwriteConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let default_endpoint = DEFAULT_APPWRITE_ENDPOINT.parse()?;
        Ok(Self {
            endpoint: get_env_value_or_default("APPWRITE_ENDPOINT", default_endpoint),
            project_id: get_env_mandatory_value("APPWRITE_PROJECT_ID")?,
            api_key: get_env_mandatory_value("APPWRITE_API_KEY")?,
            database_id: get_env_mandatory_value("APPWRITE_DATABASE_ID")?,
            videos_collection: get_env_value_or_default("APPWRITE_VIDEOS_COLLECTION", "videos".to_owned()),
            state_collection: get_env_value_or_default("APPWRITE_STATE_COLLECTION", "config".to_owned()),
        })
    }
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: get_env_mandatory_value("DATABASE_URL")?,
            max_connections: get_env_value_or_default("DATABASE_MAX_CONNECTIONS", 10)
        })
    }
}

/// Accepts either a numeric chat id (`-100…` for channels) or a public `@username`.
pub fn parse_channel(value: &str) -> anyhow::Result<Recipient> {
    let value = value.trim();
    if value.starts_with('@') && value.len() > 1 {
        Ok(Recipient::ChannelUsername(value.to_owned()))
    } else {
        value.parse()
            .map(|id| Recipient::Id(ChatId(id)))
            .map_err(|e| anyhow!("CHANNEL_ID must be a numeric id or an @username, got '{value}': {e}"))
    }
}
