use std::str::FromStr;
use anyhow::Context;
use chrono::Duration;
use cron::Schedule;
use crate::config::env::*;
use crate::config::toggles::*;

#[derive(Clone, Debug)]
pub struct AnnouncementsConfig {
    pub cadence: Cadence,
    pub schedule: Schedule,
    pub lookback: Duration,
    pub policy: ComposerPolicy,
    pub delete_previous: bool,
    pub locale: String,
}

impl AnnouncementsConfig {
    pub(super) fn from_env() -> anyhow::Result<Self> {
        let cadence: Cadence = get_env_value_or_default("REFRESH_CADENCE", Cadence::default());
        let schedule_expr = get_optional_env_value("REFRESH_SCHEDULE")
            .unwrap_or_else(|| cadence.default_schedule().to_owned());
        let schedule = Schedule::from_str(&schedule_expr)
            .with_context(|| format!("invalid cron expression in REFRESH_SCHEDULE: {schedule_expr}"))?;
        let lookback = match get_optional_env_value("LOOKBACK_WINDOW_MINUTES") {
            Some(minutes) => {
                let minutes: u32 = minutes.parse()
                    .with_context(|| format!("invalid value of LOOKBACK_WINDOW_MINUTES: {minutes}"))?;
                anyhow::ensure!(minutes > 0, "LOOKBACK_WINDOW_MINUTES must be positive");
                Duration::minutes(minutes.into())
            }
            None => cadence.default_lookback(),
        };
        Ok(Self {
            cadence,
            schedule,
            lookback,
            policy: get_env_value_or_default("ANNOUNCEMENT_POLICY", ComposerPolicy::default()),
            delete_previous: get_env_value_or_default("DELETE_PREVIOUS_ANNOUNCEMENT", true),
            locale: get_env_value_or_default("ANNOUNCEMENT_LOCALE", "en".to_owned()),
        })
    }
}
