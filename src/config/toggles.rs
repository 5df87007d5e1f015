use chrono::Duration;

/// How often the announcement is refreshed. Each preset carries its own cron expression
/// and a lookback window slightly wider than the interval to absorb scheduler jitter.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, strum_macros::EnumString, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Cadence {
    /// 18:00 UTC, i.e. 19:00 in Nigeria
    #[default]
    Daily,
    Hourly,
    Bihourly,
}

impl Cadence {
    pub fn default_schedule(self) -> &'static str {
        match self {
            Cadence::Daily => "0 0 18 * * *",
            Cadence::Hourly => "0 0 * * * *",
            Cadence::Bihourly => "0 0 */2 * * *",
        }
    }

    pub fn default_lookback(self) -> Duration {
        match self {
            Cadence::Daily => Duration::hours(24) + Duration::minutes(5),
            Cadence::Hourly => Duration::minutes(65),
            Cadence::Bihourly => Duration::minutes(125),
        }
    }
}

/// What to do when the lookback window contains no new content.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, strum_macros::EnumString, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ComposerPolicy {
    /// Post a re-engagement message instead.
    #[default]
    Always,
    /// Stay silent until something new shows up.
    OnlyNew,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use super::*;

    #[test]
    fn parse_from_env_values() {
        assert_eq!(Cadence::from_str("bihourly").unwrap(), Cadence::Bihourly);
        assert_eq!(Cadence::from_str("hourly").unwrap(), Cadence::Hourly);
        assert_eq!(ComposerPolicy::from_str("only_new").unwrap(), ComposerPolicy::OnlyNew);
        assert!(ComposerPolicy::from_str("sometimes").is_err());
    }

    #[test]
    fn lookback_is_wider_than_cadence() {
        assert_eq!(Cadence::Hourly.default_lookback(), Duration::minutes(65));
        assert!(Cadence::Bihourly.default_lookback() > Duration::hours(2));
        assert!(Cadence::Daily.default_lookback() > Duration::days(1));
    }
}
