use chrono::{DateTime, Duration, Utc};
use teloxide::types::{MessageId, Recipient};
use tokio::sync::Mutex;
use crate::announcer::{ChannelPublisher, Composer, Retraction};
use crate::domain::{AnnouncementState, CycleError};
use crate::repo::{ContentStore, StateStore};

#[derive(Clone, Debug)]
pub struct CycleSettings {
    pub channel: Recipient,
    pub lookback: Duration,
    pub delete_previous: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Published {
        message_id: MessageId,
        new_records: usize,
        state_saved: bool,
    },
    NothingToAnnounce,
}

/// One pass of "query, compose, retract, publish, remember".
pub struct RefreshCycle<C, S, P> {
    content: C,
    state: S,
    publisher: P,
    composer: Composer,
    settings: CycleSettings,
    serial: Mutex<()>,
}

impl<C, S, P> RefreshCycle<C, S, P>
where
    C: ContentStore,
    S: StateStore,
    P: ChannelPublisher,
{
    pub fn new(content: C, state: S, publisher: P, composer: Composer, settings: CycleSettings) -> Self {
        Self {
            content,
            state,
            publisher,
            composer,
            settings,
            serial: Mutex::new(()),
        }
    }

    /// Runs the cycle for the current moment. Concurrent callers wait for each other.
    pub async fn fire(&self) -> Result<CycleOutcome, CycleError> {
        let _guard = self.serial.lock().await;
        self.run_at(Utc::now()).await
    }

    async fn run_at(&self, now: DateTime<Utc>) -> Result<CycleOutcome, CycleError> {
        let window_start = now - self.settings.lookback;
        let page = self.content.find_records_since(window_start)
            .await
            .map_err(CycleError::store_unavailable)?;
        log::info!("{} new record(s) since {window_start}", page.total);

        let Some(text) = self.composer.compose(&page) else {
            return Ok(CycleOutcome::NothingToAnnounce)
        };

        if self.settings.delete_previous {
            self.retract_previous().await;
        }

        let message_id = self.publisher.publish(&self.settings.channel, &text)
            .await
            .map_err(CycleError::publish_failed)?;
        log::info!("the announcement was published, message id: {}", message_id.0);

        let state_saved = match self.state.write(&AnnouncementState::published(message_id)).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("couldn't save the id of the published message ({}): {e:#}", message_id.0);
                false
            }
        };
        Ok(CycleOutcome::Published {
            message_id,
            new_records: page.total,
            state_saved,
        })
    }

    async fn retract_previous(&self) {
        let previous = match self.state.read().await {
            Ok(AnnouncementState { last_message_id: Some(id) }) => id,
            Ok(_) => {
                log::debug!("there is no previous announcement to delete");
                return
            }
            Err(e) => {
                log::warn!("skipping deletion, couldn't read the announcement state: {e:#}");
                return
            }
        };
        let id = previous.0;
        match self.publisher.retract(&self.settings.channel, previous).await {
            Retraction::Deleted => log::info!("deleted the previous announcement: {id}"),
            Retraction::NotFound => log::info!("skipping deletion of {id}, the message doesn't exist or is too old"),
            Retraction::Skipped(reason) => log::warn!("couldn't delete the previous announcement {id}: {reason}"),
        }
    }
}
