use std::sync::Arc;
use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::task::JoinHandle;
use crate::announcer::{ChannelPublisher, CycleOutcome, RefreshCycle};
use crate::domain::CycleError;
use crate::metrics;
use crate::repo::{ContentStore, StateStore};

/// Fires the refresh cycle on a wall-clock cron schedule. Every firing runs in its own
/// task so a slow cycle never delays the next tick; the cycle itself serializes them.
pub struct Scheduler<C, S, P> {
    schedule: Schedule,
    cycle: Arc<RefreshCycle<C, S, P>>,
}

impl<C, S, P> Scheduler<C, S, P>
where
    C: ContentStore + 'static,
    S: StateStore + 'static,
    P: ChannelPublisher + 'static,
{
    pub fn new(schedule: Schedule, cycle: RefreshCycle<C, S, P>) -> Self {
        Self {
            schedule,
            cycle: Arc::new(cycle),
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut last_firing = Utc::now();
        while let Some(next) = next_firing(&self.schedule, last_firing) {
            log::info!("the next announcement refresh is scheduled at {next}");
            let delay = (next - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(delay).await;
            last_firing = next;

            let cycle = Arc::clone(&self.cycle);
            tokio::spawn(async move {
                log::info!("starting the announcement refresh cycle...");
                report(cycle.fire().await);
            });
        }
        log::error!("the refresh schedule has no upcoming firings, announcements are stopped");
    }
}

pub fn next_firing(schedule: &Schedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&after).next()
}

fn report(result: Result<CycleOutcome, CycleError>) {
    match result {
        Ok(CycleOutcome::Published { state_saved: true, .. }) => {
            metrics::REFRESH_CYCLE_COUNTERS.published.inc();
            log::info!("the announcement refresh cycle has finished");
        }
        Ok(CycleOutcome::Published { state_saved: false, message_id, .. }) => {
            metrics::REFRESH_CYCLE_COUNTERS.published.inc();
            log::warn!("the announcement {} was published but won't be deleted next time", message_id.0);
        }
        Ok(CycleOutcome::NothingToAnnounce) => {
            metrics::REFRESH_CYCLE_COUNTERS.idle.inc();
            log::info!("nothing new to announce");
        }
        Err(e) => {
            metrics::REFRESH_CYCLE_COUNTERS.aborted.inc();
            log::error!("the announcement refresh cycle was aborted: {e}");
        }
    }
}
