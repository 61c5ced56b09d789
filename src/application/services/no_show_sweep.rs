//! Background task that converts overdue slots to no-shows.
//!
//! Runs in a tokio::spawn loop, periodically looking for Scheduled slots
//! whose appointment window has already closed and marking them `NoShow`.

use std::sync::Arc;

use tokio::time::Duration;
use tracing::{info, warn};

use crate::domain::{Clock, DomainResult, RepositoryProvider};
use crate::shared::shutdown::ShutdownSignal;

/// Start the no-show sweep background task.
///
/// Every `check_interval_secs` (default 60) the sweep loads overdue slots
/// via `find_overdue` and transitions each one through the regular
/// `mark_no_show` guard, so a slot that was entered or cancelled in the
/// meantime is left alone.
pub fn start_no_show_sweep(
    repos: Arc<dyn RepositoryProvider>,
    clock: Arc<dyn Clock>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
) {
    tokio::spawn(async move {
        info!(check_interval = check_interval_secs, "No-show sweep started");

        let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = sweep_once(&repos, &clock).await {
                        warn!(error = %e, "No-show sweep error");
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("No-show sweep shutting down");
                    break;
                }
            }
        }

        info!("No-show sweep stopped");
    });
}

/// One sweep pass; public so operators can trigger it out of schedule.
pub async fn sweep_once(
    repos: &Arc<dyn RepositoryProvider>,
    clock: &Arc<dyn Clock>,
) -> DomainResult<usize> {
    let now = clock.now();
    let overdue = repos.slots().find_overdue(now).await?;

    if overdue.is_empty() {
        return Ok(0);
    }

    info!(count = overdue.len(), "Marking overdue slots as no-show");

    let mut converted = 0;
    for mut slot in overdue {
        let expected_version = slot.version;
        if let Err(e) = slot.mark_no_show(now) {
            warn!(slot_id = %slot.id, error = %e, "Slot no longer eligible for no-show");
            continue;
        }
        match repos.slots().update(slot.clone(), expected_version).await {
            Ok(()) => converted += 1,
            // A concurrent writer got there first; the next pass re-evaluates.
            Err(e) => warn!(slot_id = %slot.id, error = %e, "Failed to mark slot no-show"),
        }
    }

    Ok(converted)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    use crate::domain::slot::{GateType, Slot, SlotStatus};
    use crate::domain::FixedClock;
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    async fn seed_slot(
        repos: &InMemoryRepositoryProvider,
        window_offset_minutes: i64,
    ) -> Slot {
        let now = Utc::now();
        let slot = Slot::new(
            "tenant-a",
            "GATE-1",
            GateType::Weighing,
            now + ChronoDuration::minutes(window_offset_minutes - 30),
            now + ChronoDuration::minutes(window_offset_minutes),
            5,
            now,
        )
        .unwrap();
        repos.slots().create(slot.clone()).await.unwrap();
        slot
    }

    #[tokio::test]
    async fn sweep_converts_only_overdue_slots() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let stale = seed_slot(&repos, -10).await;
        let fresh = seed_slot(&repos, 60).await;

        let repos_dyn: Arc<dyn RepositoryProvider> = repos.clone();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(Utc::now()));
        let converted = sweep_once(&repos_dyn, &clock).await.unwrap();
        assert_eq!(converted, 1);

        let stale = repos.slots().find_by_id(stale.id).await.unwrap().unwrap();
        assert_eq!(stale.status, SlotStatus::NoShow);
        let fresh = repos.slots().find_by_id(fresh.id).await.unwrap().unwrap();
        assert_eq!(fresh.status, SlotStatus::Scheduled);
    }

    #[tokio::test]
    async fn sweep_is_a_noop_when_nothing_is_overdue() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        seed_slot(&repos, 60).await;

        let repos_dyn: Arc<dyn RepositoryProvider> = repos;
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(Utc::now()));
        assert_eq!(sweep_once(&repos_dyn, &clock).await.unwrap(), 0);
    }
}
