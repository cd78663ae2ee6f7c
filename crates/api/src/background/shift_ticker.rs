//! Periodic in-progress tick for dashboards.
//!
//! While a shift is `en_curso`, subscribers (live dashboards, presence
//! widgets) want a heartbeat with the minutes worked so far. This task
//! publishes a `shift.in_progress` event per active shift on a fixed
//! interval and runs until its cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fichaje_db::repositories::ShiftRepo;
use fichaje_db::DbPool;
use fichaje_events::{ClockEvent, EventBus};
use tokio_util::sync::CancellationToken;

/// Upper bound on shifts reported per tick.
const MAX_ACTIVE_SHIFTS: i64 = 500;

/// Run the in-progress ticker loop.
pub async fn run(pool: DbPool, bus: Arc<EventBus>, tick: Duration, cancel: CancellationToken) {
    tracing::info!(tick_secs = tick.as_secs(), "Shift ticker started");

    let mut interval = tokio::time::interval(tick);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Shift ticker stopping");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = tick_once(&pool, &bus).await {
                    tracing::error!(error = %e, "Shift ticker cycle failed");
                }
            }
        }
    }
}

/// One cycle: publish a tick per clocked-in shift.
async fn tick_once(pool: &DbPool, bus: &EventBus) -> Result<(), sqlx::Error> {
    let active = ShiftRepo::list_in_progress(pool, MAX_ACTIVE_SHIFTS).await?;
    let now = Utc::now();

    for shift in active {
        // actual_start is set for every en_curso row; a row that disagrees
        // is logged and skipped, not allowed to fail the cycle.
        let Some(started) = shift.actual_start else {
            tracing::warn!(shift_id = shift.id, "en_curso shift without actual_start");
            continue;
        };
        let worked_minutes = (now - started).num_minutes();
        bus.publish(ClockEvent::shift_in_progress(shift.id, worked_minutes));
    }

    Ok(())
}
