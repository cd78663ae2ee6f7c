//! The sweep itself: paged scan, per-shift assessment, event emission.

use chrono::{NaiveDate, TimeDelta};
use fichaje_core::delay::{self, DelaySeverity, DelayThresholds};
use fichaje_core::types::Timestamp;
use fichaje_db::models::shift::Shift;
use fichaje_db::repositories::ShiftRepo;
use fichaje_db::DbPool;
use fichaje_events::{ClockEvent, EventBus};

use crate::config::SweepConfig;

/// Inclusive calendar-day range a sweep covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SweepRange {
    /// Both days default to the reference timestamp's date; the reference
    /// is passed in by the caller, never read from a global clock.
    pub fn for_reference(reference: Timestamp) -> Self {
        let day = reference.date_naive();
        Self {
            start: day,
            end: day,
        }
    }

    /// Half-open UTC timestamp bounds `[start 00:00, end+1d 00:00)`.
    pub fn bounds(&self) -> (Timestamp, Timestamp) {
        let lo = self.start.and_time(chrono::NaiveTime::MIN).and_utc();
        let hi = (self.end + TimeDelta::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        (lo, hi)
    }
}

/// Counters reported by one sweep run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    /// Shifts examined.
    pub processed: u64,
    /// `delay.detected` events emitted.
    pub delayed: u64,
    /// `absence.overrun` events emitted.
    pub overruns: u64,
    /// Shifts on time (or within the minor threshold).
    pub skipped: u64,
    /// Shifts that could not be assessed (logged, never abort the batch).
    pub failed: u64,
}

/// Assess one shift against the thresholds.
///
/// Pure; errors are per-item and describe what was missing.
pub fn assess(shift: &Shift, thresholds: &DelayThresholds) -> Result<(i64, DelaySeverity), String> {
    let planned = shift
        .planned_start
        .ok_or_else(|| format!("shift {} has no planned start", shift.id))?;
    let actual = shift
        .actual_start
        .ok_or_else(|| format!("shift {} has no recorded entry", shift.id))?;

    let minutes = delay::delay_minutes(planned, actual);
    Ok((minutes, delay::classify(minutes, thresholds)))
}

/// Run one sweep over `range`, emitting events on `bus`.
///
/// Only database/page-level errors abort the run; a failure assessing one
/// shift is logged and counted. The sweeper holds no locks and writes no
/// shift state, so interrupting between pages is harmless.
pub async fn run_sweep(
    pool: &DbPool,
    bus: &EventBus,
    config: &SweepConfig,
    range: &SweepRange,
) -> Result<SweepSummary, sqlx::Error> {
    let (lo, hi) = range.bounds();
    let mut summary = SweepSummary::default();
    let mut offset: i64 = 0;

    loop {
        let page =
            ShiftRepo::list_for_delay_scan(pool, lo, hi, config.batch_size, offset).await?;
        let page_len = page.len();

        for shift in &page {
            summary.processed += 1;
            match assess(shift, &config.thresholds) {
                Ok((minutes, DelaySeverity::Delay)) => {
                    bus.publish(ClockEvent::delay_detected(shift.id, minutes));
                    summary.delayed += 1;
                }
                Ok((minutes, DelaySeverity::Overrun)) => {
                    // An overrun is also a delay; dashboards listening only
                    // for delays still see it.
                    bus.publish(ClockEvent::delay_detected(shift.id, minutes));
                    bus.publish(ClockEvent::absence_overrun(shift.id, minutes));
                    summary.delayed += 1;
                    summary.overruns += 1;
                }
                Ok((_, DelaySeverity::None)) => {
                    summary.skipped += 1;
                }
                Err(reason) => {
                    tracing::warn!(shift_id = shift.id, reason, "Skipping unassessable shift");
                    summary.failed += 1;
                }
            }
        }

        if page_len < config.batch_size as usize {
            break;
        }
        offset += config.batch_size;
    }

    tracing::info!(
        start = %range.start,
        end = %range.end,
        processed = summary.processed,
        delayed = summary.delayed,
        overruns = summary.overruns,
        skipped = summary.skipped,
        failed = summary.failed,
        "Delay sweep finished"
    );

    Ok(summary)
}
