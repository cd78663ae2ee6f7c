//! Shift clocking state machine.
//!
//! [`ClockEngine::apply`] turns one client action into one atomic, audited
//! transition. Serialization point is the shift row's `version` column:
//! every mutation is a compare-and-swap on `(id, version, state_id)`, so two
//! racing calls produce exactly one committed transition and one typed
//! failure. Nothing here blocks on row locks.
//!
//! Events are built here but published by the caller *after* the transition
//! has committed; a publish problem can never unwind shift state.

use fichaje_core::breaks::{self, BreakKind};
use fichaje_core::error::CoreError;
use fichaje_core::geo::GeoStamp;
use fichaje_core::shift::{self, ClockAction, ShiftState};
use fichaje_core::types::{DbId, Timestamp};
use fichaje_db::models::break_entry::BreakEntry;
use fichaje_db::models::shift::Shift;
use fichaje_db::repositories::{BreakRepo, ShiftRepo};
use fichaje_events::ClockEvent;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Result of a successful clock action.
#[derive(Debug)]
pub struct ClockOutcome {
    /// The shift row after the transition.
    pub shift: Shift,
    /// The state the shift is now in.
    pub new_state: ShiftState,
    /// The domain event to publish once the caller is ready.
    pub event: ClockEvent,
}

/// Enforces the shift lifecycle and the audit-trail capture.
pub struct ClockEngine;

impl ClockEngine {
    /// Apply one clocking action to a shift.
    ///
    /// Checks run in a fixed order: geolocation precondition, shift
    /// existence, transition validity, break policy, then the guarded
    /// mutation. `now` is passed in explicitly so callers (and tests)
    /// control the clock.
    pub async fn apply(
        pool: &PgPool,
        shift_id: DbId,
        action: ClockAction,
        actor_id: DbId,
        geo: &GeoStamp,
        next_shift_id: Option<DbId>,
        now: Timestamp,
    ) -> AppResult<ClockOutcome> {
        // Precondition, not a rollback: nothing is read or written until the
        // audit payload is known to be complete.
        geo.validate()?;

        let shift = ShiftRepo::find_by_id(pool, shift_id)
            .await?
            .ok_or(CoreError::ShiftNotFound { id: shift_id })?;
        let current = shift.state()?;

        shift::validate_transition(current, action)?;

        if let Some(next_id) = next_shift_id {
            if ShiftRepo::find_by_id(pool, next_id).await?.is_none() {
                return Err(CoreError::Validation(format!(
                    "next shift {next_id} does not exist"
                ))
                .into());
            }
        }

        let outcome = match action {
            ClockAction::Iniciar => Self::start(pool, &shift, geo, now).await?,
            ClockAction::DescansoAdicional => {
                Self::open_break(pool, &shift, BreakKind::Adicional, geo, now).await?
            }
            ClockAction::DescansoObligatorio => {
                Self::open_break(pool, &shift, BreakKind::Obligatorio, geo, now).await?
            }
            ClockAction::Reanudar => Self::resume(pool, &shift, current, geo, now).await?,
            ClockAction::Finalizar => {
                Self::finish(pool, &shift, geo, now, next_shift_id).await?
            }
        };

        let ClockOutcome {
            shift,
            new_state,
            event,
        } = outcome;

        tracing::info!(
            shift_id,
            actor_id,
            action = %action,
            from = %current,
            to = %new_state,
            "Shift transition applied"
        );

        Ok(ClockOutcome {
            shift,
            new_state,
            event: event.with_actor(actor_id),
        })
    }

    /// `iniciar`: record the entry stamp and move to `en_curso`.
    async fn start(
        pool: &PgPool,
        shift: &Shift,
        geo: &GeoStamp,
        now: Timestamp,
    ) -> AppResult<ClockOutcome> {
        let updated = ShiftRepo::start(pool, shift.id, shift.version, now, geo).await?;
        match updated {
            Some(row) => Ok(ClockOutcome {
                event: ClockEvent::shift_started(row.id),
                new_state: ShiftState::EnCurso,
                shift: row,
            }),
            None => Err(Self::classify_loser(pool, shift.id, ClockAction::Iniciar).await),
        }
    }

    /// `descanso_adicional` / `descanso_obligatorio`: open a ledger entry
    /// and move to the matching break state, in one transaction.
    async fn open_break(
        pool: &PgPool,
        shift: &Shift,
        kind: BreakKind,
        geo: &GeoStamp,
        now: Timestamp,
    ) -> AppResult<ClockOutcome> {
        let target = match kind {
            BreakKind::Adicional => ShiftState::EnPausa,
            BreakKind::Obligatorio => ShiftState::DescansoObligatorio,
        };

        if kind == BreakKind::Obligatorio {
            let ledger = Self::intervals(pool, shift.id).await?;
            if breaks::mandatory_taken_on(&ledger, now.date_naive()) {
                return Err(CoreError::MandatoryBreakAlreadyTaken {
                    shift_id: shift.id,
                    date: now.date_naive(),
                }
                .into());
            }
        }

        let mut tx = pool.begin().await?;

        let updated =
            ShiftRepo::set_state(&mut *tx, shift.id, shift.version, ShiftState::EnCurso, target)
                .await?;
        let Some(row) = updated else {
            // Implicit rollback on drop; no break row was written yet.
            drop(tx);
            let action = match kind {
                BreakKind::Adicional => ClockAction::DescansoAdicional,
                BreakKind::Obligatorio => ClockAction::DescansoObligatorio,
            };
            return Err(Self::classify_loser(pool, shift.id, action).await);
        };

        BreakRepo::open(&mut *tx, shift.id, kind, now, geo).await?;
        tx.commit().await?;

        Ok(ClockOutcome {
            event: ClockEvent::shift_paused(row.id, kind),
            new_state: target,
            shift: row,
        })
    }

    /// `reanudar`: close the open ledger entry and return to `en_curso`.
    async fn resume(
        pool: &PgPool,
        shift: &Shift,
        current: ShiftState,
        geo: &GeoStamp,
        now: Timestamp,
    ) -> AppResult<ClockOutcome> {
        // A break state without an open ledger row means the ledger and the
        // shift disagree; surface it rather than guessing.
        let open: BreakEntry = BreakRepo::find_open(pool, shift.id)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "shift {} is in state '{current}' but has no open break",
                    shift.id
                ))
            })?;
        let kind = open.kind()?;

        let mut tx = pool.begin().await?;

        let updated = ShiftRepo::set_state(
            &mut *tx,
            shift.id,
            shift.version,
            current,
            ShiftState::EnCurso,
        )
        .await?;
        let Some(row) = updated else {
            drop(tx);
            return Err(Self::classify_loser(pool, shift.id, ClockAction::Reanudar).await);
        };

        let closed = BreakRepo::close(&mut *tx, open.id, now, geo)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!("break {} was already closed", open.id))
            })?;
        tx.commit().await?;

        let minutes = breaks::duration_minutes(&closed.interval()?);

        Ok(ClockOutcome {
            event: ClockEvent::shift_resumed(row.id, kind, minutes),
            new_state: ShiftState::EnCurso,
            shift: row,
        })
    }

    /// `finalizar`: record the exit stamp and move to the terminal state.
    async fn finish(
        pool: &PgPool,
        shift: &Shift,
        geo: &GeoStamp,
        now: Timestamp,
        next_shift_id: Option<DbId>,
    ) -> AppResult<ClockOutcome> {
        let updated = ShiftRepo::finish(pool, shift.id, shift.version, now, geo).await?;
        match updated {
            Some(row) => Ok(ClockOutcome {
                event: ClockEvent::shift_finished(row.id, next_shift_id),
                new_state: ShiftState::Finalizado,
                shift: row,
            }),
            None => Err(Self::classify_loser(pool, shift.id, ClockAction::Finalizar).await),
        }
    }

    /// Decide what a failed compare-and-swap means.
    ///
    /// Re-reads the row: gone means not found; a state the action is no
    /// longer valid from means the winner's transition made this action
    /// stale; otherwise it is a plain version race the caller may retry.
    async fn classify_loser(pool: &PgPool, shift_id: DbId, action: ClockAction) -> AppError {
        match ShiftRepo::find_by_id(pool, shift_id).await {
            Ok(Some(row)) => match row.state() {
                Ok(state) => {
                    if shift::next_state(state, action).is_none() {
                        CoreError::InvalidTransition {
                            from: state,
                            action,
                        }
                        .into()
                    } else {
                        CoreError::ConcurrentModification {
                            shift_id,
                            current_state: state,
                        }
                        .into()
                    }
                }
                Err(e) => e.into(),
            },
            Ok(None) => CoreError::ShiftNotFound { id: shift_id }.into(),
            Err(e) => e.into(),
        }
    }

    /// Load the shift's ledger as policy-layer intervals.
    async fn intervals(
        pool: &PgPool,
        shift_id: DbId,
    ) -> AppResult<Vec<fichaje_core::breaks::BreakInterval>> {
        let entries = BreakRepo::list_for_shift(pool, shift_id).await?;
        let mut intervals = Vec::with_capacity(entries.len());
        for entry in &entries {
            intervals.push(entry.interval()?);
        }
        Ok(intervals)
    }
}
