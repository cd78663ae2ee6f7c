//! Integration tests for the shift repository layer.
//!
//! Exercises the repositories against a real database:
//! - Shift creation defaults and lookup
//! - Version/state compare-and-swap guards
//! - The single-open-break unique index
//! - Delay-scan filtering (entry recorded, absence notes, date window)

use chrono::{TimeZone, Utc};
use fichaje_core::breaks::BreakKind;
use fichaje_core::geo::GeoStamp;
use fichaje_core::shift::ShiftState;
use fichaje_core::types::Timestamp;
use fichaje_db::models::absence_note::CreateAbsenceNote;
use fichaje_db::models::shift::CreateShift;
use fichaje_db::repositories::{AbsenceNoteRepo, BreakRepo, EventRepo, ShiftRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(h: u32, m: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
}

fn new_shift(planned_start: Option<Timestamp>) -> CreateShift {
    CreateShift {
        contract_id: 42,
        planned_start,
        planned_end: planned_start.map(|t| t + chrono::TimeDelta::hours(8)),
        leave_request_id: None,
    }
}

fn stamp() -> GeoStamp {
    GeoStamp {
        latitude: 40.4168,
        longitude: -3.7038,
        ip: "203.0.113.9".into(),
        user_agent: "Mozilla/5.0".into(),
    }
}

// ---------------------------------------------------------------------------
// Test: creation defaults
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_shift_defaults(pool: PgPool) {
    let shift = ShiftRepo::create(&pool, &new_shift(Some(at(9, 0))))
        .await
        .unwrap();

    assert_eq!(shift.state().unwrap(), ShiftState::SinIniciar);
    assert_eq!(shift.version, 0);
    assert!(shift.actual_start.is_none());
    assert!(shift.entry_ip.is_none());

    let found = ShiftRepo::find_by_id(&pool, shift.id).await.unwrap();
    assert_eq!(found.unwrap().id, shift.id);

    let missing = ShiftRepo::find_by_id(&pool, shift.id + 999).await.unwrap();
    assert!(missing.is_none());
}

// ---------------------------------------------------------------------------
// Test: start records the entry stamp and bumps the version
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_start_records_entry_stamp(pool: PgPool) {
    let shift = ShiftRepo::create(&pool, &new_shift(Some(at(9, 0))))
        .await
        .unwrap();

    let started = ShiftRepo::start(&pool, shift.id, shift.version, at(9, 5), &stamp())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(started.state().unwrap(), ShiftState::EnCurso);
    assert_eq!(started.version, shift.version + 1);
    assert_eq!(started.actual_start, Some(at(9, 5)));
    assert_eq!(started.entry_ip.as_deref(), Some("203.0.113.9"));
    assert!(started.actual_end.is_none());
}

// ---------------------------------------------------------------------------
// Test: stale version loses the compare-and-swap
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_stale_version_loses_cas(pool: PgPool) {
    let shift = ShiftRepo::create(&pool, &new_shift(Some(at(9, 0))))
        .await
        .unwrap();

    let won = ShiftRepo::start(&pool, shift.id, shift.version, at(9, 0), &stamp())
        .await
        .unwrap();
    assert!(won.is_some());

    // Second attempt with the original version: zero rows.
    let lost = ShiftRepo::start(&pool, shift.id, shift.version, at(9, 1), &stamp())
        .await
        .unwrap();
    assert!(lost.is_none());

    // Entry stamp from the winner is untouched.
    let row = ShiftRepo::find_by_id(&pool, shift.id).await.unwrap().unwrap();
    assert_eq!(row.actual_start, Some(at(9, 0)));
}

// ---------------------------------------------------------------------------
// Test: set_state guards on the expected source state
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_set_state_requires_expected_state(pool: PgPool) {
    let shift = ShiftRepo::create(&pool, &new_shift(Some(at(9, 0))))
        .await
        .unwrap();

    // Still sin_iniciar; moving en_curso -> en_pausa must not match.
    let moved = ShiftRepo::set_state(
        &pool,
        shift.id,
        shift.version,
        ShiftState::EnCurso,
        ShiftState::EnPausa,
    )
    .await
    .unwrap();
    assert!(moved.is_none());

    let started = ShiftRepo::start(&pool, shift.id, shift.version, at(9, 0), &stamp())
        .await
        .unwrap()
        .unwrap();

    let paused = ShiftRepo::set_state(
        &pool,
        shift.id,
        started.version,
        ShiftState::EnCurso,
        ShiftState::EnPausa,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(paused.state().unwrap(), ShiftState::EnPausa);
}

// ---------------------------------------------------------------------------
// Test: break ledger open/close and the single-open-break index
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_break_ledger_open_close(pool: PgPool) {
    let shift = ShiftRepo::create(&pool, &new_shift(Some(at(9, 0))))
        .await
        .unwrap();

    let entry = BreakRepo::open(&pool, shift.id, BreakKind::Obligatorio, at(12, 0), &stamp())
        .await
        .unwrap();
    assert_eq!(entry.kind().unwrap(), BreakKind::Obligatorio);
    assert!(entry.ended_at.is_none());

    let open = BreakRepo::find_open(&pool, shift.id).await.unwrap();
    assert_eq!(open.unwrap().id, entry.id);

    // A second open entry violates uq_shift_breaks_open.
    let second =
        BreakRepo::open(&pool, shift.id, BreakKind::Adicional, at(12, 5), &stamp()).await;
    assert!(second.is_err());

    let closed = BreakRepo::close(&pool, entry.id, at(12, 30), &stamp())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(closed.ended_at, Some(at(12, 30)));

    // Closing again is a no-op.
    let again = BreakRepo::close(&pool, entry.id, at(12, 31), &stamp())
        .await
        .unwrap();
    assert!(again.is_none());

    // With the first closed, a new one can open.
    BreakRepo::open(&pool, shift.id, BreakKind::Adicional, at(16, 0), &stamp())
        .await
        .unwrap();

    let ledger = BreakRepo::list_for_shift(&pool, shift.id).await.unwrap();
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[0].id, entry.id);
}

// ---------------------------------------------------------------------------
// Test: delay scan filtering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delay_scan_filters(pool: PgPool) {
    // Started late inside the window: should appear.
    let late = ShiftRepo::create(&pool, &new_shift(Some(at(9, 0))))
        .await
        .unwrap();
    ShiftRepo::start(&pool, late.id, late.version, at(9, 20), &stamp())
        .await
        .unwrap()
        .unwrap();

    // Never started: excluded (actual_start is null).
    ShiftRepo::create(&pool, &new_shift(Some(at(9, 0))))
        .await
        .unwrap();

    // Started but excused: excluded by the absence note.
    let excused = ShiftRepo::create(&pool, &new_shift(Some(at(9, 0))))
        .await
        .unwrap();
    ShiftRepo::start(&pool, excused.id, excused.version, at(10, 30), &stamp())
        .await
        .unwrap()
        .unwrap();
    AbsenceNoteRepo::create(&pool, excused.id, &CreateAbsenceNote { reason: None })
        .await
        .unwrap();

    // Planned on another day: outside the window.
    let other_day = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
    let elsewhere = ShiftRepo::create(&pool, &new_shift(Some(other_day)))
        .await
        .unwrap();
    ShiftRepo::start(&pool, elsewhere.id, elsewhere.version, other_day, &stamp())
        .await
        .unwrap()
        .unwrap();

    let page = ShiftRepo::list_for_delay_scan(&pool, at(0, 0), at(23, 59), 100, 0)
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, late.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delay_scan_pagination(pool: PgPool) {
    for minute in 0..5 {
        let shift = ShiftRepo::create(&pool, &new_shift(Some(at(9, minute))))
            .await
            .unwrap();
        ShiftRepo::start(&pool, shift.id, shift.version, at(10, minute), &stamp())
            .await
            .unwrap()
            .unwrap();
    }

    let first = ShiftRepo::list_for_delay_scan(&pool, at(0, 0), at(23, 59), 2, 0)
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let last = ShiftRepo::list_for_delay_scan(&pool, at(0, 0), at(23, 59), 2, 4)
        .await
        .unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].planned_start, Some(at(9, 4)));
}

// ---------------------------------------------------------------------------
// Test: one absence note per shift
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_absence_note_unique_per_shift(pool: PgPool) {
    let shift = ShiftRepo::create(&pool, &new_shift(Some(at(9, 0))))
        .await
        .unwrap();

    assert!(!AbsenceNoteRepo::exists_for_shift(&pool, shift.id)
        .await
        .unwrap());

    let note = AbsenceNoteRepo::create(
        &pool,
        shift.id,
        &CreateAbsenceNote {
            reason: Some("cita médica".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(note.status, "pendiente");

    assert!(AbsenceNoteRepo::exists_for_shift(&pool, shift.id)
        .await
        .unwrap());

    let duplicate =
        AbsenceNoteRepo::create(&pool, shift.id, &CreateAbsenceNote { reason: None }).await;
    assert!(duplicate.is_err());
}

// ---------------------------------------------------------------------------
// Test: event insert dedup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_event_insert_dedup(pool: PgPool) {
    let payload = serde_json::json!({"delay_minutes": 20});

    let first = EventRepo::insert(
        &pool,
        "delay.detected",
        Some(1),
        None,
        &payload,
        Some("delay:1:20"),
    )
    .await
    .unwrap();
    assert!(first.is_some());

    // Same dedup key: suppressed.
    let second = EventRepo::insert(
        &pool,
        "delay.detected",
        Some(1),
        None,
        &payload,
        Some("delay:1:20"),
    )
    .await
    .unwrap();
    assert!(second.is_none());

    // No dedup key: always inserted.
    for _ in 0..2 {
        let row = EventRepo::insert(&pool, "shift.started", Some(1), Some(7), &payload, None)
            .await
            .unwrap();
        assert!(row.is_some());
    }

    assert_eq!(
        EventRepo::count_by_type(&pool, "delay.detected").await.unwrap(),
        1
    );
    assert_eq!(
        EventRepo::count_by_type(&pool, "shift.started").await.unwrap(),
        2
    );
}
