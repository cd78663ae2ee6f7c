//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Methods
//! that participate in the clock engine's transaction take any Postgres
//! executor; plain reads take `&PgPool`.

pub mod absence_note_repo;
pub mod break_repo;
pub mod event_repo;
pub mod shift_repo;

pub use absence_note_repo::AbsenceNoteRepo;
pub use break_repo::BreakRepo;
pub use event_repo::EventRepo;
pub use shift_repo::ShiftRepo;
