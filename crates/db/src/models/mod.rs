//! Row models and request DTOs.

pub mod absence_note;
pub mod break_entry;
pub mod shift;
