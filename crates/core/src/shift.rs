//! Shift lifecycle state machine.
//!
//! States and actions keep their original Spanish wire names (these are what
//! clients send and what dashboards display); the `state_id` discriminants
//! match the 1-based seed order of the `shift_states` lookup table.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// State ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StateId = i16;

/// Lifecycle state of a shift.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftState {
    /// Planned, not yet clocked in.
    SinIniciar = 1,
    /// Clocked in and working.
    EnCurso = 2,
    /// Paused on an additional (voluntary) break.
    EnPausa = 3,
    /// Paused on the once-per-day mandatory break.
    DescansoObligatorio = 4,
    /// Clocked out. Terminal.
    Finalizado = 5,
}

impl ShiftState {
    /// Return the database state ID.
    pub fn id(self) -> StateId {
        self as StateId
    }

    /// Resolve a database state ID back to a state.
    pub fn from_id(id: StateId) -> Option<Self> {
        match id {
            1 => Some(Self::SinIniciar),
            2 => Some(Self::EnCurso),
            3 => Some(Self::EnPausa),
            4 => Some(Self::DescansoObligatorio),
            5 => Some(Self::Finalizado),
            _ => None,
        }
    }

    /// Wire name, e.g. `"descanso_obligatorio"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SinIniciar => "sin_iniciar",
            Self::EnCurso => "en_curso",
            Self::EnPausa => "en_pausa",
            Self::DescansoObligatorio => "descanso_obligatorio",
            Self::Finalizado => "finalizado",
        }
    }

    /// Whether the state admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalizado)
    }

    /// Whether the shift is currently on a break of either kind.
    pub fn is_break(self) -> bool {
        matches!(self, Self::EnPausa | Self::DescansoObligatorio)
    }
}

impl std::fmt::Display for ShiftState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client clocking action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockAction {
    Iniciar,
    DescansoAdicional,
    DescansoObligatorio,
    Reanudar,
    Finalizar,
}

impl ClockAction {
    /// Wire name, e.g. `"iniciar"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Iniciar => "iniciar",
            Self::DescansoAdicional => "descanso_adicional",
            Self::DescansoObligatorio => "descanso_obligatorio",
            Self::Reanudar => "reanudar",
            Self::Finalizar => "finalizar",
        }
    }
}

impl std::fmt::Display for ClockAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the state an action leads to from `from`, or `None` when the
/// action is not allowed there.
///
/// This is the single source of truth for the transition table; everything
/// else (engine, HTTP error payloads, tests) derives from it.
pub fn next_state(from: ShiftState, action: ClockAction) -> Option<ShiftState> {
    use ClockAction as A;
    use ShiftState as S;

    match (from, action) {
        (S::SinIniciar, A::Iniciar) => Some(S::EnCurso),
        (S::EnCurso, A::DescansoAdicional) => Some(S::EnPausa),
        (S::EnCurso, A::DescansoObligatorio) => Some(S::DescansoObligatorio),
        (S::EnPausa | S::DescansoObligatorio, A::Reanudar) => Some(S::EnCurso),
        (S::EnCurso, A::Finalizar) => Some(S::Finalizado),
        _ => None,
    }
}

/// Validate a transition, surfacing `InvalidTransition` with the attempted
/// action and current state so the caller can resynchronize.
pub fn validate_transition(
    from: ShiftState,
    action: ClockAction,
) -> Result<ShiftState, CoreError> {
    next_state(from, action).ok_or(CoreError::InvalidTransition { from, action })
}
