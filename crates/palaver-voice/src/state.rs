//! Capture state machine.
//!
//! Enforces valid state transitions for speech capture:
//! - Idle -> Capturing (user starts capture)
//! - Capturing -> Idle (user stops, or the engine ends capture on its own)

use std::fmt;

use crate::error::VoiceError;

/// Whether speech is currently being captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CaptureState {
    /// Not listening. Ready to start.
    #[default]
    Idle,
    /// The engine is listening and accumulating a transcript.
    Capturing,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "Idle"),
            CaptureState::Capturing => write!(f, "Capturing"),
        }
    }
}

impl CaptureState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &CaptureState) -> bool {
        matches!(
            (self, target),
            (CaptureState::Idle, CaptureState::Capturing)
                | (CaptureState::Capturing, CaptureState::Idle)
        )
    }
}

/// State machine owned by one [`InputChannel`](crate::InputChannel).
///
/// All transitions are validated before being applied, returning an error
/// if the requested transition is not permitted.
#[derive(Debug, Default)]
pub struct CaptureStateMachine {
    state: CaptureState,
}

impl CaptureStateMachine {
    /// Create a new state machine initialized to `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CaptureState {
        self.state
    }

    /// Attempt to transition to the target state.
    pub fn transition(&mut self, target: CaptureState) -> Result<(), VoiceError> {
        if self.state.can_transition_to(&target) {
            tracing::debug!("Capture state: {} -> {}", self.state, target);
            self.state = target;
            Ok(())
        } else {
            Err(VoiceError::InvalidTransition {
                from: self.state,
                to: target,
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(CaptureState::Idle.to_string(), "Idle");
        assert_eq!(CaptureState::Capturing.to_string(), "Capturing");
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(CaptureState::default(), CaptureState::Idle);
        assert_eq!(CaptureStateMachine::new().current(), CaptureState::Idle);
    }

    #[test]
    fn test_valid_transitions() {
        assert!(CaptureState::Idle.can_transition_to(&CaptureState::Capturing));
        assert!(CaptureState::Capturing.can_transition_to(&CaptureState::Idle));
    }

    #[test]
    fn test_self_transitions_invalid() {
        assert!(!CaptureState::Idle.can_transition_to(&CaptureState::Idle));
        assert!(!CaptureState::Capturing.can_transition_to(&CaptureState::Capturing));
    }

    #[test]
    fn test_state_machine_round_trip() {
        let mut sm = CaptureStateMachine::new();
        sm.transition(CaptureState::Capturing).unwrap();
        assert_eq!(sm.current(), CaptureState::Capturing);
        sm.transition(CaptureState::Idle).unwrap();
        assert_eq!(sm.current(), CaptureState::Idle);
    }

    #[test]
    fn test_state_machine_invalid_transition_keeps_state() {
        let mut sm = CaptureStateMachine::new();
        let result = sm.transition(CaptureState::Idle);
        match result {
            Err(VoiceError::InvalidTransition { from, to }) => {
                assert_eq!(from, CaptureState::Idle);
                assert_eq!(to, CaptureState::Idle);
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
        assert_eq!(sm.current(), CaptureState::Idle);
    }
}
