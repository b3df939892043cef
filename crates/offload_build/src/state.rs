//! The coordinator's per-generation state machine.

use offload_common::{InternalError, OffloadResult};
use std::fmt;

/// Where the coordinator is within a generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Between generations.
    #[default]
    Idle,
    /// The primary compilation started.
    PrimaryAnalyzing,
    /// The secondary compilation was requested and has not finished.
    SecondarySpawned,
    /// The secondary compilation finished.
    SecondaryComplete,
    /// The primary compilation's modules are built; the worker module's
    /// dependencies are being finalized.
    Finalizing,
}

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// `make` on the primary compilation.
    PrimaryStarted,
    /// The secondary compilation was requested.
    SecondaryRequested,
    /// The secondary compilation finished.
    SecondaryFinished,
    /// `after_compile` on the primary compilation.
    PrimaryCompiled,
    /// The generation ended.
    Done,
    /// The run failed.
    Failed,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::PrimaryAnalyzing => "primary-analyzing",
            Self::SecondarySpawned => "secondary-spawned",
            Self::SecondaryComplete => "secondary-complete",
            Self::Finalizing => "finalizing",
        };
        f.write_str(name)
    }
}

impl CoordinatorState {
    /// The state after `event`, or an error if `event` cannot happen now.
    pub fn transition(self, event: CoordinatorEvent) -> OffloadResult<Self> {
        use CoordinatorEvent as E;
        use CoordinatorState as S;
        match (self, event) {
            (_, E::Failed) => Ok(S::Idle),
            (S::Idle, E::PrimaryStarted) => Ok(S::PrimaryAnalyzing),
            (S::PrimaryAnalyzing, E::SecondaryRequested) => Ok(S::SecondarySpawned),
            (S::SecondarySpawned, E::SecondaryFinished) => Ok(S::SecondaryComplete),
            (S::SecondaryComplete, E::PrimaryCompiled) => Ok(S::Finalizing),
            (S::Finalizing, E::Done) => Ok(S::Idle),
            (state, event) => Err(InternalError::new(format!(
                "coordinator cannot handle {event:?} while {state}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_generation() {
        let mut state = CoordinatorState::Idle;
        for event in [
            CoordinatorEvent::PrimaryStarted,
            CoordinatorEvent::SecondaryRequested,
            CoordinatorEvent::SecondaryFinished,
            CoordinatorEvent::PrimaryCompiled,
            CoordinatorEvent::Done,
        ] {
            state = state.transition(event).unwrap();
        }
        assert_eq!(state, CoordinatorState::Idle);
    }

    #[test]
    fn after_compile_with_outstanding_secondary_is_a_bug() {
        let err = CoordinatorState::SecondarySpawned
            .transition(CoordinatorEvent::PrimaryCompiled)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "internal error: coordinator cannot handle PrimaryCompiled while secondary-spawned"
        );
    }

    #[test]
    fn failure_always_returns_to_idle() {
        assert_eq!(
            CoordinatorState::Finalizing.transition(CoordinatorEvent::Failed),
            Ok(CoordinatorState::Idle)
        );
        assert_eq!(
            CoordinatorState::Idle.transition(CoordinatorEvent::Failed),
            Ok(CoordinatorState::Idle)
        );
    }
}
