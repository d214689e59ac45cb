//! Data call failure recovery.
//!
//! The modem sometimes answers SETUP_DATA_CALL with a generic failure that
//! only clears after the transceiver is power cycled. Recovery watches setup
//! responses and, on the first such failure, turns the radio off and back on
//! (the latter only if the radio is supposed to be on).
//!
//! ```text
//!   Idle --setup GENERIC_FAILURE / PowerOff--> Active
//!   Active --power down done, intent on / PowerOn--> Active
//!   Active --power down done, intent off or unknown--> Done
//!   Active --power up done--> Done
//!   Done --setup SUCCESS--> Idle
//! ```
//!
//! Any other event leaves the state alone. In particular further failures
//! while `Active` or `Done` never start an overlapping cycle.

use ril_wire::ModemErrorCode;
use tracing::{debug, warn};

use crate::counters::metric_defs;

/// Recovery progress for one modem session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryState {
    /// Waiting for a setup failure.
    #[default]
    Idle,
    /// Power cycle in progress.
    Active,
    /// Cycle finished, waiting for a successful setup to re-arm.
    Done,
}

/// Tags the power commands issued by recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStep {
    /// The RADIO_POWER off command.
    PowerDown,
    /// The RADIO_POWER on command.
    PowerUp,
}

/// Inputs to the recovery state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryEvent {
    /// A SETUP_DATA_CALL response arrived with this error code.
    SetupDataCallResponse {
        /// Error code from the response header.
        error: ModemErrorCode,
    },
    /// The recovery power-down command completed.
    PowerDownComplete {
        /// Last radio power state requested by an external caller.
        radio_should_be_on: Option<bool>,
    },
    /// The recovery power-up command completed.
    PowerUpComplete,
}

/// Commands recovery asks the client to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryEffect {
    /// Send RADIO_POWER off, tagged [`RecoveryStep::PowerDown`].
    PowerOff,
    /// Send RADIO_POWER on, tagged [`RecoveryStep::PowerUp`].
    PowerOn,
}

/// Pure transition function.
pub fn transition(state: RecoveryState, event: RecoveryEvent) -> (RecoveryState, Option<RecoveryEffect>) {
    use RecoveryEvent::*;
    use RecoveryState::*;

    match (state, event) {
        (Idle, SetupDataCallResponse { error: ModemErrorCode::GenericFailure }) => {
            (Active, Some(RecoveryEffect::PowerOff))
        }
        (Active, PowerDownComplete { radio_should_be_on: Some(true) }) => {
            (Active, Some(RecoveryEffect::PowerOn))
        }
        (Active, PowerDownComplete { .. }) => (Done, None),
        (Active, PowerUpComplete) => (Done, None),
        (Done, SetupDataCallResponse { error: ModemErrorCode::Success }) => (Idle, None),
        (state, _) => (state, None),
    }
}

/// Recovery state for one client, with logging and metrics.
#[derive(Debug, Clone)]
pub struct DataCallRecovery {
    state: RecoveryState,
    enabled: bool,
}

impl DataCallRecovery {
    /// Create a recovery machine in `Idle`. A disabled machine ignores every event.
    pub fn new(enabled: bool) -> Self {
        DataCallRecovery {
            state: RecoveryState::Idle,
            enabled,
        }
    }

    /// Current state.
    pub fn state(&self) -> RecoveryState {
        self.state
    }

    /// Whether recovery is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Feed an event and return the command to issue, if any.
    pub fn handle(&mut self, event: RecoveryEvent) -> Option<RecoveryEffect> {
        if !self.enabled {
            return None;
        }

        let (next, effect) = transition(self.state, event);

        if next != self.state {
            debug!("data call recovery {:?} -> {:?} on {:?}", self.state, next, event);
            match next {
                RecoveryState::Active => {
                    warn!("SETUP_DATA_CALL failed with generic failure, power cycling radio");
                    metric_defs::RECOVERY_STARTED.increment();
                }
                RecoveryState::Done => metric_defs::RECOVERY_COMPLETED.increment(),
                RecoveryState::Idle => {}
            }
        } else if effect == Some(RecoveryEffect::PowerOn) {
            debug!("data call recovery: radio powered down, powering back up");
        }

        self.state = next;
        effect
    }
}

impl Default for DataCallRecovery {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::RecoveryEvent::*;
    use super::RecoveryState::*;
    use super::*;

    const FAILURE: RecoveryEvent = SetupDataCallResponse {
        error: ModemErrorCode::GenericFailure,
    };
    const SUCCESS: RecoveryEvent = SetupDataCallResponse {
        error: ModemErrorCode::Success,
    };

    #[test]
    fn test_failure_starts_cycle() {
        assert_eq!(transition(Idle, FAILURE), (Active, Some(RecoveryEffect::PowerOff)));
    }

    #[test]
    fn test_other_errors_ignored_when_idle() {
        let event = SetupDataCallResponse {
            error: ModemErrorCode::RadioNotAvailable,
        };
        assert_eq!(transition(Idle, event), (Idle, None));
        assert_eq!(transition(Idle, SUCCESS), (Idle, None));
    }

    #[test]
    fn test_power_down_completion() {
        let on = PowerDownComplete {
            radio_should_be_on: Some(true),
        };
        let off = PowerDownComplete {
            radio_should_be_on: Some(false),
        };
        let unknown = PowerDownComplete {
            radio_should_be_on: None,
        };
        assert_eq!(transition(Active, on), (Active, Some(RecoveryEffect::PowerOn)));
        assert_eq!(transition(Active, off), (Done, None));
        assert_eq!(transition(Active, unknown), (Done, None));
        assert_eq!(transition(Active, PowerUpComplete), (Done, None));
    }

    #[test]
    fn test_no_overlapping_cycle() {
        assert_eq!(transition(Active, FAILURE), (Active, None));
        assert_eq!(transition(Done, FAILURE), (Done, None));
    }

    #[test]
    fn test_success_rearms() {
        assert_eq!(transition(Done, SUCCESS), (Idle, None));
        assert_eq!(transition(Active, SUCCESS), (Active, None));
    }

    #[test]
    fn test_stray_power_completions_ignored() {
        assert_eq!(transition(Idle, PowerUpComplete), (Idle, None));
        assert_eq!(
            transition(Done, PowerDownComplete { radio_should_be_on: Some(true) }),
            (Done, None)
        );
    }

    #[test]
    fn test_disabled_recovery() {
        let mut recovery = DataCallRecovery::new(false);
        assert_eq!(recovery.handle(FAILURE), None);
        assert_eq!(recovery.state(), Idle);
    }

    #[test]
    fn test_full_cycle() {
        let mut recovery = DataCallRecovery::default();
        assert_eq!(recovery.handle(FAILURE), Some(RecoveryEffect::PowerOff));
        assert_eq!(recovery.handle(FAILURE), None);
        assert_eq!(
            recovery.handle(PowerDownComplete { radio_should_be_on: Some(true) }),
            Some(RecoveryEffect::PowerOn)
        );
        assert_eq!(recovery.handle(PowerUpComplete), None);
        assert_eq!(recovery.state(), Done);
        assert_eq!(recovery.handle(SUCCESS), None);
        assert_eq!(recovery.state(), Idle);
    }
}
