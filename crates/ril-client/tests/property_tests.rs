//! Property-based tests for the vendor fixups and the recovery machine.

use proptest::prelude::*;
use ril_client::normalize::{normalize_call_list, remap_forwarded_code};
use ril_client::recovery::transition;
use ril_client::{RecoveryEffect, RecoveryEvent, RecoveryState};
use ril_wire::{CallRecord, CallState, ModemErrorCode, Presentation, SuppServiceNotification};

fn presentation() -> impl Strategy<Value = Presentation> {
    prop_oneof![
        Just(Presentation::Allowed),
        Just(Presentation::Restricted),
        Just(Presentation::Unknown),
        Just(Presentation::Payphone),
    ]
}

/// Outgoing calls get any raw presentation code the modem might send;
/// incoming calls get a valid one.
fn call_record() -> impl Strategy<Value = CallRecord> {
    (
        0i32..=5,
        1i32..=7,
        prop_oneof![Just(129), Just(145)],
        any::<bool>(),
        any::<bool>(),
        presentation(),
        any::<i32>(),
        proptest::option::of("[0-9+]{0,12}"),
    )
        .prop_map(
            |(state, index, toa, is_mt, is_voice_privacy, valid, raw, number)| CallRecord {
                state: CallState::from_clcc(state).unwrap(),
                index,
                toa,
                is_mt,
                is_voice_privacy,
                number_presentation: if is_mt { valid } else { Presentation::from_raw(raw) },
                number,
                ..Default::default()
            },
        )
}

fn recovery_event() -> impl Strategy<Value = RecoveryEvent> {
    prop_oneof![
        (0i32..=15).prop_map(|code| RecoveryEvent::SetupDataCallResponse {
            error: ModemErrorCode::from(code)
        }),
        proptest::option::of(any::<bool>())
            .prop_map(|radio_should_be_on| RecoveryEvent::PowerDownComplete { radio_should_be_on }),
        Just(RecoveryEvent::PowerUpComplete),
    ]
}

// ─── Call List ──────────────────────────────────────────────────────────────

proptest! {
    /// Outgoing calls always report an allowed presentation.
    #[test]
    fn outgoing_presentation_always_allowed(calls in proptest::collection::vec(call_record(), 0..8)) {
        let update = normalize_call_list(calls.clone()).unwrap();
        for call in &update.calls {
            if !call.is_mt {
                prop_assert_eq!(call.number_presentation, Presentation::Allowed);
            }
        }
        // Incoming calls keep what the modem reported.
        let mut incoming_in: Vec<_> = calls.iter().filter(|c| c.is_mt).map(|c| (c.index, c.number_presentation)).collect();
        let mut incoming_out: Vec<_> = update.calls.iter().filter(|c| c.is_mt).map(|c| (c.index, c.number_presentation)).collect();
        incoming_in.sort_by_key(|p| p.0);
        incoming_out.sort_by_key(|p| p.0);
        prop_assert_eq!(incoming_in, incoming_out);
    }

    /// An incoming call with an out-of-range presentation fails the list.
    #[test]
    fn incoming_invalid_presentation_rejected(
        mut calls in proptest::collection::vec(call_record(), 0..8),
        raw in 4i32..1000,
    ) {
        calls.push(CallRecord {
            is_mt: true,
            number_presentation: Presentation::from_raw(raw),
            ..Default::default()
        });
        prop_assert!(normalize_call_list(calls).is_err());
    }

    /// The call list comes back sorted by index for any input order.
    #[test]
    fn call_list_sorted_by_index(calls in proptest::collection::vec(call_record(), 0..8)) {
        let update = normalize_call_list(calls.clone()).unwrap();
        prop_assert_eq!(update.calls.len(), calls.len());
        prop_assert!(update.calls.windows(2).all(|w| w[0].index <= w[1].index));
    }

    /// One voice privacy flag per entry, in the order the modem sent them.
    #[test]
    fn voice_privacy_per_entry(calls in proptest::collection::vec(call_record(), 0..8)) {
        let expected: Vec<bool> = calls.iter().map(|c| c.is_voice_privacy).collect();
        let update = normalize_call_list(calls).unwrap();
        prop_assert_eq!(update.voice_privacy, expected);
    }

    /// International numbers carry exactly one leading '+'.
    #[test]
    fn international_numbers_prefixed(calls in proptest::collection::vec(call_record(), 0..8)) {
        let update = normalize_call_list(calls).unwrap();
        for call in &update.calls {
            if let (145, Some(number)) = (call.toa, call.number.as_deref()) {
                prop_assert!(number.is_empty() || number.starts_with('+'));
            }
        }
    }
}

// ─── Supplementary Services ─────────────────────────────────────────────────

proptest! {
    /// Only (MT, 10) is rewritten, to (MT, 0).
    #[test]
    fn forwarded_code_remap(notification_type in 0i32..=1, code in -1i32..=20, index in any::<i32>()) {
        let notification = SuppServiceNotification {
            notification_type,
            code,
            index,
            toa: 129,
            number: None,
        };
        let out = remap_forwarded_code(notification.clone());
        if notification_type == 1 && code == 10 {
            prop_assert_eq!(out.code, 0);
            prop_assert_eq!(out.index, index);
        } else {
            prop_assert_eq!(out, notification);
        }
    }
}

// ─── Recovery ───────────────────────────────────────────────────────────────

proptest! {
    /// A power-down is only ever requested from Idle, so cycles never overlap.
    #[test]
    fn power_off_only_from_idle(events in proptest::collection::vec(recovery_event(), 0..32)) {
        let mut state = RecoveryState::Idle;
        for event in events {
            let (next, effect) = transition(state, event);
            if effect == Some(RecoveryEffect::PowerOff) {
                prop_assert_eq!(state, RecoveryState::Idle);
                prop_assert_eq!(next, RecoveryState::Active);
            }
            if effect == Some(RecoveryEffect::PowerOn) {
                prop_assert_eq!(state, RecoveryState::Active);
            }
            state = next;
        }
    }

    /// Generic failures outside Idle change nothing.
    #[test]
    fn failure_outside_idle_is_inert(done in any::<bool>()) {
        let state = if done { RecoveryState::Done } else { RecoveryState::Active };
        let event = RecoveryEvent::SetupDataCallResponse { error: ModemErrorCode::GenericFailure };
        prop_assert_eq!(transition(state, event), (state, None));
    }
}
