//! Vendor fixups applied to decoded responses.
//!
//! The Wrigley modem deviates from the reference command set in a few
//! places. Each deviation is corrected here by a pure function that runs
//! after generic decoding, so the wire codec stays vendor-neutral.

use ril_wire::{
    CallRecord, DataCallResponse, Presentation, SuppServiceNotification, UusInfo,
    MT_CODE_ADDITIONAL_CALL_FORWARDED, MT_CODE_FORWARDED_CALL, SUPP_SVC_NOTIFICATION_MT,
    TOA_INTERNATIONAL, WireError,
};
use tracing::trace;

/// The modem reports a garbage presentation for outgoing calls.
pub fn override_outgoing_presentation(call: &mut CallRecord) {
    if !call.is_mt {
        call.number_presentation = Presentation::Allowed;
    }
}

/// Prefix international numbers with `+`.
pub fn international_number(number: Option<String>, toa: i32) -> Option<String> {
    match number {
        Some(n) if toa == TOA_INTERNATIONAL && !n.is_empty() && !n.starts_with('+') => {
            Some(format!("+{}", n))
        }
        other => other,
    }
}

/// Apply the per-entry fixups to one decoded call.
///
/// An incoming call whose presentation code is outside the CLIP range is
/// rejected. Outgoing calls never are, whatever the modem sent.
pub fn normalize_call(call: &mut CallRecord) -> Result<(), WireError> {
    override_outgoing_presentation(call);
    if let Presentation::Invalid(value) = call.number_presentation {
        return Err(WireError::InvalidField {
            field: "number presentation",
            value,
        });
    }

    call.number = international_number(call.number.take(), call.toa);

    if let Some(uus) = &call.uus {
        log_uus(call.index, uus);
    }
    Ok(())
}

/// Order a call list by index.
pub fn sort_calls(calls: &mut [CallRecord]) {
    calls.sort_by_key(|call| call.index);
}

/// A normalized call list and the voice privacy state of each entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallListUpdate {
    /// Calls sorted by index.
    pub calls: Vec<CallRecord>,
    /// One voice privacy flag per entry, in decode order.
    pub voice_privacy: Vec<bool>,
}

/// Apply every call list fixup to an already decoded list.
pub fn normalize_call_list(mut calls: Vec<CallRecord>) -> Result<CallListUpdate, WireError> {
    let mut voice_privacy = Vec::with_capacity(calls.len());

    for call in &mut calls {
        normalize_call(call)?;
        voice_privacy.push(call.is_voice_privacy);
    }

    sort_calls(&mut calls);

    Ok(CallListUpdate {
        calls,
        voice_privacy,
    })
}

fn log_uus(index: i32, uus: &UusInfo) {
    trace!(
        "call {} UUS type={} dcs={} len={} data={:?} hex={}",
        index,
        uus.uus_type,
        uus.dcs,
        uus.data.len(),
        String::from_utf8_lossy(&uus.data),
        hex::encode(&uus.data)
    );
}

/// The modem sends MT code 10 where the reference set expects 0.
pub fn remap_forwarded_code(mut notification: SuppServiceNotification) -> SuppServiceNotification {
    if notification.notification_type == SUPP_SVC_NOTIFICATION_MT
        && notification.code == MT_CODE_ADDITIONAL_CALL_FORWARDED
    {
        notification.code = MT_CODE_FORWARDED_CALL;
    }
    notification
}

/// Last known number of data connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataCallStats {
    count: Option<usize>,
}

impl DataCallStats {
    /// Nothing known yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly decoded data call list.
    pub fn record(&mut self, calls: &[DataCallResponse]) {
        self.count = Some(calls.len());
    }

    /// Last recorded count, `None` until a list has been seen.
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    /// Whether the last list was known to be empty.
    pub fn is_known_empty(&self) -> bool {
        self.count == Some(0)
    }
}
