//! The RIL client: command dispatch and response processing.
//!
//! [`RilClient`] owns the request registry, the recovery state machine and
//! the data call statistics. It is driven entirely through `&mut self`:
//! public operations send requests, [`RilClient::feed`] processes bytes
//! arriving from the modem, and [`RilClient::handle_timeout`] is the
//! watchdog entry point. See [`crate::runtime`] for running it on a thread.
//!
//! Solicited responses flow through the same steps every time:
//!
//! 1. the registry resolves the serial to the pending request
//! 2. the payload is decoded by the request's schema and normalized
//! 3. recovery inspects SETUP_DATA_CALL outcomes
//! 4. the result is delivered to the request's completion

use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use ril_wire::{
    decode_data_call_list, decode_radio_state, decode_setup_data_call,
    decode_supp_service_notification, CallListReader, DataCallResponse, FrameCodec, Message, ModemErrorCode,
    RadioState, Request, RequestCode, SetupDataCallParams, SuppServiceNotification, WireError,
    RIL_UNSOL_DATA_CALL_LIST_CHANGED, RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED,
    RIL_UNSOL_SUPP_SVC_NOTIFICATION,
};
use tracing::{debug, error, trace, warn};

use crate::config::ClientConfig;
use crate::counters::metric_defs;
use crate::error::{CommandError, Result};
use crate::normalize::{normalize_call, remap_forwarded_code, sort_calls, DataCallStats};
use crate::recovery::{DataCallRecovery, RecoveryEffect, RecoveryEvent, RecoveryState, RecoveryStep};
use crate::registry::{PendingRequest, RequestRegistry};
use crate::sink::{CommandResult, Completion, Payload, ResultSink};
use crate::transport::Transport;

/// Notifications that are not replies to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indication {
    /// Voice privacy state of one call, one per call list entry.
    VoicePrivacy(bool),
    /// Supplementary service notification, after vendor fixups.
    SuppService(SuppServiceNotification),
    /// The data connection list changed.
    DataCallListChanged(Vec<DataCallResponse>),
    /// The radio changed state.
    RadioStateChanged(RadioState),
}

/// Client for the Wrigley modem.
pub struct RilClient<T: Transport> {
    config: ClientConfig,
    transport: T,
    registry: RequestRegistry,
    recovery: DataCallRecovery,
    stats: DataCallStats,
    /// Last power state requested by a caller. Recovery does not touch it.
    radio_should_be_on: Option<bool>,
    radio_state: Option<RadioState>,
    subscribers: Vec<Sender<Indication>>,
    codec: FrameCodec,
}

impl<T: Transport> RilClient<T> {
    /// Create a client that sends over `transport`.
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let recovery = DataCallRecovery::new(config.recovery);
        RilClient {
            config,
            transport,
            registry: RequestRegistry::new(),
            recovery,
            stats: DataCallStats::new(),
            radio_should_be_on: None,
            radio_state: None,
            subscribers: Vec::new(),
            codec: FrameCodec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Bring up a data connection. The request becomes the tracked setup
    /// request, superseding any earlier one.
    ///
    /// Returns the serial if the request is in flight.
    pub fn setup_data_call(&mut self, params: SetupDataCallParams, sink: ResultSink) -> Option<i32> {
        let serial = self.registry.next_serial();
        debug!(
            "> SETUP_DATA_CALL serial={} tech={} profile={} apn={} user={} password={} auth={} protocol={}",
            serial,
            params.radio_technology,
            params.profile,
            params.apn,
            params.user,
            params.password,
            params.auth_type,
            params.protocol
        );
        self.dispatch_with_serial(serial, Request::SetupDataCall(params), Completion::Caller(sink))
    }

    /// Tear down a data connection.
    ///
    /// When the last data call list reported no connections, the modem is
    /// not contacted and success is delivered straight away.
    pub fn deactivate_data_call(&mut self, cid: i32, reason: i32, sink: ResultSink) -> Option<i32> {
        if self.stats.is_known_empty() {
            warn!("DEACTIVATE_DATA_CALL cid={} with no active data calls, not sending", cid);
            metric_defs::DEACTIVATE_SHORT_CIRCUITED.increment();
            sink.deliver(Ok(Payload::None));
            return None;
        }
        self.dispatch(Request::DeactivateDataCall { cid, reason }, Completion::Caller(sink))
    }

    /// Turn the radio on or off and remember the request.
    pub fn set_radio_power(&mut self, on: bool, sink: ResultSink) -> Option<i32> {
        self.radio_should_be_on = Some(on);
        self.dispatch(Request::RadioPower { on }, Completion::Caller(sink))
    }

    /// Fetch the current call list.
    pub fn get_current_calls(&mut self, sink: ResultSink) -> Option<i32> {
        self.dispatch(Request::GetCurrentCalls, Completion::Caller(sink))
    }

    /// Fetch the data connection list.
    pub fn get_data_call_list(&mut self, sink: ResultSink) -> Option<i32> {
        self.dispatch(Request::DataCallList, Completion::Caller(sink))
    }

    fn dispatch(&mut self, request: Request, completion: Completion) -> Option<i32> {
        let serial = self.registry.next_serial();
        self.dispatch_with_serial(serial, request, completion)
    }

    fn dispatch_with_serial(&mut self, serial: i32, request: Request, completion: Completion) -> Option<i32> {
        let command = request.code();
        let frame = request.encode_frame(serial);

        if let Err(e) = self.registry.register(serial, command, completion, frame.clone()) {
            error!("failed to register {} serial={}: {}", command, serial, e);
            return None;
        }

        if command == RequestCode::SetupDataCall {
            if let Err(e) = self.registry.track_setup(serial) {
                error!("failed to track {} serial={}: {}", command, serial, e);
            }
        }

        match self.transport.send(&frame) {
            Ok(()) => {
                trace!("> {} serial={} ({} bytes)", command, serial, frame.len());
                Some(serial)
            }
            Err(e) => {
                warn!("failed to send {} serial={}: {}", command, serial, e);
                if let Ok(request) = self.registry.resolve(serial) {
                    self.complete(request, Err(CommandError::radio_not_available()));
                }
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------

    /// Process bytes received from the modem.
    ///
    /// Partial frames are buffered until the rest arrives. An oversized
    /// frame means the stream is out of sync; buffered bytes are dropped
    /// and the error is returned.
    pub fn feed(&mut self, data: &[u8]) -> Result<()> {
        self.codec.push(data);
        while let Some(parcel) = self.codec.decode()? {
            self.handle_parcel(&parcel);
        }
        Ok(())
    }

    /// Process one complete response parcel (without its length prefix).
    pub fn handle_parcel(&mut self, parcel: &[u8]) {
        match Message::decode(parcel) {
            Ok(Message::Solicited {
                serial,
                error,
                payload,
            }) => self.handle_solicited(serial, error, &payload),
            Ok(Message::Unsolicited { code, payload }) => self.handle_unsolicited(code, &payload),
            Err(e) => {
                warn!("dropping undecodable response: {}", e);
                metric_defs::RESPONSES_MALFORMED.increment();
            }
        }
    }

    fn handle_solicited(&mut self, serial: i32, error: ModemErrorCode, payload: &[u8]) {
        let request = match self.registry.resolve(serial) {
            Ok(request) => request,
            Err(_) => {
                warn!("response for unknown serial {} ({}), dropping", serial, error);
                return;
            }
        };

        trace!("< {} serial={} error={}", request.command, serial, error);

        let result = if error.is_success() {
            self.decode_payload(request.command, payload)
                .map_err(|e| {
                    warn!("malformed {} response serial={}: {}", request.command, serial, e);
                    metric_defs::RESPONSES_MALFORMED.increment();
                    CommandError::MalformedResponse(e)
                })
        } else {
            Err(CommandError::Modem(error))
        };

        // A success code with an undecodable body is not a successful setup.
        let effect = match request.command {
            RequestCode::SetupDataCall if result.is_ok() || !error.is_success() => self
                .recovery
                .handle(RecoveryEvent::SetupDataCallResponse { error }),
            _ => None,
        };

        if let Some(effect) = effect {
            self.apply_recovery_effect(effect);
        }

        self.complete(request, result);
    }

    fn decode_payload(&mut self, command: RequestCode, payload: &[u8]) -> std::result::Result<Payload, WireError> {
        match command {
            RequestCode::GetCurrentCalls => {
                // Privacy is reported per entry as it is read, so entries
                // ahead of a malformed one are still announced.
                let mut calls = Vec::new();
                for entry in CallListReader::new(payload)? {
                    let mut call = entry?;
                    normalize_call(&mut call)?;
                    self.notify(Indication::VoicePrivacy(call.is_voice_privacy));
                    calls.push(call);
                }
                sort_calls(&mut calls);
                Ok(Payload::CallList(calls))
            }
            RequestCode::DataCallList => {
                let calls = decode_data_call_list(payload)?;
                self.stats.record(&calls);
                Ok(Payload::DataCallList(calls))
            }
            RequestCode::SetupDataCall => {
                decode_setup_data_call(payload, self.config.ril_version).map(Payload::DataCall)
            }
            RequestCode::RadioPower | RequestCode::DeactivateDataCall => Ok(Payload::None),
        }
    }

    fn handle_unsolicited(&mut self, code: i32, payload: &[u8]) {
        let indication = match code {
            RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED => decode_radio_state(payload).map(|state| {
                self.radio_state = Some(state);
                Indication::RadioStateChanged(state)
            }),
            RIL_UNSOL_DATA_CALL_LIST_CHANGED => decode_data_call_list(payload).map(|calls| {
                self.stats.record(&calls);
                Indication::DataCallListChanged(calls)
            }),
            RIL_UNSOL_SUPP_SVC_NOTIFICATION => decode_supp_service_notification(payload)
                .map(|n| Indication::SuppService(remap_forwarded_code(n))),
            other => {
                debug!("ignoring unsolicited response {}", other);
                return;
            }
        };

        match indication {
            Ok(indication) => {
                trace!("< unsolicited {:?}", indication);
                self.notify(indication);
            }
            Err(e) => {
                warn!("malformed unsolicited response {}: {}", code, e);
                metric_defs::RESPONSES_MALFORMED.increment();
            }
        }
    }

    // ------------------------------------------------------------------
    // Completion and recovery
    // ------------------------------------------------------------------

    fn complete(&mut self, request: PendingRequest, result: CommandResult) {
        match request.completion {
            Completion::Caller(sink) => sink.deliver(result),
            Completion::Recovery(step) => {
                if let Err(e) = &result {
                    debug!("recovery {:?} finished with {}", step, e);
                }
                let event = match step {
                    RecoveryStep::PowerDown => RecoveryEvent::PowerDownComplete {
                        radio_should_be_on: self.radio_should_be_on,
                    },
                    RecoveryStep::PowerUp => RecoveryEvent::PowerUpComplete,
                };
                if let Some(effect) = self.recovery.handle(event) {
                    self.apply_recovery_effect(effect);
                }
            }
        }
    }

    fn apply_recovery_effect(&mut self, effect: RecoveryEffect) {
        let (on, step) = match effect {
            RecoveryEffect::PowerOff => (false, RecoveryStep::PowerDown),
            RecoveryEffect::PowerOn => (true, RecoveryStep::PowerUp),
        };
        self.dispatch(Request::RadioPower { on }, Completion::Recovery(step));
    }

    // ------------------------------------------------------------------
    // Watchdog and lifecycle
    // ------------------------------------------------------------------

    /// Evict the tracked setup request with `serial` if it is still pending.
    ///
    /// Its caller receives `RadioNotAvailable`. Returns whether anything
    /// was evicted.
    pub fn handle_timeout(&mut self, serial: i32) -> bool {
        let Some(request) = self.registry.evict_on_timeout(serial) else {
            return false;
        };

        error!(
            "{} serial={} unanswered after {:?}, evicting",
            request.command,
            serial,
            request.created_at.elapsed()
        );
        metric_defs::REQUESTS_EVICTED.increment();
        self.complete(request, Err(CommandError::radio_not_available()));
        true
    }

    /// When the tracked setup request times out, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.registry
            .tracked_setup_deadline(self.config.setup_timeout())
            .map(|(_, deadline)| deadline)
    }

    /// Evict the tracked setup request if its deadline has passed.
    pub fn check_timeouts(&mut self, now: Instant) -> bool {
        match self.registry.tracked_setup_deadline(self.config.setup_timeout()) {
            Some((serial, deadline)) if deadline <= now => self.handle_timeout(serial),
            _ => false,
        }
    }

    /// Fail every pending request with `RadioNotAvailable`.
    ///
    /// Pending recovery commands are dropped without advancing recovery, so
    /// nothing new is sent.
    pub fn shutdown(&mut self) {
        for request in self.registry.drain() {
            match request.completion {
                Completion::Caller(sink) => sink.deliver(Err(CommandError::radio_not_available())),
                Completion::Recovery(step) => {
                    debug!("dropping recovery {:?} serial={} on shutdown", step, request.serial)
                }
            }
        }
        self.codec.clear();
    }

    // ------------------------------------------------------------------
    // Indications and accessors
    // ------------------------------------------------------------------

    /// Receive indications from now on.
    pub fn subscribe(&mut self) -> Receiver<Indication> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.add_subscriber(tx);
        rx
    }

    /// Send indications to an existing channel.
    pub fn add_subscriber(&mut self, tx: Sender<Indication>) {
        self.subscribers.push(tx);
    }

    fn notify(&mut self, indication: Indication) {
        self.subscribers.retain(|tx| tx.send(indication.clone()).is_ok());
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current recovery state.
    pub fn recovery_state(&self) -> RecoveryState {
        self.recovery.state()
    }

    /// Last radio power state requested by a caller.
    pub fn radio_should_be_on(&self) -> Option<bool> {
        self.radio_should_be_on
    }

    /// Last radio state reported by the modem.
    pub fn radio_state(&self) -> Option<RadioState> {
        self.radio_state
    }

    /// Last known number of data connections.
    pub fn data_call_count(&self) -> Option<usize> {
        self.stats.count()
    }

    /// Number of requests waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.registry.len()
    }

    /// Serial of the tracked setup request.
    pub fn tracked_setup(&self) -> Option<i32> {
        self.registry.tracked_setup()
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingTransport;
    use ril_wire::{encode_call_list, encode_data_call_list, CallRecord, Presentation, TOA_INTERNATIONAL};

    fn client() -> RilClient<RecordingTransport> {
        RilClient::new(ClientConfig::default(), RecordingTransport::new())
    }

    fn respond(client: &mut RilClient<RecordingTransport>, serial: i32, error: ModemErrorCode, payload: Vec<u8>) {
        let frame = Message::Solicited {
            serial,
            error,
            payload,
        }
        .encode_frame();
        client.feed(&frame).unwrap();
    }

    #[test]
    fn test_call_list_is_normalized() {
        let mut client = client();
        let indications = client.subscribe();
        let (sink, rx) = ResultSink::channel();
        let serial = client.get_current_calls(sink).unwrap();

        let calls = vec![
            CallRecord {
                index: 2,
                is_mt: false,
                toa: TOA_INTERNATIONAL,
                number: Some("15550100".into()),
                number_presentation: Presentation::Unknown,
                ..Default::default()
            },
            CallRecord {
                index: 1,
                is_mt: true,
                is_voice_privacy: true,
                ..Default::default()
            },
        ];
        respond(&mut client, serial, ModemErrorCode::Success, encode_call_list(&calls));

        let Ok(Payload::CallList(calls)) = rx.try_recv().unwrap() else {
            panic!("expected a call list");
        };
        assert_eq!(calls[0].index, 1);
        assert_eq!(calls[1].number.as_deref(), Some("+15550100"));
        assert_eq!(calls[1].number_presentation, Presentation::Allowed);

        let privacy: Vec<_> = indications.try_iter().collect();
        assert_eq!(
            privacy,
            vec![Indication::VoicePrivacy(false), Indication::VoicePrivacy(true)]
        );
    }

    #[test]
    fn test_outgoing_call_with_out_of_range_presentation() {
        let mut client = client();
        let (sink, rx) = ResultSink::channel();
        let serial = client.get_current_calls(sink).unwrap();

        let outgoing = CallRecord {
            index: 1,
            is_mt: false,
            number_presentation: Presentation::Invalid(7),
            ..Default::default()
        };
        respond(&mut client, serial, ModemErrorCode::Success, encode_call_list(&[outgoing]));

        let Ok(Payload::CallList(calls)) = rx.try_recv().unwrap() else {
            panic!("expected a call list");
        };
        assert_eq!(calls[0].number_presentation, Presentation::Allowed);
    }

    #[test]
    fn test_incoming_call_with_out_of_range_presentation() {
        let mut client = client();
        let (sink, rx) = ResultSink::channel();
        let serial = client.get_current_calls(sink).unwrap();

        let incoming = CallRecord {
            is_mt: true,
            number_presentation: Presentation::Invalid(7),
            ..Default::default()
        };
        respond(&mut client, serial, ModemErrorCode::Success, encode_call_list(&[incoming]));

        assert_eq!(
            rx.try_recv().unwrap(),
            Err(CommandError::MalformedResponse(WireError::InvalidField {
                field: "number presentation",
                value: 7
            }))
        );
    }

    #[test]
    fn test_privacy_announced_for_entries_before_malformed_one() {
        let mut client = client();
        let indications = client.subscribe();
        let (sink, rx) = ResultSink::channel();
        let serial = client.get_current_calls(sink).unwrap();

        let first = CallRecord {
            index: 1,
            is_voice_privacy: true,
            ..Default::default()
        };
        let second = CallRecord {
            index: 2,
            ..Default::default()
        };
        let mut payload = encode_call_list(&[first, second]);
        payload.truncate(payload.len() - 8);
        respond(&mut client, serial, ModemErrorCode::Success, payload);

        assert!(matches!(
            rx.try_recv().unwrap(),
            Err(CommandError::MalformedResponse(WireError::Truncated { .. }))
        ));
        let privacy: Vec<_> = indications.try_iter().collect();
        assert_eq!(privacy, vec![Indication::VoicePrivacy(true)]);
    }

    #[test]
    fn test_malformed_response_fails_only_that_request() {
        let mut client = client();
        let (bad_sink, bad_rx) = ResultSink::channel();
        let (good_sink, good_rx) = ResultSink::channel();
        let bad = client.get_current_calls(bad_sink).unwrap();
        let good = client.get_data_call_list(good_sink).unwrap();

        respond(&mut client, bad, ModemErrorCode::Success, vec![1, 0]);
        respond(&mut client, good, ModemErrorCode::Success, encode_data_call_list(6, &[]));

        assert!(matches!(
            bad_rx.try_recv().unwrap(),
            Err(CommandError::MalformedResponse(WireError::Truncated { .. }))
        ));
        assert_eq!(good_rx.try_recv().unwrap(), Ok(Payload::DataCallList(Vec::new())));
        assert_eq!(client.data_call_count(), Some(0));
    }

    #[test]
    fn test_transport_refusal_fails_caller() {
        let mut client = client();
        client.transport_mut().refuse = true;
        let (sink, rx) = ResultSink::channel();

        assert_eq!(client.set_radio_power(true, sink), None);
        assert_eq!(rx.try_recv().unwrap(), Err(CommandError::radio_not_available()));
        assert_eq!(client.pending_count(), 0);
        assert_eq!(client.radio_should_be_on(), Some(true));
    }

    #[test]
    fn test_modem_error_delivered() {
        let mut client = client();
        let (sink, rx) = ResultSink::channel();
        let serial = client.get_data_call_list(sink).unwrap();
        respond(&mut client, serial, ModemErrorCode::RadioNotAvailable, Vec::new());
        assert_eq!(rx.try_recv().unwrap(), Err(CommandError::radio_not_available()));
        assert_eq!(client.data_call_count(), None);
    }

    #[test]
    fn test_unknown_serial_ignored() {
        let mut client = client();
        respond(&mut client, 77, ModemErrorCode::Success, Vec::new());
        assert_eq!(client.pending_count(), 0);
    }

    #[test]
    fn test_split_frames() {
        let mut client = client();
        let (sink, rx) = ResultSink::channel();
        let serial = client.set_radio_power(false, sink).unwrap();

        let frame = Message::Solicited {
            serial,
            error: ModemErrorCode::Success,
            payload: Vec::new(),
        }
        .encode_frame();
        client.feed(&frame[..5]).unwrap();
        assert!(rx.try_recv().is_err());
        client.feed(&frame[5..]).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Ok(Payload::None));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut client = client();
        let err = client.feed(&[0x7f, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, crate::RilError::Wire(WireError::FrameTooLong { .. })));
    }
}
