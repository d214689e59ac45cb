//! A scripted modem.
//!
//! The modem runs on its own thread, reads request frames sent by the
//! client's [`ChannelTransport`](ril_client::ChannelTransport) and answers
//! them according to its [`ModemScript`]. Replies go back to the client
//! thread as [`ClientCommand::Receive`].

use std::collections::VecDeque;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use ril_client::ClientCommand;
use ril_wire::{
    encode_call_list, encode_data_call_list, encode_radio_state, encode_setup_data_call,
    CallRecord, DataCallResponse, FrameCodec, Message, ModemErrorCode, RadioState, Request,
    RIL_UNSOL_DATA_CALL_LIST_CHANGED, RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED,
};
use tracing::{debug, trace, warn};

use crate::error::SimError;
use crate::scenario::{ModemScript, ReplyMode};

/// Modem state driven by incoming requests.
#[derive(Debug)]
pub struct ScriptedModem {
    ril_version: i32,
    setup_replies: VecDeque<ReplyMode>,
    calls: Vec<CallRecord>,
    data_calls: Vec<DataCallResponse>,
    next_cid: i32,
    radio_on: bool,
}

impl ScriptedModem {
    /// Build a modem from its script.
    pub fn new(script: ModemScript) -> Result<Self, SimError> {
        let calls = script
            .calls
            .iter()
            .map(|entry| entry.to_record())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScriptedModem {
            ril_version: script.ril_version,
            setup_replies: script.setup_replies.into(),
            calls,
            data_calls: Vec::new(),
            next_cid: script.first_cid,
            radio_on: false,
        })
    }

    /// Active data connections.
    pub fn data_calls(&self) -> &[DataCallResponse] {
        &self.data_calls
    }

    /// Answer one request. Returns the responses to send, in order.
    pub fn handle_request(&mut self, serial: i32, request: Request) -> Vec<Message> {
        debug!("modem: {} serial={}", request.code(), serial);

        match request {
            Request::RadioPower { on } => {
                self.radio_on = on;
                let mut replies = vec![reply(serial, ModemErrorCode::Success, Vec::new())];
                let state = if on { RadioState::On } else { RadioState::Off };
                replies.push(Message::Unsolicited {
                    code: RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED,
                    payload: encode_radio_state(state),
                });
                if !on && !self.data_calls.is_empty() {
                    self.data_calls.clear();
                    replies.push(self.data_call_list_changed());
                }
                replies
            }

            Request::SetupDataCall(params) => {
                let mode = self.setup_replies.pop_front().unwrap_or(ReplyMode::Success);
                trace!("modem: setup apn={} reply={:?}", params.apn, mode);
                match mode {
                    ReplyMode::Success => {
                        let call = self.bring_up();
                        vec![
                            reply(
                                serial,
                                ModemErrorCode::Success,
                                encode_setup_data_call(self.ril_version, &call),
                            ),
                            self.data_call_list_changed(),
                        ]
                    }
                    ReplyMode::GenericFailure => {
                        vec![reply(serial, ModemErrorCode::GenericFailure, Vec::new())]
                    }
                    ReplyMode::RadioNotAvailable => {
                        vec![reply(serial, ModemErrorCode::RadioNotAvailable, Vec::new())]
                    }
                    ReplyMode::Error(code) => {
                        vec![reply(serial, ModemErrorCode::from(code), Vec::new())]
                    }
                    ReplyMode::Silent => Vec::new(),
                }
            }

            Request::DeactivateDataCall { cid, .. } => {
                let before = self.data_calls.len();
                self.data_calls.retain(|call| call.cid != cid);
                let mut replies = vec![reply(serial, ModemErrorCode::Success, Vec::new())];
                if self.data_calls.len() != before {
                    replies.push(self.data_call_list_changed());
                }
                replies
            }

            Request::GetCurrentCalls => {
                vec![reply(serial, ModemErrorCode::Success, encode_call_list(&self.calls))]
            }

            Request::DataCallList => vec![reply(
                serial,
                ModemErrorCode::Success,
                encode_data_call_list(self.ril_version, &self.data_calls),
            )],
        }
    }

    fn bring_up(&mut self) -> DataCallResponse {
        let cid = self.next_cid;
        self.next_cid += 1;
        let call = DataCallResponse {
            version: self.ril_version,
            status: 0,
            suggested_retry_time: -1,
            cid,
            active: 2,
            pdp_type: Some("IP".to_string()),
            ifname: Some(format!("rmnet{}", cid - 1)),
            addresses: vec![format!("10.0.{}.2", cid)],
            dnses: vec!["8.8.8.8".to_string()],
            gateways: vec![format!("10.0.{}.1", cid)],
        };
        self.data_calls.push(call.clone());
        call
    }

    fn data_call_list_changed(&self) -> Message {
        Message::Unsolicited {
            code: RIL_UNSOL_DATA_CALL_LIST_CHANGED,
            payload: encode_data_call_list(self.ril_version, &self.data_calls),
        }
    }
}

fn reply(serial: i32, error: ModemErrorCode, payload: Vec<u8>) -> Message {
    Message::Solicited {
        serial,
        error,
        payload,
    }
}

/// Run the modem on its own thread until the client's transport is dropped.
pub fn spawn_modem(
    mut modem: ScriptedModem,
    frames_rx: Receiver<Vec<u8>>,
    client_tx: Sender<ClientCommand>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name("modem".to_string()).spawn(move || {
        let mut codec = FrameCodec::new();

        for data in frames_rx.iter() {
            codec.push(&data);
            loop {
                let parcel = match codec.decode() {
                    Ok(Some(parcel)) => parcel,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("modem: bad frame: {}", e);
                        break;
                    }
                };

                let (serial, request) = match Request::decode(&parcel) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        warn!("modem: undecodable request: {}", e);
                        continue;
                    }
                };

                for message in modem.handle_request(serial, request) {
                    if client_tx.send(ClientCommand::Receive(message.encode_frame())).is_err() {
                        return;
                    }
                }
            }
        }
    })
}
