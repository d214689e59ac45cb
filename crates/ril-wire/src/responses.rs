//! Responses from the modem.
//!
//! A response parcel starts with its type. Solicited responses echo the
//! serial of the request they answer and carry the modem error code;
//! unsolicited responses carry their own code. The payload that follows is
//! decoded by the schema of the originating request (or unsolicited code).

use crate::constants::*;
use crate::error::*;
use crate::frame::FrameCodec;
use crate::parcel::{ParcelReader, ParcelWriter};
use crate::types::*;

/// A response parcel, split into header and undecoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Reply to a request.
    Solicited {
        /// Serial of the request being answered.
        serial: i32,
        /// Modem error code.
        error: ModemErrorCode,
        /// Payload, decoded according to the request's schema.
        payload: Vec<u8>,
    },

    /// Unprompted notification.
    Unsolicited {
        /// Unsolicited response code.
        code: i32,
        /// Payload, decoded according to `code`.
        payload: Vec<u8>,
    },
}

impl Message {
    /// Decode the header of a response parcel.
    pub fn decode(parcel: &[u8]) -> Result<Self, WireError> {
        let mut r = ParcelReader::new(parcel);
        match r.read_i32()? {
            RESPONSE_SOLICITED => {
                let serial = r.read_i32()?;
                let error = ModemErrorCode::from(r.read_i32()?);
                Ok(Message::Solicited {
                    serial,
                    error,
                    payload: r.rest().to_vec(),
                })
            }
            RESPONSE_UNSOLICITED => {
                let code = r.read_i32()?;
                Ok(Message::Unsolicited {
                    code,
                    payload: r.rest().to_vec(),
                })
            }
            other => Err(WireError::UnknownResponseType(other)),
        }
    }

    /// Encode the response parcel (modem side).
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ParcelWriter::new();
        match self {
            Message::Solicited {
                serial,
                error,
                payload,
            } => {
                w.write_i32(RESPONSE_SOLICITED);
                w.write_i32(*serial);
                w.write_i32(i32::from(*error));
                w.write_raw(payload);
            }
            Message::Unsolicited { code, payload } => {
                w.write_i32(RESPONSE_UNSOLICITED);
                w.write_i32(*code);
                w.write_raw(payload);
            }
        }
        w.into_bytes().to_vec()
    }

    /// Encode the response with its length prefix.
    pub fn encode_frame(&self) -> Vec<u8> {
        FrameCodec::encode(&self.encode())
    }
}

// ============================================================================
// Call list
// ============================================================================

/// Decode a GET_CURRENT_CALLS payload.
///
/// Fields are read in strict wire order; no vendor fixups are applied here.
/// A presentation code outside the CLIP range is kept as
/// [`Presentation::Invalid`].
pub fn decode_call_list(payload: &[u8]) -> Result<Vec<CallRecord>, WireError> {
    CallListReader::new(payload)?.collect()
}

/// Reads GET_CURRENT_CALLS entries one at a time.
///
/// Yields each entry as soon as it is decoded. After the first error the
/// reader is exhausted.
#[derive(Debug)]
pub struct CallListReader<'a> {
    reader: ParcelReader<'a>,
    remaining: usize,
}

impl<'a> CallListReader<'a> {
    /// Read the entry count and position the reader at the first entry.
    pub fn new(payload: &'a [u8]) -> Result<Self, WireError> {
        let mut reader = ParcelReader::new(payload);
        let remaining = read_count(&mut reader)?;
        Ok(CallListReader { reader, remaining })
    }
}

impl Iterator for CallListReader<'_> {
    type Item = Result<CallRecord, WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let entry = decode_call_record(&mut self.reader);
        if entry.is_err() {
            self.remaining = 0;
        }
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

fn decode_call_record(r: &mut ParcelReader<'_>) -> Result<CallRecord, WireError> {
    let state = CallState::from_clcc(r.read_i32()?)?;
    let index = r.read_i32()?;
    let toa = r.read_i32()?;
    let is_mpty = r.read_bool()?;
    let is_mt = r.read_bool()?;
    let als = r.read_i32()?;
    let is_voice = r.read_i32()? != 0;
    let is_voice_privacy = r.read_bool()?;
    let number = r.read_string()?;
    let number_presentation = Presentation::from_raw(r.read_i32()?);
    let name = r.read_string()?;
    let name_presentation = r.read_i32()?;

    let uus = if r.read_i32()? == 1 {
        let uus_type = r.read_i32()?;
        let dcs = r.read_i32()?;
        let data = r.read_byte_array()?.unwrap_or_default();
        Some(UusInfo {
            uus_type,
            dcs,
            data,
        })
    } else {
        None
    };

    Ok(CallRecord {
        state,
        index,
        toa,
        is_mpty,
        is_mt,
        als,
        is_voice,
        is_voice_privacy,
        number,
        number_presentation,
        name,
        name_presentation,
        uus,
    })
}

/// Encode a GET_CURRENT_CALLS payload (modem side).
pub fn encode_call_list(calls: &[CallRecord]) -> Vec<u8> {
    let mut w = ParcelWriter::new();
    w.write_i32(calls.len() as i32);
    for call in calls {
        w.write_i32(call.state.to_clcc());
        w.write_i32(call.index);
        w.write_i32(call.toa);
        w.write_bool(call.is_mpty);
        w.write_bool(call.is_mt);
        w.write_i32(call.als);
        w.write_bool(call.is_voice);
        w.write_bool(call.is_voice_privacy);
        w.write_string(call.number.as_deref());
        w.write_i32(call.number_presentation.to_clip());
        w.write_string(call.name.as_deref());
        w.write_i32(call.name_presentation);
        match &call.uus {
            Some(uus) => {
                w.write_i32(1);
                w.write_i32(uus.uus_type);
                w.write_i32(uus.dcs);
                w.write_byte_array(Some(&uus.data));
            }
            None => w.write_i32(0),
        }
    }
    w.into_bytes().to_vec()
}

// ============================================================================
// Data calls
// ============================================================================

/// Decode a DATA_CALL_LIST payload or a RIL_UNSOL_DATA_CALL_LIST_CHANGED payload.
pub fn decode_data_call_list(payload: &[u8]) -> Result<Vec<DataCallResponse>, WireError> {
    let mut r = ParcelReader::new(payload);
    let version = r.read_i32()?;
    let count = read_count(&mut r)?;
    let mut calls = Vec::with_capacity(count.min(16));

    for _ in 0..count {
        calls.push(decode_data_call(&mut r, version)?);
    }

    Ok(calls)
}

fn decode_data_call(r: &mut ParcelReader<'_>, version: i32) -> Result<DataCallResponse, WireError> {
    let mut call = DataCallResponse {
        version,
        suggested_retry_time: -1,
        ..Default::default()
    };

    if version < DATA_CALL_V5 {
        call.cid = r.read_i32()?;
        call.active = r.read_i32()?;
        call.pdp_type = r.read_string()?;
        call.addresses = split_list(r.read_string()?);
    } else {
        call.status = r.read_i32()?;
        call.suggested_retry_time = r.read_i32()?;
        call.cid = r.read_i32()?;
        call.active = r.read_i32()?;
        call.pdp_type = r.read_string()?;
        call.ifname = r.read_string()?;
        call.addresses = split_list(r.read_string()?);
        call.dnses = split_list(r.read_string()?);
        call.gateways = split_list(r.read_string()?);
    }

    Ok(call)
}

fn encode_data_call(w: &mut ParcelWriter, version: i32, call: &DataCallResponse) {
    if version < DATA_CALL_V5 {
        w.write_i32(call.cid);
        w.write_i32(call.active);
        w.write_string(call.pdp_type.as_deref());
        w.write_string(join_list(&call.addresses).as_deref());
    } else {
        w.write_i32(call.status);
        w.write_i32(call.suggested_retry_time);
        w.write_i32(call.cid);
        w.write_i32(call.active);
        w.write_string(call.pdp_type.as_deref());
        w.write_string(call.ifname.as_deref());
        w.write_string(join_list(&call.addresses).as_deref());
        w.write_string(join_list(&call.dnses).as_deref());
        w.write_string(join_list(&call.gateways).as_deref());
    }
}

/// Encode a data call list payload (modem side).
pub fn encode_data_call_list(version: i32, calls: &[DataCallResponse]) -> Vec<u8> {
    let mut w = ParcelWriter::new();
    w.write_i32(version);
    w.write_i32(calls.len() as i32);
    for call in calls {
        encode_data_call(&mut w, version, call);
    }
    w.into_bytes().to_vec()
}

/// Decode a SETUP_DATA_CALL payload for a modem speaking `version`.
///
/// Before v5 the reply is a string array (cid, ifname, addresses, dnses,
/// gateways). From v5 on it is exactly one data call entry.
pub fn decode_setup_data_call(payload: &[u8], version: i32) -> Result<DataCallResponse, WireError> {
    let mut r = ParcelReader::new(payload);
    let count = r.read_i32()?;

    if version >= DATA_CALL_V5 {
        if count != 1 {
            return Err(WireError::UnexpectedCount {
                what: "SETUP_DATA_CALL data calls",
                expected: 1,
                actual: count,
            });
        }
        return decode_data_call(&mut r, version);
    }

    if count < 1 {
        return Err(WireError::UnexpectedCount {
            what: "SETUP_DATA_CALL strings",
            expected: 1,
            actual: count,
        });
    }

    let mut fields = Vec::with_capacity((count as usize).min(8));
    for _ in 0..count {
        fields.push(r.read_string()?);
    }
    let mut fields = fields.into_iter();

    let cid_field = fields.next().flatten();
    let cid = cid_field
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or(WireError::InvalidField {
            field: "cid",
            value: -1,
        })?;

    Ok(DataCallResponse {
        version,
        status: 0,
        suggested_retry_time: -1,
        cid,
        active: 2,
        pdp_type: None,
        ifname: fields.next().flatten(),
        addresses: split_list(fields.next().flatten()),
        dnses: split_list(fields.next().flatten()),
        gateways: split_list(fields.next().flatten()),
    })
}

/// Encode a SETUP_DATA_CALL payload (modem side).
pub fn encode_setup_data_call(version: i32, call: &DataCallResponse) -> Vec<u8> {
    let mut w = ParcelWriter::new();
    if version >= DATA_CALL_V5 {
        w.write_i32(1);
        encode_data_call(&mut w, version, call);
    } else {
        w.write_i32(5);
        w.write_string(Some(&call.cid.to_string()));
        w.write_string(call.ifname.as_deref());
        w.write_string(join_list(&call.addresses).as_deref());
        w.write_string(join_list(&call.dnses).as_deref());
        w.write_string(join_list(&call.gateways).as_deref());
    }
    w.into_bytes().to_vec()
}

// ============================================================================
// Unsolicited payloads
// ============================================================================

/// Decode a RIL_UNSOL_SUPP_SVC_NOTIFICATION payload.
pub fn decode_supp_service_notification(payload: &[u8]) -> Result<SuppServiceNotification, WireError> {
    let mut r = ParcelReader::new(payload);
    Ok(SuppServiceNotification {
        notification_type: r.read_i32()?,
        code: r.read_i32()?,
        index: r.read_i32()?,
        toa: r.read_i32()?,
        number: r.read_string()?,
    })
}

/// Encode a RIL_UNSOL_SUPP_SVC_NOTIFICATION payload (modem side).
pub fn encode_supp_service_notification(notification: &SuppServiceNotification) -> Vec<u8> {
    let mut w = ParcelWriter::new();
    w.write_i32(notification.notification_type);
    w.write_i32(notification.code);
    w.write_i32(notification.index);
    w.write_i32(notification.toa);
    w.write_string(notification.number.as_deref());
    w.into_bytes().to_vec()
}

/// Decode a RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED payload.
pub fn decode_radio_state(payload: &[u8]) -> Result<RadioState, WireError> {
    let mut r = ParcelReader::new(payload);
    RadioState::from_wire(r.read_i32()?)
}

/// Encode a RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED payload (modem side).
pub fn encode_radio_state(state: RadioState) -> Vec<u8> {
    let mut w = ParcelWriter::new();
    w.write_i32(state.to_wire());
    w.into_bytes().to_vec()
}

fn read_count(r: &mut ParcelReader<'_>) -> Result<usize, WireError> {
    let offset = r.position();
    let count = r.read_i32()?;
    if count < 0 {
        return Err(WireError::InvalidLength {
            offset,
            length: count,
        });
    }
    Ok(count as usize)
}
