//! Requests that can be sent to the modem.

use crate::constants::*;
use crate::error::WireError;
use crate::frame::FrameCodec;
use crate::parcel::{ParcelReader, ParcelWriter};
use crate::types::SetupDataCallParams;

/// Request codes understood by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestCode {
    GetCurrentCalls,
    RadioPower,
    SetupDataCall,
    DeactivateDataCall,
    DataCallList,
}

impl RequestCode {
    /// Wire value of the code.
    pub fn code(self) -> i32 {
        match self {
            RequestCode::GetCurrentCalls => RIL_REQUEST_GET_CURRENT_CALLS,
            RequestCode::RadioPower => RIL_REQUEST_RADIO_POWER,
            RequestCode::SetupDataCall => RIL_REQUEST_SETUP_DATA_CALL,
            RequestCode::DeactivateDataCall => RIL_REQUEST_DEACTIVATE_DATA_CALL,
            RequestCode::DataCallList => RIL_REQUEST_DATA_CALL_LIST,
        }
    }

    /// Name used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            RequestCode::GetCurrentCalls => "GET_CURRENT_CALLS",
            RequestCode::RadioPower => "RADIO_POWER",
            RequestCode::SetupDataCall => "SETUP_DATA_CALL",
            RequestCode::DeactivateDataCall => "DEACTIVATE_DATA_CALL",
            RequestCode::DataCallList => "DATA_CALL_LIST",
        }
    }
}

impl TryFrom<i32> for RequestCode {
    type Error = WireError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            RIL_REQUEST_GET_CURRENT_CALLS => Ok(RequestCode::GetCurrentCalls),
            RIL_REQUEST_RADIO_POWER => Ok(RequestCode::RadioPower),
            RIL_REQUEST_SETUP_DATA_CALL => Ok(RequestCode::SetupDataCall),
            RIL_REQUEST_DEACTIVATE_DATA_CALL => Ok(RequestCode::DeactivateDataCall),
            RIL_REQUEST_DATA_CALL_LIST => Ok(RequestCode::DataCallList),
            other => Err(WireError::UnknownRequest(other)),
        }
    }
}

impl std::fmt::Display for RequestCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Requests that can be sent to the modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Fetch the current call list.
    GetCurrentCalls,

    /// Power the transceiver on or off.
    RadioPower {
        /// Requested state.
        on: bool,
    },

    /// Bring up a data connection.
    SetupDataCall(SetupDataCallParams),

    /// Tear down a data connection.
    DeactivateDataCall {
        /// Connection id.
        cid: i32,
        /// Deactivation reason (0 = none, 1 = radio shutdown).
        reason: i32,
    },

    /// Fetch the data connection list.
    DataCallList,
}

impl Request {
    /// Get the request code.
    pub fn code(&self) -> RequestCode {
        match self {
            Request::GetCurrentCalls => RequestCode::GetCurrentCalls,
            Request::RadioPower { .. } => RequestCode::RadioPower,
            Request::SetupDataCall(_) => RequestCode::SetupDataCall,
            Request::DeactivateDataCall { .. } => RequestCode::DeactivateDataCall,
            Request::DataCallList => RequestCode::DataCallList,
        }
    }

    /// Encode the request parcel: code, serial, then the payload fields.
    pub fn encode(&self, serial: i32) -> Vec<u8> {
        let mut w = ParcelWriter::new();
        w.write_i32(self.code().code());
        w.write_i32(serial);

        match self {
            Request::GetCurrentCalls | Request::DataCallList => {}

            Request::RadioPower { on } => {
                w.write_i32(1);
                w.write_bool(*on);
            }

            Request::SetupDataCall(params) => {
                // Fixed count, no per-field length table.
                w.write_i32(SETUP_DATA_CALL_FIELD_COUNT);
                w.write_string(Some(&params.radio_technology));
                w.write_string(Some(&params.profile));
                w.write_string(Some(&params.apn));
                w.write_string(Some(&params.user));
                w.write_string(Some(&params.password));
                w.write_string(Some(&params.auth_type));
                w.write_string(Some(&params.protocol));
            }

            Request::DeactivateDataCall { cid, reason } => {
                w.write_i32(2);
                w.write_string(Some(&cid.to_string()));
                w.write_string(Some(&reason.to_string()));
            }
        }

        w.into_bytes().to_vec()
    }

    /// Encode the request with its length prefix, ready for the socket.
    pub fn encode_frame(&self, serial: i32) -> Vec<u8> {
        FrameCodec::encode(&self.encode(serial))
    }

    /// Decode a request parcel (modem side). Returns the serial and request.
    pub fn decode(parcel: &[u8]) -> Result<(i32, Request), WireError> {
        let mut r = ParcelReader::new(parcel);
        let code = RequestCode::try_from(r.read_i32()?)?;
        let serial = r.read_i32()?;

        let request = match code {
            RequestCode::GetCurrentCalls => Request::GetCurrentCalls,
            RequestCode::DataCallList => Request::DataCallList,

            RequestCode::RadioPower => {
                expect_count(&mut r, "RADIO_POWER ints", 1)?;
                Request::RadioPower { on: r.read_bool()? }
            }

            RequestCode::SetupDataCall => {
                expect_count(&mut r, "SETUP_DATA_CALL strings", SETUP_DATA_CALL_FIELD_COUNT)?;
                // Struct fields are evaluated in source order, which is wire order.
                Request::SetupDataCall(SetupDataCallParams {
                    radio_technology: r.read_string()?.unwrap_or_default(),
                    profile: r.read_string()?.unwrap_or_default(),
                    apn: r.read_string()?.unwrap_or_default(),
                    user: r.read_string()?.unwrap_or_default(),
                    password: r.read_string()?.unwrap_or_default(),
                    auth_type: r.read_string()?.unwrap_or_default(),
                    protocol: r.read_string()?.unwrap_or_default(),
                })
            }

            RequestCode::DeactivateDataCall => {
                expect_count(&mut r, "DEACTIVATE_DATA_CALL strings", 2)?;
                let cid = parse_decimal(r.read_string()?, "cid")?;
                let reason = parse_decimal(r.read_string()?, "reason")?;
                Request::DeactivateDataCall { cid, reason }
            }
        };

        Ok((serial, request))
    }
}

fn expect_count(r: &mut ParcelReader<'_>, what: &'static str, expected: i32) -> Result<(), WireError> {
    let actual = r.read_i32()?;
    if actual != expected {
        return Err(WireError::UnexpectedCount {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

fn parse_decimal(value: Option<String>, field: &'static str) -> Result<i32, WireError> {
    value
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or(WireError::InvalidField { field, value: -1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SetupDataCallParams {
        SetupDataCallParams {
            radio_technology: "1".to_string(),
            profile: "0".to_string(),
            apn: "internet".to_string(),
            user: "".to_string(),
            password: "".to_string(),
            auth_type: "0".to_string(),
            protocol: "IP".to_string(),
        }
    }

    #[test]
    fn test_setup_data_call_layout() {
        let parcel = Request::SetupDataCall(params()).encode(42);
        let mut r = ParcelReader::new(&parcel);
        assert_eq!(r.read_i32().unwrap(), RIL_REQUEST_SETUP_DATA_CALL);
        assert_eq!(r.read_i32().unwrap(), 42);
        assert_eq!(r.read_i32().unwrap(), 7);
        let fields: Vec<String> = (0..7).map(|_| r.read_string().unwrap().unwrap()).collect();
        assert_eq!(fields, vec!["1", "0", "internet", "", "", "0", "IP"]);
        assert!(r.is_empty());
    }

    #[test]
    fn test_decode_requests() {
        let (serial, req) = Request::decode(&Request::SetupDataCall(params()).encode(3)).unwrap();
        assert_eq!(serial, 3);
        assert_eq!(req, Request::SetupDataCall(params()));

        let (_, req) = Request::decode(&Request::RadioPower { on: true }.encode(4)).unwrap();
        assert_eq!(req, Request::RadioPower { on: true });

        let deactivate = Request::DeactivateDataCall { cid: 2, reason: 1 };
        let (_, req) = Request::decode(&deactivate.encode(5)).unwrap();
        assert_eq!(req, deactivate);
    }

    #[test]
    fn test_unknown_request_code() {
        let mut w = ParcelWriter::new();
        w.write_i32(999);
        w.write_i32(1);
        assert_eq!(
            Request::decode(w.as_slice()),
            Err(WireError::UnknownRequest(999))
        );
    }

    #[test]
    fn test_request_names() {
        assert_eq!(RequestCode::SetupDataCall.to_string(), "SETUP_DATA_CALL");
        assert_eq!(RequestCode::try_from(23).unwrap(), RequestCode::RadioPower);
    }
}
