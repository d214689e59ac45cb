//! Common types carried in RIL requests and responses.

use crate::error::WireError;

/// State of a call as reported by `+CLCC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    Active,
    Holding,
    Dialing,
    Alerting,
    Incoming,
    Waiting,
}

impl CallState {
    /// Map a CLCC state code.
    pub fn from_clcc(code: i32) -> Result<Self, WireError> {
        match code {
            0 => Ok(CallState::Active),
            1 => Ok(CallState::Holding),
            2 => Ok(CallState::Dialing),
            3 => Ok(CallState::Alerting),
            4 => Ok(CallState::Incoming),
            5 => Ok(CallState::Waiting),
            value => Err(WireError::InvalidField {
                field: "call state",
                value,
            }),
        }
    }

    /// The CLCC state code.
    pub fn to_clcc(self) -> i32 {
        match self {
            CallState::Active => 0,
            CallState::Holding => 1,
            CallState::Dialing => 2,
            CallState::Alerting => 3,
            CallState::Incoming => 4,
            CallState::Waiting => 5,
        }
    }
}

/// Caller-ID presentation as reported by `+CLIP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presentation {
    #[default]
    Allowed,
    Restricted,
    Unknown,
    Payphone,
    /// Code outside the CLIP range, kept as received.
    Invalid(i32),
}

impl Presentation {
    /// Map a CLIP presentation code, rejecting codes outside the range.
    pub fn from_clip(code: i32) -> Result<Self, WireError> {
        match code {
            0 => Ok(Presentation::Allowed),
            1 => Ok(Presentation::Restricted),
            2 => Ok(Presentation::Unknown),
            3 => Ok(Presentation::Payphone),
            value => Err(WireError::InvalidField {
                field: "number presentation",
                value,
            }),
        }
    }

    /// Map a CLIP presentation code as read off the wire.
    pub fn from_raw(code: i32) -> Self {
        Self::from_clip(code).unwrap_or(Presentation::Invalid(code))
    }

    /// The CLIP presentation code.
    pub fn to_clip(self) -> i32 {
        match self {
            Presentation::Allowed => 0,
            Presentation::Restricted => 1,
            Presentation::Unknown => 2,
            Presentation::Payphone => 3,
            Presentation::Invalid(code) => code,
        }
    }
}

/// User-to-user signalling attached to a call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UusInfo {
    /// UUS type.
    pub uus_type: i32,
    /// Data coding scheme.
    pub dcs: i32,
    /// Raw user data.
    pub data: Vec<u8>,
}

/// One entry of the current call list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// Call state.
    pub state: CallState,
    /// Connection index used by call control commands.
    pub index: i32,
    /// Type of address of `number` (145 = international).
    pub toa: i32,
    /// Part of a multiparty call.
    pub is_mpty: bool,
    /// Mobile terminated (incoming) call.
    pub is_mt: bool,
    /// Alternate line service class.
    pub als: i32,
    /// Voice call (as opposed to data/fax).
    pub is_voice: bool,
    /// Voice privacy active on this call.
    pub is_voice_privacy: bool,
    /// Remote party number.
    pub number: Option<String>,
    /// Number presentation.
    pub number_presentation: Presentation,
    /// Remote party name.
    pub name: Option<String>,
    /// Name presentation, as sent by the modem.
    pub name_presentation: i32,
    /// User-to-user signalling, if present.
    pub uus: Option<UusInfo>,
}

impl Default for CallRecord {
    fn default() -> Self {
        CallRecord {
            state: CallState::Active,
            index: 1,
            toa: crate::constants::TOA_UNKNOWN,
            is_mpty: false,
            is_mt: false,
            als: 0,
            is_voice: true,
            is_voice_privacy: false,
            number: None,
            number_presentation: Presentation::Allowed,
            name: None,
            name_presentation: 0,
            uus: None,
        }
    }
}

/// One packet data connection, in the reference data-call schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataCallResponse {
    /// RIL version the entry was encoded with.
    pub version: i32,
    /// Fail cause (v5+, 0 = none).
    pub status: i32,
    /// Suggested retry delay in milliseconds (v5+, -1 = none).
    pub suggested_retry_time: i32,
    /// Connection id.
    pub cid: i32,
    /// 0 inactive, 1 dormant, 2 up.
    pub active: i32,
    /// PDP type ("IP", "IPV6", "IPV4V6").
    pub pdp_type: Option<String>,
    /// Network interface name (v5+).
    pub ifname: Option<String>,
    /// Assigned addresses.
    pub addresses: Vec<String>,
    /// DNS servers (v5+).
    pub dnses: Vec<String>,
    /// Gateways (v5+).
    pub gateways: Vec<String>,
}

/// Split a space-separated address list.
pub fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Join an address list for the wire (`None` when empty).
pub fn join_list(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(" "))
    }
}

/// Supplementary service notification (`+CSSI` / `+CSSU`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuppServiceNotification {
    /// 0 = MO (`+CSSI`), 1 = MT (`+CSSU`).
    pub notification_type: i32,
    /// Notification code, meaning depends on the type.
    pub code: i32,
    /// Closed user group index.
    pub index: i32,
    /// Type of address of `number`.
    pub toa: i32,
    /// Associated number.
    pub number: Option<String>,
}

/// Parameters of a SETUP_DATA_CALL request, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetupDataCallParams {
    /// Radio technology ("0" CDMA, "1" GSM/UMTS, or RIL_RadioTechnology + 2).
    pub radio_technology: String,
    /// Data profile.
    pub profile: String,
    /// Access point name.
    pub apn: String,
    /// APN user name.
    pub user: String,
    /// APN password.
    pub password: String,
    /// Authentication type ("0" none .. "3" PAP or CHAP).
    pub auth_type: String,
    /// PDP protocol ("IP", "IPV6", "IPV4V6").
    pub protocol: String,
}

/// Radio state reported by RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioState {
    Off,
    Unavailable,
    On,
}

impl RadioState {
    /// Map the wire value; 2..=9 are the legacy per-technology "on" states.
    pub fn from_wire(value: i32) -> Result<Self, WireError> {
        match value {
            0 => Ok(RadioState::Off),
            1 => Ok(RadioState::Unavailable),
            2..=10 => Ok(RadioState::On),
            value => Err(WireError::InvalidField {
                field: "radio state",
                value,
            }),
        }
    }

    /// The wire value.
    pub fn to_wire(self) -> i32 {
        match self {
            RadioState::Off => 0,
            RadioState::Unavailable => 1,
            RadioState::On => 10,
        }
    }
}
