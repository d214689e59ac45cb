//! Scenario files.
//!
//! A scenario configures the client, scripts the simulated modem and lists
//! the steps to run against it:
//!
//! ```yaml
//! client:
//!   setup_timeout_ms: 500
//! modem:
//!   setup_replies: [generic_failure, silent, success]
//!   calls:
//!     - { index: 1, number: "4930123", toa: 145, is_mt: true }
//! steps:
//!   - set_radio_power: true
//!   - setup_data_call: { apn: internet }
//!   - wait_ms: 100
//!   - get_current_calls
//! ```

use std::path::Path;

use ril_client::ClientConfig;
use ril_wire::{
    CallRecord, CallState, Presentation, SetupDataCallParams, SuppServiceNotification, WireError,
    TOA_UNKNOWN,
};
use serde::Deserialize;

use crate::error::SimError;

fn default_ril_version() -> i32 {
    6
}

fn default_toa() -> i32 {
    TOA_UNKNOWN
}

fn default_first_cid() -> i32 {
    1
}

/// A complete scenario.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    /// Client configuration.
    #[serde(default)]
    pub client: ClientConfig,

    /// How the simulated modem behaves.
    #[serde(default)]
    pub modem: ModemScript,

    /// Steps to run, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse a scenario from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SimError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Scripted modem behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ModemScript {
    /// RIL version the modem encodes data call replies with.
    #[serde(default = "default_ril_version")]
    pub ril_version: i32,

    /// Replies to successive SETUP_DATA_CALL requests; success once exhausted.
    #[serde(default)]
    pub setup_replies: Vec<ReplyMode>,

    /// Connection id handed out to the first successful setup.
    #[serde(default = "default_first_cid")]
    pub first_cid: i32,

    /// Calls reported by GET_CURRENT_CALLS.
    #[serde(default)]
    pub calls: Vec<CallEntry>,
}

impl Default for ModemScript {
    fn default() -> Self {
        ModemScript {
            ril_version: default_ril_version(),
            setup_replies: Vec::new(),
            first_cid: default_first_cid(),
            calls: Vec::new(),
        }
    }
}

/// How the modem answers a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyMode {
    /// Answer with success.
    Success,
    /// Answer with GENERIC_FAILURE.
    GenericFailure,
    /// Answer with RADIO_NOT_AVAILABLE.
    RadioNotAvailable,
    /// Answer with an arbitrary error code.
    Error(i32),
    /// Never answer.
    Silent,
}

/// One call in the modem's call list, with raw CLCC/CLIP codes.
#[derive(Debug, Clone, Deserialize)]
pub struct CallEntry {
    pub index: i32,
    #[serde(default)]
    pub state: i32,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default = "default_toa")]
    pub toa: i32,
    #[serde(default)]
    pub is_mt: bool,
    #[serde(default)]
    pub presentation: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub voice_privacy: bool,
}

impl CallEntry {
    /// Build the call record the modem reports.
    pub fn to_record(&self) -> Result<CallRecord, WireError> {
        Ok(CallRecord {
            state: CallState::from_clcc(self.state)?,
            index: self.index,
            toa: self.toa,
            is_mt: self.is_mt,
            is_voice_privacy: self.voice_privacy,
            number: self.number.clone(),
            number_presentation: Presentation::from_clip(self.presentation)?,
            name: self.name.clone(),
            ..Default::default()
        })
    }
}

/// SETUP_DATA_CALL parameters, with the usual GSM/UMTS defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SetupStep {
    pub radio_technology: String,
    pub profile: String,
    pub apn: String,
    pub user: String,
    pub password: String,
    pub auth_type: String,
    pub protocol: String,
}

impl Default for SetupStep {
    fn default() -> Self {
        SetupStep {
            radio_technology: "1".to_string(),
            profile: "0".to_string(),
            apn: "internet".to_string(),
            user: String::new(),
            password: String::new(),
            auth_type: "0".to_string(),
            protocol: "IP".to_string(),
        }
    }
}

impl From<SetupStep> for SetupDataCallParams {
    fn from(entry: SetupStep) -> Self {
        SetupDataCallParams {
            radio_technology: entry.radio_technology,
            profile: entry.profile,
            apn: entry.apn,
            user: entry.user,
            password: entry.password,
            auth_type: entry.auth_type,
            protocol: entry.protocol,
        }
    }
}

/// A supplementary service notification pushed by the modem.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationStep {
    #[serde(rename = "type")]
    pub notification_type: i32,
    pub code: i32,
    #[serde(default)]
    pub index: i32,
    #[serde(default = "default_toa")]
    pub toa: i32,
    #[serde(default)]
    pub number: Option<String>,
}

impl From<NotificationStep> for SuppServiceNotification {
    fn from(entry: NotificationStep) -> Self {
        SuppServiceNotification {
            notification_type: entry.notification_type,
            code: entry.code,
            index: entry.index,
            toa: entry.toa,
            number: entry.number,
        }
    }
}

/// One scenario step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Request radio power on or off.
    SetRadioPower(bool),
    /// Bring up a data connection.
    SetupDataCall(SetupStep),
    /// Tear down a data connection.
    DeactivateDataCall {
        cid: i32,
        #[serde(default)]
        reason: i32,
    },
    /// Fetch the call list.
    GetCurrentCalls,
    /// Fetch the data connection list.
    GetDataCallList,
    /// Have the modem push a supplementary service notification.
    SuppServiceNotification(NotificationStep),
    /// Sleep, printing any indications that arrive.
    WaitMs(u64),
}

impl Step {
    /// Step name for output.
    pub fn name(&self) -> &'static str {
        match self {
            Step::SetRadioPower(_) => "set_radio_power",
            Step::SetupDataCall(_) => "setup_data_call",
            Step::DeactivateDataCall { .. } => "deactivate_data_call",
            Step::GetCurrentCalls => "get_current_calls",
            Step::GetDataCallList => "get_data_call_list",
            Step::SuppServiceNotification(_) => "supp_service_notification",
            Step::WaitMs(_) => "wait_ms",
        }
    }
}
