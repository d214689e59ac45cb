//! Protocol constants
//!
//! These constants define the request codes, unsolicited response codes,
//! error codes, and other protocol-specific values used on the RIL socket.

// ============================================================================
// Request Codes (host → modem)
// ============================================================================

/// Query the current call list.
pub const RIL_REQUEST_GET_CURRENT_CALLS: i32 = 9;
/// Turn the radio transceiver on or off.
pub const RIL_REQUEST_RADIO_POWER: i32 = 23;
/// Bring up a packet data connection.
pub const RIL_REQUEST_SETUP_DATA_CALL: i32 = 27;
/// Tear down a packet data connection.
pub const RIL_REQUEST_DEACTIVATE_DATA_CALL: i32 = 41;
/// Query the list of data connections.
pub const RIL_REQUEST_DATA_CALL_LIST: i32 = 57;

// ============================================================================
// Unsolicited Response Codes (modem → host)
// ============================================================================

/// Radio state changed.
pub const RIL_UNSOL_RESPONSE_RADIO_STATE_CHANGED: i32 = 1000;
/// The data connection list changed.
pub const RIL_UNSOL_DATA_CALL_LIST_CHANGED: i32 = 1010;
/// Supplementary service notification.
pub const RIL_UNSOL_SUPP_SVC_NOTIFICATION: i32 = 1011;

// ============================================================================
// Response Types
// ============================================================================

/// Reply to a request, carries serial and error.
pub const RESPONSE_SOLICITED: i32 = 0;
/// Unprompted notification from the modem.
pub const RESPONSE_UNSOLICITED: i32 = 1;

// ============================================================================
// Error Codes
// ============================================================================

pub const RIL_E_SUCCESS: i32 = 0;
pub const RIL_E_RADIO_NOT_AVAILABLE: i32 = 1;
pub const RIL_E_GENERIC_FAILURE: i32 = 2;
pub const RIL_E_PASSWORD_INCORRECT: i32 = 3;
pub const RIL_E_SIM_PIN2: i32 = 4;
pub const RIL_E_SIM_PUK2: i32 = 5;
pub const RIL_E_REQUEST_NOT_SUPPORTED: i32 = 6;
pub const RIL_E_CANCELLED: i32 = 7;
pub const RIL_E_OP_NOT_ALLOWED_DURING_VOICE_CALL: i32 = 8;
pub const RIL_E_OP_NOT_ALLOWED_BEFORE_REG_TO_NW: i32 = 9;
pub const RIL_E_SMS_SEND_FAIL_RETRY: i32 = 10;
pub const RIL_E_SIM_ABSENT: i32 = 11;
pub const RIL_E_SUBSCRIPTION_NOT_AVAILABLE: i32 = 12;
pub const RIL_E_MODE_NOT_SUPPORTED: i32 = 13;
pub const RIL_E_FDN_CHECK_FAILURE: i32 = 14;
pub const RIL_E_ILLEGAL_SIM_OR_ME: i32 = 15;

// ============================================================================
// Field Values
// ============================================================================

/// Type-of-address for numbers in international format.
pub const TOA_INTERNATIONAL: i32 = 145;
/// Type-of-address for unknown/national numbers.
pub const TOA_UNKNOWN: i32 = 129;

/// Supplementary service notification sent for a mobile originated call.
pub const SUPP_SVC_NOTIFICATION_MO: i32 = 0;
/// Supplementary service notification sent for a mobile terminated call.
pub const SUPP_SVC_NOTIFICATION_MT: i32 = 1;

/// MT code: this is a forwarded call.
pub const MT_CODE_FORWARDED_CALL: i32 = 0;
/// MT code: an additional incoming call was forwarded.
pub const MT_CODE_ADDITIONAL_CALL_FORWARDED: i32 = 10;

/// Number of string fields in a SETUP_DATA_CALL request.
pub const SETUP_DATA_CALL_FIELD_COUNT: i32 = 7;

/// First RIL version whose data call entries carry status and interface info.
pub const DATA_CALL_V5: i32 = 5;

/// Maximum size of a single frame (excluding the length prefix).
pub const MAX_FRAME_SIZE: usize = 8 * 1024;
