//! Wire error types.

use thiserror::Error;

/// Errors that can occur when encoding or decoding RIL parcels and frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A read ran past the end of the parcel.
    #[error("parcel truncated at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Offset of the failed read.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Bytes left in the parcel.
        remaining: usize,
    },

    /// A length prefix was negative (and not the null marker) or absurd.
    #[error("invalid length {length} at offset {offset}")]
    InvalidLength {
        /// Offset of the length field.
        offset: usize,
        /// Length that was read.
        length: i32,
    },

    /// A string field was not valid UTF-16.
    #[error("invalid UTF-16 in string field at offset {0}")]
    InvalidUtf16(usize),

    /// Frame is too long.
    #[error("frame too long: maximum {max} bytes, got {actual}")]
    FrameTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Declared length.
        actual: usize,
    },

    /// Response type was neither solicited nor unsolicited.
    #[error("unknown response type: {0}")]
    UnknownResponseType(i32),

    /// Request code not known to this codec.
    #[error("unknown request code: {0}")]
    UnknownRequest(i32),

    /// A field held a value outside its domain.
    #[error("invalid value {value} for field '{field}'")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Value received.
        value: i32,
    },

    /// A count field did not match the schema.
    #[error("expected {expected} entries in {what}, got {actual}")]
    UnexpectedCount {
        /// What was being counted.
        what: &'static str,
        /// Count the schema requires.
        expected: i32,
        /// Count received.
        actual: i32,
    },
}

/// Error codes returned by the modem in solicited responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModemErrorCode {
    Success,
    RadioNotAvailable,
    GenericFailure,
    PasswordIncorrect,
    SimPin2,
    SimPuk2,
    RequestNotSupported,
    Cancelled,
    OpNotAllowedDuringVoiceCall,
    OpNotAllowedBeforeRegToNw,
    SmsSendFailRetry,
    SimAbsent,
    SubscriptionNotAvailable,
    ModeNotSupported,
    FdnCheckFailure,
    IllegalSimOrMe,
    /// Code outside the reference set.
    Other(i32),
}

impl ModemErrorCode {
    /// Whether this code reports success.
    pub fn is_success(&self) -> bool {
        matches!(self, ModemErrorCode::Success)
    }
}

impl std::fmt::Display for ModemErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModemErrorCode::Success => write!(f, "success"),
            ModemErrorCode::RadioNotAvailable => write!(f, "radio not available"),
            ModemErrorCode::GenericFailure => write!(f, "generic failure"),
            ModemErrorCode::PasswordIncorrect => write!(f, "password incorrect"),
            ModemErrorCode::SimPin2 => write!(f, "SIM PIN2 required"),
            ModemErrorCode::SimPuk2 => write!(f, "SIM PUK2 required"),
            ModemErrorCode::RequestNotSupported => write!(f, "request not supported"),
            ModemErrorCode::Cancelled => write!(f, "cancelled"),
            ModemErrorCode::OpNotAllowedDuringVoiceCall => {
                write!(f, "operation not allowed during voice call")
            }
            ModemErrorCode::OpNotAllowedBeforeRegToNw => {
                write!(f, "operation not allowed before network registration")
            }
            ModemErrorCode::SmsSendFailRetry => write!(f, "SMS send failed, retry"),
            ModemErrorCode::SimAbsent => write!(f, "SIM absent"),
            ModemErrorCode::SubscriptionNotAvailable => write!(f, "subscription not available"),
            ModemErrorCode::ModeNotSupported => write!(f, "mode not supported"),
            ModemErrorCode::FdnCheckFailure => write!(f, "FDN check failure"),
            ModemErrorCode::IllegalSimOrMe => write!(f, "illegal SIM or ME"),
            ModemErrorCode::Other(code) => write!(f, "unknown error ({})", code),
        }
    }
}

impl From<i32> for ModemErrorCode {
    fn from(code: i32) -> Self {
        use crate::constants::*;
        match code {
            RIL_E_SUCCESS => ModemErrorCode::Success,
            RIL_E_RADIO_NOT_AVAILABLE => ModemErrorCode::RadioNotAvailable,
            RIL_E_GENERIC_FAILURE => ModemErrorCode::GenericFailure,
            RIL_E_PASSWORD_INCORRECT => ModemErrorCode::PasswordIncorrect,
            RIL_E_SIM_PIN2 => ModemErrorCode::SimPin2,
            RIL_E_SIM_PUK2 => ModemErrorCode::SimPuk2,
            RIL_E_REQUEST_NOT_SUPPORTED => ModemErrorCode::RequestNotSupported,
            RIL_E_CANCELLED => ModemErrorCode::Cancelled,
            RIL_E_OP_NOT_ALLOWED_DURING_VOICE_CALL => ModemErrorCode::OpNotAllowedDuringVoiceCall,
            RIL_E_OP_NOT_ALLOWED_BEFORE_REG_TO_NW => ModemErrorCode::OpNotAllowedBeforeRegToNw,
            RIL_E_SMS_SEND_FAIL_RETRY => ModemErrorCode::SmsSendFailRetry,
            RIL_E_SIM_ABSENT => ModemErrorCode::SimAbsent,
            RIL_E_SUBSCRIPTION_NOT_AVAILABLE => ModemErrorCode::SubscriptionNotAvailable,
            RIL_E_MODE_NOT_SUPPORTED => ModemErrorCode::ModeNotSupported,
            RIL_E_FDN_CHECK_FAILURE => ModemErrorCode::FdnCheckFailure,
            RIL_E_ILLEGAL_SIM_OR_ME => ModemErrorCode::IllegalSimOrMe,
            _ => ModemErrorCode::Other(code),
        }
    }
}

impl From<ModemErrorCode> for i32 {
    fn from(code: ModemErrorCode) -> Self {
        use crate::constants::*;
        match code {
            ModemErrorCode::Success => RIL_E_SUCCESS,
            ModemErrorCode::RadioNotAvailable => RIL_E_RADIO_NOT_AVAILABLE,
            ModemErrorCode::GenericFailure => RIL_E_GENERIC_FAILURE,
            ModemErrorCode::PasswordIncorrect => RIL_E_PASSWORD_INCORRECT,
            ModemErrorCode::SimPin2 => RIL_E_SIM_PIN2,
            ModemErrorCode::SimPuk2 => RIL_E_SIM_PUK2,
            ModemErrorCode::RequestNotSupported => RIL_E_REQUEST_NOT_SUPPORTED,
            ModemErrorCode::Cancelled => RIL_E_CANCELLED,
            ModemErrorCode::OpNotAllowedDuringVoiceCall => RIL_E_OP_NOT_ALLOWED_DURING_VOICE_CALL,
            ModemErrorCode::OpNotAllowedBeforeRegToNw => RIL_E_OP_NOT_ALLOWED_BEFORE_REG_TO_NW,
            ModemErrorCode::SmsSendFailRetry => RIL_E_SMS_SEND_FAIL_RETRY,
            ModemErrorCode::SimAbsent => RIL_E_SIM_ABSENT,
            ModemErrorCode::SubscriptionNotAvailable => RIL_E_SUBSCRIPTION_NOT_AVAILABLE,
            ModemErrorCode::ModeNotSupported => RIL_E_MODE_NOT_SUPPORTED,
            ModemErrorCode::FdnCheckFailure => RIL_E_FDN_CHECK_FAILURE,
            ModemErrorCode::IllegalSimOrMe => RIL_E_ILLEGAL_SIM_OR_ME,
            ModemErrorCode::Other(code) => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_conversion() {
        assert_eq!(ModemErrorCode::from(2), ModemErrorCode::GenericFailure);
        assert_eq!(ModemErrorCode::from(1), ModemErrorCode::RadioNotAvailable);
        assert_eq!(ModemErrorCode::from(99), ModemErrorCode::Other(99));
        assert_eq!(i32::from(ModemErrorCode::Other(99)), 99);
        assert_eq!(i32::from(ModemErrorCode::IllegalSimOrMe), 15);
        assert!(ModemErrorCode::from(0).is_success());
    }

    #[test]
    fn test_error_display() {
        let err = WireError::Truncated {
            offset: 12,
            needed: 4,
            remaining: 1,
        };
        assert!(err.to_string().contains("offset 12"));
        assert_eq!(ModemErrorCode::Other(42).to_string(), "unknown error (42)");
    }
}
