//! Wrigley RIL socket protocol
//!
//! This crate provides types and utilities for talking to a radio modem over
//! the RIL socket. Every message is an Android-style parcel wrapped in a
//! length-prefixed frame.
//!
//! # Protocol Overview
//!
//! - **Requests** (client → modem): request code, serial, then the request's
//!   fields
//! - **Solicited responses** (modem → client): type 0, echoed serial, modem
//!   error code, then the payload for the originating request
//! - **Unsolicited responses** (modem → client): type 1, unsolicited code,
//!   then its payload
//!
//! Payloads carry no type tags, so a solicited payload can only be decoded
//! once the request it answers is known.
//!
//! # Example
//!
//! ```rust,ignore
//! use ril_wire::{Message, Request, decode_call_list};
//!
//! // Build a request
//! let frame = Request::GetCurrentCalls.encode_frame(7);
//!
//! // Parse a response
//! if let Message::Solicited { serial, payload, .. } = Message::decode(&parcel)? {
//!     let calls = decode_call_list(&payload)?;
//! }
//! ```

mod commands;
mod constants;
mod error;
mod frame;
mod parcel;
mod responses;
mod types;

pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use parcel::*;
pub use responses::*;
pub use types::*;
