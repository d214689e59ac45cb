//! RIL client for the Motorola Wrigley 3G modem.
//!
//! This crate sits between the telephony stack and the modem. It sends
//! requests, matches the modem's responses to them by serial number, fixes up
//! the places where this modem deviates from the reference command set, and
//! recovers from spurious data call setup failures by power cycling the
//! radio.
//!
//! # Components
//!
//! - [`RequestRegistry`]: in-flight requests keyed by serial, plus the single
//!   tracked SETUP_DATA_CALL used by the timeout watchdog
//! - [`normalize`]: pure vendor fixups applied after decoding
//! - [`recovery`]: the data call recovery state machine
//! - [`RilClient`]: command dispatch and response processing
//! - [`runtime`]: runs a client on its own thread
//!
//! # Example
//!
//! ```rust,ignore
//! use ril_client::{ClientConfig, RecordingTransport, ResultSink, RilClient};
//!
//! let mut client = RilClient::new(ClientConfig::default(), RecordingTransport::new());
//! let (sink, result) = ResultSink::channel();
//! client.get_current_calls(sink);
//!
//! // Bytes from the modem
//! client.feed(&received)?;
//! let calls = result.recv()?;
//! ```

mod client;
mod config;
mod counters;
mod error;
pub mod normalize;
pub mod recovery;
mod registry;
pub mod runtime;
mod sink;
mod transport;

pub use client::{Indication, RilClient};
pub use config::ClientConfig;
pub use counters::{describe_metrics, metric_defs, Metric};
pub use error::{CommandError, ConfigError, Result, RilError};
pub use normalize::{CallListUpdate, DataCallStats};
pub use recovery::{DataCallRecovery, RecoveryEffect, RecoveryEvent, RecoveryState, RecoveryStep};
pub use registry::{PendingRequest, RequestId, RequestRegistry};
pub use runtime::{spawn_client, ClientCommand, RilHandle};
pub use sink::{CommandResult, Completion, Payload, ResultSink};
pub use transport::{ChannelTransport, RecordingTransport, Transport};
