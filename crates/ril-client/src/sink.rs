//! Result delivery.
//!
//! Every request carries a [`Completion`] that says who gets its result. An
//! external caller supplies a [`ResultSink`]; requests issued by the recovery
//! machinery carry a [`RecoveryStep`] tag instead. Either way the completion
//! is consumed when the result is delivered, so it can fire at most once.

use crossbeam_channel::{Receiver, Sender};
use ril_wire::{CallRecord, DataCallResponse};

use crate::error::CommandError;
use crate::recovery::RecoveryStep;

/// Successful result of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Request succeeded with no data (radio power, deactivate).
    None,
    /// Normalized call list, sorted by index.
    CallList(Vec<CallRecord>),
    /// Data connection list.
    DataCallList(Vec<DataCallResponse>),
    /// The connection brought up by a setup request.
    DataCall(DataCallResponse),
}

/// What a request resolves to.
pub type CommandResult = Result<Payload, CommandError>;

/// One-shot result callback.
pub struct ResultSink(Box<dyn FnOnce(CommandResult) + Send>);

impl ResultSink {
    /// Wrap a callback.
    pub fn new(f: impl FnOnce(CommandResult) + Send + 'static) -> Self {
        ResultSink(Box::new(f))
    }

    /// A sink that forwards the result to a channel.
    pub fn channel() -> (Self, Receiver<CommandResult>) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        (Self::sender(tx), rx)
    }

    /// A sink that sends to an existing channel.
    pub fn sender(tx: Sender<CommandResult>) -> Self {
        ResultSink::new(move |result| {
            // Receiver may have been dropped; nobody is waiting then.
            let _ = tx.send(result);
        })
    }

    /// A sink for callers that do not want the result.
    pub fn discard() -> Self {
        ResultSink::new(|_| {})
    }

    /// Deliver the result, consuming the sink.
    pub fn deliver(self, result: CommandResult) {
        (self.0)(result)
    }
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResultSink")
    }
}

/// Who receives a request's result.
#[derive(Debug)]
pub enum Completion {
    /// An external caller.
    Caller(ResultSink),
    /// A power command issued by data call recovery.
    Recovery(RecoveryStep),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_channel_sink() {
        let (sink, rx) = ResultSink::channel();
        sink.deliver(Ok(Payload::None));
        assert_eq!(rx.try_recv().unwrap(), Ok(Payload::None));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_callback_sink_runs_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let sink = ResultSink::new(move |result| {
            assert_eq!(result, Err(CommandError::radio_not_available()));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sink.deliver(Err(CommandError::radio_not_available()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sink_with_dropped_receiver() {
        let (sink, rx) = ResultSink::channel();
        drop(rx);
        sink.deliver(Ok(Payload::None));
    }
}
