//! Running a [`RilClient`] on its own thread.
//!
//! The client is owned by a single thread that receives [`ClientCommand`]s
//! over a channel: public operations, bytes read from the modem, and
//! shutdown. While a setup request is tracked the loop waits with a timeout
//! ending at that request's deadline, which makes it the watchdog as well.
//!
//! ```rust,ignore
//! let (modem_tx, modem_rx) = crossbeam_channel::unbounded();
//! let handle = spawn_client(ClientConfig::default(), ChannelTransport::new(modem_tx))?;
//!
//! let result = handle.get_current_calls()?;
//! // ... feed modem bytes with handle.receive(bytes)
//! println!("{:?}", result.recv()?);
//! handle.shutdown()?;
//! ```

use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use ril_wire::SetupDataCallParams;
use tracing::{debug, warn};

use crate::client::{Indication, RilClient};
use crate::config::ClientConfig;
use crate::error::{Result, RilError};
use crate::sink::{CommandResult, ResultSink};
use crate::transport::Transport;

/// Commands sent to the client thread.
#[derive(Debug)]
pub enum ClientCommand {
    /// [`RilClient::setup_data_call`].
    SetupDataCall {
        params: SetupDataCallParams,
        sink: ResultSink,
    },
    /// [`RilClient::deactivate_data_call`].
    DeactivateDataCall { cid: i32, reason: i32, sink: ResultSink },
    /// [`RilClient::set_radio_power`].
    SetRadioPower { on: bool, sink: ResultSink },
    /// [`RilClient::get_current_calls`].
    GetCurrentCalls { sink: ResultSink },
    /// [`RilClient::get_data_call_list`].
    GetDataCallList { sink: ResultSink },
    /// Forward indications to this channel.
    Subscribe(Sender<Indication>),
    /// Bytes read from the modem.
    Receive(Vec<u8>),
    /// Fail everything pending and stop the thread.
    Shutdown,
}

/// Handle to a running client thread.
pub struct RilHandle {
    cmd_tx: Sender<ClientCommand>,
    thread: JoinHandle<()>,
}

impl RilHandle {
    /// Send a command to the client thread.
    pub fn send(&self, cmd: ClientCommand) -> Result<()> {
        self.cmd_tx.send(cmd).map_err(|_| RilError::ChannelClosed)
    }

    /// A sender that can be handed to the thread reading the modem socket.
    pub fn command_sender(&self) -> Sender<ClientCommand> {
        self.cmd_tx.clone()
    }

    fn request(&self, build: impl FnOnce(ResultSink) -> ClientCommand) -> Result<Receiver<CommandResult>> {
        let (sink, rx) = ResultSink::channel();
        self.send(build(sink))?;
        Ok(rx)
    }

    /// Bring up a data connection.
    pub fn setup_data_call(&self, params: SetupDataCallParams) -> Result<Receiver<CommandResult>> {
        self.request(|sink| ClientCommand::SetupDataCall { params, sink })
    }

    /// Tear down a data connection.
    pub fn deactivate_data_call(&self, cid: i32, reason: i32) -> Result<Receiver<CommandResult>> {
        self.request(|sink| ClientCommand::DeactivateDataCall { cid, reason, sink })
    }

    /// Turn the radio on or off.
    pub fn set_radio_power(&self, on: bool) -> Result<Receiver<CommandResult>> {
        self.request(|sink| ClientCommand::SetRadioPower { on, sink })
    }

    /// Fetch the current call list.
    pub fn get_current_calls(&self) -> Result<Receiver<CommandResult>> {
        self.request(|sink| ClientCommand::GetCurrentCalls { sink })
    }

    /// Fetch the data connection list.
    pub fn get_data_call_list(&self) -> Result<Receiver<CommandResult>> {
        self.request(|sink| ClientCommand::GetDataCallList { sink })
    }

    /// Receive indications from now on.
    pub fn subscribe(&self) -> Result<Receiver<Indication>> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.send(ClientCommand::Subscribe(tx))?;
        Ok(rx)
    }

    /// Pass bytes read from the modem to the client.
    pub fn receive(&self, data: Vec<u8>) -> Result<()> {
        self.send(ClientCommand::Receive(data))
    }

    /// Check if the client thread has finished (potentially due to panic).
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Stop the client thread and wait for it to exit.
    ///
    /// Every pending caller receives `RadioNotAvailable` first.
    pub fn shutdown(self) -> Result<()> {
        // Already gone if the send fails; join still reports a panic.
        let _ = self.cmd_tx.send(ClientCommand::Shutdown);
        self.thread.join().map_err(|_| RilError::ChannelClosed)
    }
}

/// Spawn a client thread that sends over `transport`.
pub fn spawn_client<T>(config: ClientConfig, transport: T) -> Result<RilHandle>
where
    T: Transport + Send + 'static,
{
    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
    let client = RilClient::new(config, transport);

    let thread = thread::Builder::new()
        .name("ril-client".to_string())
        .spawn(move || client_thread_main(client, cmd_rx))?;

    Ok(RilHandle { cmd_tx, thread })
}

/// Main loop of the client thread.
fn client_thread_main<T: Transport>(mut client: RilClient<T>, cmd_rx: Receiver<ClientCommand>) {
    loop {
        // Queued input must not hold back an expired setup.
        client.check_timeouts(Instant::now());

        let cmd = match client.next_deadline() {
            Some(deadline) => {
                match cmd_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(cmd) => cmd,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match cmd_rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => break,
            },
        };

        if !handle_command(&mut client, cmd) {
            break;
        }
    }

    debug!("client thread stopping, {} requests pending", client.pending_count());
    client.shutdown();
}

/// Apply one command. Returns false when the thread should exit.
fn handle_command<T: Transport>(client: &mut RilClient<T>, cmd: ClientCommand) -> bool {
    match cmd {
        ClientCommand::SetupDataCall { params, sink } => {
            client.setup_data_call(params, sink);
        }
        ClientCommand::DeactivateDataCall { cid, reason, sink } => {
            client.deactivate_data_call(cid, reason, sink);
        }
        ClientCommand::SetRadioPower { on, sink } => {
            client.set_radio_power(on, sink);
        }
        ClientCommand::GetCurrentCalls { sink } => {
            client.get_current_calls(sink);
        }
        ClientCommand::GetDataCallList { sink } => {
            client.get_data_call_list(sink);
        }
        ClientCommand::Subscribe(tx) => client.add_subscriber(tx),
        ClientCommand::Receive(data) => {
            if let Err(e) = client.feed(&data) {
                warn!("discarding modem input: {}", e);
            }
        }
        ClientCommand::Shutdown => return false,
    }
    true
}
