//! ril-sim: drive the RIL client against a scripted modem.
//!
//! Usage:
//!
//! ```text
//! ril-sim scenarios/recovery.yaml -v
//! ```

mod error;
mod modem;
mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::Receiver;
use ril_client::{describe_metrics, spawn_client, ChannelTransport, CommandResult, Indication, RilHandle};
use ril_wire::{encode_supp_service_notification, Message, RIL_UNSOL_SUPP_SVC_NOTIFICATION};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::SimError;
use crate::modem::{spawn_modem, ScriptedModem};
use crate::scenario::{Scenario, Step};

/// Scripted modem simulator for the RIL client.
#[derive(Parser, Debug)]
#[command(name = "ril-sim", about = "Run a RIL client scenario against a scripted modem")]
struct Cli {
    /// Scenario file (YAML).
    scenario: PathBuf,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let scenario = Scenario::from_file(&cli.scenario)?;
    info!("loaded {} with {} steps", cli.scenario.display(), scenario.steps.len());

    describe_metrics();

    let modem = ScriptedModem::new(scenario.modem.clone())?;
    let (frames_tx, frames_rx) = crossbeam_channel::unbounded();
    let handle = spawn_client(scenario.client.clone(), ChannelTransport::new(frames_tx))?;
    let modem_thread = spawn_modem(modem, frames_rx, handle.command_sender())?;
    let indications = handle.subscribe()?;

    // A silent modem has to be outlasted by the client's watchdog.
    let result_timeout = scenario.client.setup_timeout() + Duration::from_secs(1);

    for (i, step) in scenario.steps.into_iter().enumerate() {
        let name = step.name();
        println!("[{}] {}", i + 1, name);

        let pending = match step {
            Step::SetRadioPower(on) => Some(handle.set_radio_power(on)?),
            Step::SetupDataCall(entry) => Some(handle.setup_data_call(entry.into())?),
            Step::DeactivateDataCall { cid, reason } => Some(handle.deactivate_data_call(cid, reason)?),
            Step::GetCurrentCalls => Some(handle.get_current_calls()?),
            Step::GetDataCallList => Some(handle.get_data_call_list()?),
            Step::SuppServiceNotification(entry) => {
                let message = Message::Unsolicited {
                    code: RIL_UNSOL_SUPP_SVC_NOTIFICATION,
                    payload: encode_supp_service_notification(&entry.into()),
                };
                handle.receive(message.encode_frame())?;
                None
            }
            Step::WaitMs(ms) => {
                std::thread::sleep(Duration::from_millis(ms));
                None
            }
        };

        if let Some(rx) = pending {
            let result = rx
                .recv_timeout(result_timeout)
                .map_err(|_| SimError::NoResult(name, result_timeout))?;
            print_result(&result);
        }

        // Let the modem's follow-up indications land before the next step.
        std::thread::sleep(Duration::from_millis(10));
        print_indications(&indications);
    }

    shutdown(handle, &indications)?;
    if modem_thread.join().is_err() {
        error!("modem thread panicked");
    }
    Ok(())
}

fn shutdown(handle: RilHandle, indications: &Receiver<Indication>) -> Result<(), SimError> {
    handle.shutdown()?;
    print_indications(indications);
    Ok(())
}

fn print_result(result: &CommandResult) {
    match result {
        Ok(payload) => println!("    ok: {:?}", payload),
        Err(e) => println!("    failed: {}", e),
    }
}

fn print_indications(indications: &Receiver<Indication>) {
    for indication in indications.try_iter() {
        println!("    indication: {:?}", indication);
    }
}
