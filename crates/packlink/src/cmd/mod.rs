use clap::{Args, Subcommand};
use packlink_peer::{NodeConfig, Role};
use packlink_transport::LinkStream;
use std::path::{Path, PathBuf};

use crate::exit::CliResult;
use crate::output::OutputFormat;
use crate::route::parse_role;

pub mod monitor;
pub mod send;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a pack, wand and attenuator in-process and report their state.
    Simulate(SimulateArgs),
    /// Decode and print frames arriving on a serial device.
    Monitor(MonitorArgs),
    /// Send a single command frame.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: &NodeConfig) -> CliResult<i32> {
    match command {
        Command::Simulate(args) => simulate::run(args, format, config),
        Command::Monitor(args) => monitor::run(args, format, config),
        Command::Send(args) => send::run(args, format, config),
        Command::Version(args) => version::run(args),
    }
}

/// Open a serial device in raw mode at `baud`.
pub fn open_device(path: &Path, baud: u32) -> CliResult<LinkStream> {
    #[cfg(unix)]
    {
        packlink_transport::SerialPort::open(path, baud)
            .map_err(|err| crate::exit::transport_error("open failed", err))
    }
    #[cfg(not(unix))]
    {
        let _ = (path, baud);
        Err(crate::exit::CliError::new(
            crate::exit::TRANSPORT_ERROR,
            "serial devices are only supported on unix hosts",
        ))
    }
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Script to play against the three nodes.
    #[arg(long, value_enum, default_value = "boot")]
    pub scenario: simulate::Scenario,
    /// Simulated time to run, in milliseconds.
    #[arg(long, default_value = "10000")]
    pub duration_ms: u64,
    /// Preference file (JSON) the pack and wand load at boot and save to.
    #[arg(long, value_name = "FILE")]
    pub prefs: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Serial device to read (e.g. /dev/ttyUSB0).
    pub device: PathBuf,
    /// Baud rate. Default: the configured link baud.
    #[arg(long)]
    pub baud: Option<u32>,
    /// Controller whose transmit line is attached.
    #[arg(long, value_parser = parse_role)]
    pub from: Role,
    /// Controller the frames are addressed to. Default: the sender's usual peer.
    #[arg(long, value_parser = parse_role)]
    pub to: Option<Role>,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial device to write (e.g. /dev/ttyUSB0).
    pub device: PathBuf,
    /// Baud rate. Default: the configured link baud.
    #[arg(long)]
    pub baud: Option<u32>,
    /// Controller to impersonate.
    #[arg(long, value_parser = parse_role)]
    pub from: Role,
    /// Receiving controller. Default: the sender's usual peer.
    #[arg(long, value_parser = parse_role)]
    pub to: Option<Role>,
    /// Command wire name (e.g. W_SYNC_NOW) or numeric id.
    #[arg(long)]
    pub command: String,
    /// Command argument.
    #[arg(long, default_value = "0")]
    pub arg: u16,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
