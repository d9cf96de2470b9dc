//! Application logic
//!
//! Every input [`Snapshot`] is passed to the decoder. Register
//! file snapshots are also watched for changes in the tuned
//! channel. A new channel is a new station, so the decoder
//! starts over. Every decoded event is printed
//! and, if a child command was given, handed to a new child
//! process. We wait for each child to exit before reading more
//! input.

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use si470x_rds::{Decoder, DecoderEvent, Group, ProgramType, Region, RegisterFile};

use crate::cli::Args;
use crate::input::Snapshot;
use crate::spawner;

/// PI code of the demonstration station
const DEMO_PI: u16 = 0xD0E0;

/// Run the application
///
/// Runs the `rdsdec` loop with the given command-line `args`,
/// a fully-initialized `decoder`, and an `input` iterator
/// which returns each snapshot from some input source until
/// it is exhausted.
pub fn run<I>(args: &Args, decoder: &mut Decoder, input: I)
where
    I: Iterator<Item = Snapshot>,
{
    let cfg = Config::from(args);
    let mut monitor = TuningMonitor::new(args.region);

    for snapshot in input {
        if let Some(evt) = decode(decoder, &mut monitor, &snapshot) {
            report(&cfg, &evt, &Utc::now());
        }
    }

    info!(
        "input exhausted after {} groups",
        decoder.group_counter()
    );
}

/// Run the demonstration
///
/// Decodes a synthesized station and reports its text exactly
/// as live text would be reported.
pub fn demo(args: &Args, decoder: &mut Decoder) {
    let cfg = Config::from(args);
    let now = Utc::now();

    warn!("demonstration (--demo) mode: the following text is NOT LIVE!");

    for evt in decoder.iter(make_demo_groups(&now)) {
        report(&cfg, &evt, &now);
    }
}

// Decode one snapshot, starting over if the channel changed
fn decode(
    decoder: &mut Decoder,
    monitor: &mut TuningMonitor,
    snapshot: &Snapshot,
) -> Option<DecoderEvent> {
    match snapshot {
        Snapshot::Registers(regs) => {
            if monitor.observe(regs).is_some() {
                debug!("discarding station text from the previous channel");
                decoder.reset();
            }
            decoder.observe_registers(regs)
        }
        Snapshot::Group(group) => decoder.observe(group),
    }
}

/// Configuration
#[derive(Clone, Debug)]
struct Config<'args> {
    child_args: Vec<&'args str>,
    quiet: bool,
}

impl<'args> From<&'args Args> for Config<'args> {
    fn from(args: &'args Args) -> Self {
        Self {
            child_args: args.child.iter().map(String::as_str).collect(),
            quiet: args.quiet,
        }
    }
}

/// Logs changes in the tuned channel
#[derive(Clone, Debug)]
struct TuningMonitor {
    region: Region,
    channel: Option<u16>,
    stereo: Option<bool>,
}

impl TuningMonitor {
    fn new(region: Region) -> Self {
        Self {
            region,
            channel: None,
            stereo: None,
        }
    }

    // Returns the new frequency, in tenths of a MHz, if the
    // tuner has changed channels
    fn observe(&mut self, regs: &RegisterFile) -> Option<u16> {
        let stereo = regs.is_stereo();
        if self.stereo.replace(stereo) != Some(stereo) {
            debug!(
                "tuner: {} (RSSI {} dBµV)",
                if stereo { "stereo" } else { "mono" },
                regs.rssi()
            );
        }

        let channel = regs.read_channel();
        if self.channel.replace(channel) == Some(channel) {
            return None;
        }

        let tenths = self.region.channel_to_tenths(channel);
        info!(
            "tuner: receiving {}.{} MHz (RSSI {} dBµV)",
            tenths / 10,
            tenths % 10,
            regs.rssi()
        );
        Some(tenths)
    }
}

// Print the event and run the child process, if any
fn report(cfg: &Config<'_>, evt: &DecoderEvent, received: &DateTime<Utc>) {
    if !cfg.quiet {
        println!("{}", evt);
    }

    if cfg.child_args.is_empty() {
        debug!("no child process to spawn");
        return;
    }

    let mut child = match spawner::spawn(
        cfg.child_args[0],
        &cfg.child_args[1..],
        evt,
        received,
    ) {
        Ok(child) => child,
        Err(err) => {
            error!("unable to spawn child process: {}", err);
            return;
        }
    };

    debug!("spawned child process PID {}", child.id());

    match child.wait() {
        Ok(exit) => {
            if exit.success() {
                debug!("child process exited successfully");
            } else {
                warn!(
                    "child process exited abnormally with status {}",
                    exit.code().unwrap_or(1)
                );
            }
        }
        Err(err) => {
            error!("unable to await child process exit: {}", err);
        }
    }
}

// Create groups for a demonstration station
//
// The station sends its name twice and its radio text twice,
// which is just enough to verify both.
fn make_demo_groups(at: &DateTime<Utc>) -> Vec<Group> {
    const NAME: &[u8; 8] = b"RDS DEMO";

    let pty = u16::from(ProgramType::Information.code()) << 5;
    let message = format!(
        "DEMO {} UTC: NOT A LIVE BROADCAST\r",
        at.format("%Y-%m-%d %H:%M")
    );
    let mut text = [b' '; 64];
    for (dst, src) in text.iter_mut().zip(message.bytes()) {
        *dst = src;
    }

    let mut out = Vec::with_capacity(2 * (4 + 16));
    for _ in 0..2 {
        for (seg, pair) in NAME.chunks_exact(2).enumerate() {
            out.push(Group::new(
                DEMO_PI,
                pty | seg as u16,
                0xE0CD,
                u16::from_be_bytes([pair[0], pair[1]]),
            ));
        }
    }
    for _ in 0..2 {
        for (seg, quad) in text.chunks_exact(4).enumerate() {
            out.push(Group::new(
                DEMO_PI,
                0x2000 | pty | seg as u16,
                u16::from_be_bytes([quad[0], quad[1]]),
                u16::from_be_bytes([quad[2], quad[3]]),
            ));
        }
    }
    out
}
