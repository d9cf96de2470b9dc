use std::io;

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, LevelFilter};

use si470x_rds::DecoderBuilder;

mod app;
mod cli;
mod input;
mod spawner;

use cli::{Args, CliError, InputFormat};
use input::Snapshot;

fn main() {
    match rdsdec() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn rdsdec() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    if args.no_service_name && args.no_radio_text {
        return Err(anyhow!(
            "nothing to decode: both --no-service-name and --no-radio-text were given"
        )
        .into());
    }

    // create the decoder
    let mut decoder = DecoderBuilder::new()
        .with_service_name(!args.no_service_name)
        .with_radio_text(!args.no_radio_text)
        .build();

    if args.demo {
        app::demo(&args, &mut decoder);
        return Ok(());
    }

    // file setup: locks stdin in case we need it
    let stdin = io::stdin();
    let stdin_handle = stdin.lock();
    let mut inbuf = file_setup(&args, stdin_handle)?;

    let snapshots: Box<dyn Iterator<Item = Snapshot> + '_> = match args.format {
        InputFormat::Raw => Box::new(std::iter::from_fn(move || {
            input::read_raw(&mut inbuf).map(Snapshot::Registers)
        })),
        InputFormat::Hex => Box::new(input::hex_snapshots(inbuf)),
    };

    app::run(&args, &mut decoder, snapshots);

    Ok(())
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
        return;
    } else if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("si470x_rds", log_filter)
            .filter_module("rdsdec", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

fn file_setup<'stdin>(
    args: &Args,
    stdin: std::io::StdinLock<'stdin>,
) -> Result<Box<dyn io::BufRead + 'stdin>, anyhow::Error> {
    if args.input_is_stdin() {
        info!("RDS decoder reading standard input");
        if args.format == InputFormat::Hex || !is_terminal(&std::io::stdin()) {
            Ok(Box::new(io::BufReader::new(stdin)))
        } else {
            Err(anyhow!(
                "cowardly refusing to read binary register files from a terminal.

Pipe raw register snapshots from your tuner into this program,
or use --format hex to type snapshots as text."
            ))
        }
    } else {
        info!("RDS decoder reading file: \"{}\"", &args.file);
        Ok(Box::new(io::BufReader::new(
            std::fs::File::open(&args.file)
                .with_context(|| format!("Unable to open --file \"{}\"", args.file))?,
        )))
    }
}

#[cfg(not(target_os = "windows"))]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::fd::AsRawFd,
{
    terminal_size::terminal_size_using_fd(stream.as_raw_fd()).is_some()
}

#[cfg(target_os = "windows")]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::windows::io::AsRawHandle,
{
    terminal_size::terminal_size_using_handle(stream.as_raw_handle()).is_some()
}
