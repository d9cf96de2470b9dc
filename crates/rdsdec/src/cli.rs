use std::fmt::Display;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};

use si470x_rds::Region;

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program accepts Si470x register file snapshots and decodes the RDS program service name and radio text which they carry. Verified station text is printed as it changes.

See --help for more details.
"#;

const USAGE_LONG: &str = r##"
This program accepts Si470x register file snapshots and decodes the RDS program service name and radio text which they carry. Verified station text is printed as it changes.

In the default --format raw, each snapshot is sixteen native-endian unsigned 16-bit words: the entire register file, from DEVICEID (0x00) to RDSD (0x0F). Capture these from your tuner's serial bus and pipe them in:

    my-si4703-reader --continuous | rdsdec

With --format hex, each line is one snapshot of hexadecimal words separated by spaces or commas. Lines may contain either sixteen words (a register file) or four words (one RDS group: blocks A, B, C, D). Text after "#" is ignored.

    echo "C201 0080 E0CD 5350" | rdsdec --format hex

Arguments which follow "--" will be used to spawn a child process for every piece of verified station text. The child process receives the following additional environment variables:

  RDSDEC_KIND="PS" (or RT)
  RDSDEC_TEXT="SPORT" (trimmed station text)
  RDSDEC_PI="C201" (program identification, hex)
  RDSDEC_PTY="4" (program type code)
  RDSDEC_PTY_NAME="Sport"
  RDSDEC_TIME="1616883240" (UTC UNIX timestamp)

Use --demo to print a demonstration station and invoke the child process without any input.
"##;

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print NOTHING, not even station text
    #[arg(short, long)]
    pub quiet: bool,

    /// Input file (or "-" for stdin)
    #[arg(long, default_value_t = STDIN_FILE.to_string())]
    pub file: String,

    /// Input format
    #[arg(long, value_enum, default_value_t = InputFormat::Raw)]
    pub format: InputFormat,

    /// Band and channel spacing of the tuner (americas, europe-japan)
    ///
    /// Used to report the tuned frequency from register snapshots.
    #[arg(long, default_value = "americas")]
    pub region: Region,

    /// Print a demonstration station and exit
    ///
    /// No input is read. rdsdec will decode a synthesized station
    /// name and radio text, invoke the CHILD process for each, and
    /// then exit.
    #[arg(long)]
    pub demo: bool,

    /// Do not decode program service names
    #[arg(long)]
    pub no_service_name: bool,

    /// Do not decode radio text
    #[arg(long)]
    pub no_radio_text: bool,

    /// Spawn child process for each verified text. Optional.
    ///
    /// Arguments are provided VERBATIM to the child process
    /// without shell interpretation.
    #[arg(last = true)]
    pub child: Vec<String>,
}

impl Args {
    /// Return true if the user requests input from stdin
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}

/// Input snapshot format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    /// Binary register files: 16 native-endian u16 words each
    Raw,

    /// Text: one line of 16 or 4 hexadecimal words each
    Hex,
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clap() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_long_help() {
        // unwrapped, so phrases stay on one line
        let help = Args::command()
            .term_width(0)
            .max_term_width(0)
            .render_long_help()
            .to_string();
        assert!(help.contains("Text after \"#\" is ignored."));
        assert!(help.contains("RDSDEC_PTY_NAME"));
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "rdsdec",
            "-vv",
            "--format",
            "hex",
            "--region",
            "EU",
            "--no-radio-text",
            "--",
            "notify-send",
            "RDS",
        ])
        .expect("parse failed");

        assert_eq!(args.verbose, 2);
        assert_eq!(args.format, InputFormat::Hex);
        assert_eq!(args.region, Region::EuropeJapan);
        assert!(args.no_radio_text);
        assert!(!args.no_service_name);
        assert!(args.input_is_stdin());
        assert_eq!(args.child, vec!["notify-send", "RDS"]);

        let args = Args::try_parse_from(["rdsdec"]).expect("parse failed");
        assert_eq!(args.format, InputFormat::Raw);
        assert_eq!(args.region, Region::Americas);

        assert!(Args::try_parse_from(["rdsdec", "--region", "mars"]).is_err());
    }
}
