//! Spawns child process from a DecoderEvent

use std::ffi::OsStr;
use std::io;
use std::process::{Child, Command, Stdio};

use chrono::{DateTime, Utc};
use si470x_rds::DecoderEvent;

/// Spawn a child process to handle the given station text
///
/// The child process will receive the text, and information
/// about the station which sent it, via the environment.
/// The child's standard input is closed.
///
/// This method will attempt to start an executable named
/// `cmd` with the given `args`. `received` is the time at
/// which the text was verified.
pub fn spawn<C, A, B>(
    cmd: C,
    args: A,
    event: &DecoderEvent,
    received: &DateTime<Utc>,
) -> io::Result<Child>
where
    C: AsRef<OsStr>,
    B: AsRef<OsStr>,
    A: IntoIterator<Item = B>,
{
    let pty = event.program_type();

    Command::new(cmd)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .args(args)
        .env(childenv::RDSDEC_KIND, event.what().as_code_str())
        .env(childenv::RDSDEC_TEXT, event.what().trimmed())
        .env(childenv::RDSDEC_PI, format!("{:04X}", event.pi()))
        .env(childenv::RDSDEC_PTY, pty.code().to_string())
        .env(childenv::RDSDEC_PTY_NAME, pty.as_display_str())
        .env(childenv::RDSDEC_TIME, time_to_unix_str(received))
        .spawn()
}

mod childenv {
    /// Kind of station text
    ///
    /// |        |                      |
    /// |--------|----------------------|
    /// | "`PS`" | Program service name |
    /// | "`RT`" | Radio text           |
    pub const RDSDEC_KIND: &str = "RDSDEC_KIND";

    /// The station text
    ///
    /// Trailing padding is removed. Radio text ends at the first
    /// carriage return. Non-printable characters are replaced
    /// with spaces.
    pub const RDSDEC_TEXT: &str = "RDSDEC_TEXT";

    /// Program identification code
    ///
    /// Four uppercase hexadecimal digits, like `C201`.
    pub const RDSDEC_PI: &str = "RDSDEC_PI";

    /// Program type code, as a decimal number from 0 to 31
    pub const RDSDEC_PTY: &str = "RDSDEC_PTY";

    /// Program type, human-readable
    ///
    /// Example: "`Pop Music`".
    pub const RDSDEC_PTY_NAME: &str = "RDSDEC_PTY_NAME";

    /// Time the text was verified (UTC UNIX timestamp, in seconds)
    pub const RDSDEC_TIME: &str = "RDSDEC_TIME";
}

// convert DateTime to UTC unix timestamp in seconds, as string
fn time_to_unix_str(tm: &DateTime<Utc>) -> String {
    format!("{}", tm.format("%s"))
}
