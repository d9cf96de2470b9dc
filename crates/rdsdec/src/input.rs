//! Reads register snapshots from the input stream

use std::io;

use anyhow::{anyhow, Context};
use byteorder::{NativeEndian, ReadBytesExt};
use log::warn;

use si470x_rds::{Group, RegisterFile, REGISTER_COUNT};

/// Number of blocks in a group
const GROUP_WORDS: usize = 4;

/// One unit of input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Snapshot {
    /// The entire register file
    Registers(RegisterFile),

    /// A group which is known to be ready
    Group(Group),
}

/// Read one binary register file
///
/// Returns `None` at end of input. A trailing partial
/// snapshot is discarded.
pub fn read_raw<R>(input: &mut R) -> Option<RegisterFile>
where
    R: io::Read + ?Sized,
{
    let mut words = [0u16; REGISTER_COUNT];
    input.read_u16_into::<NativeEndian>(&mut words).ok()?;
    Some(RegisterFile::new(words))
}

/// Snapshots from lines of hexadecimal text
///
/// Lines which fail to parse are logged and skipped. The
/// iterator ends at end of input or on the first read error.
pub fn hex_snapshots<R>(input: R) -> impl Iterator<Item = Snapshot>
where
    R: io::BufRead,
{
    input
        .lines()
        .map_while(Result::ok)
        .enumerate()
        .filter_map(|(num, line)| match parse_hex(&line) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("input line {}: {:#}", num + 1, err);
                None
            }
        })
}

/// Parse one line of hexadecimal words
///
/// Words are separated by whitespace or commas and may carry a
/// `0x` prefix. Everything after `#` is a comment. Returns
/// `Ok(None)` for blank lines.
pub fn parse_hex(line: &str) -> Result<Option<Snapshot>, anyhow::Error> {
    let line = match line.split_once('#') {
        Some((data, _comment)) => data,
        None => line,
    };

    let words = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let digits = word
                .strip_prefix("0x")
                .or_else(|| word.strip_prefix("0X"))
                .unwrap_or(word);
            u16::from_str_radix(digits, 16)
                .with_context(|| format!("\"{}\" is not a 16-bit hex word", word))
        })
        .collect::<Result<Vec<u16>, _>>()?;

    match words.len() {
        0 => Ok(None),
        GROUP_WORDS => Ok(Some(Snapshot::Group(Group::new(
            words[0], words[1], words[2], words[3],
        )))),
        REGISTER_COUNT => {
            let mut regs = RegisterFile::default();
            for (addr, word) in words.into_iter().enumerate() {
                regs[addr] = word;
            }
            Ok(Some(Snapshot::Registers(regs)))
        }
        n => Err(anyhow!(
            "expected {} or {} words, found {}",
            GROUP_WORDS,
            REGISTER_COUNT,
            n
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use byteorder::WriteBytesExt;
    use si470x_rds::reg;

    #[test]
    fn test_read_raw() {
        let mut bytes = Vec::new();
        for word in 0..(REGISTER_COUNT as u16 * 2 + 3) {
            bytes.write_u16::<NativeEndian>(word).unwrap();
        }

        let mut input = io::Cursor::new(bytes);
        let first = read_raw(&mut input).expect("first snapshot");
        assert_eq!(first[reg::DEVICEID], 0);
        assert_eq!(first[reg::RDSD], 15);

        let second = read_raw(&mut input).expect("second snapshot");
        assert_eq!(second[reg::DEVICEID], 16);

        // three leftover words are not a snapshot
        assert!(read_raw(&mut input).is_none());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("").unwrap(), None);
        assert_eq!(parse_hex("   # just a comment").unwrap(), None);

        assert_eq!(
            parse_hex("C201 0080 E0CD 5350  # 0A").unwrap(),
            Some(Snapshot::Group(Group::new(0xC201, 0x0080, 0xE0CD, 0x5350)))
        );
        assert_eq!(
            parse_hex("0xc201,0x0080, 0xe0cd,0x5350").unwrap(),
            Some(Snapshot::Group(Group::new(0xC201, 0x0080, 0xE0CD, 0x5350)))
        );

        let line = "1242 1053 4001 0000 1000 0C1F 8000 3C04 \
                    0000 0000 8A26 0053 C201 0080 E0CD 5350";
        match parse_hex(line).unwrap() {
            Some(Snapshot::Registers(regs)) => {
                assert!(regs.rds_ready());
                assert_eq!(regs.group().d, 0x5350);
                assert_eq!(regs.read_channel(), 0x53);
            }
            other => panic!("unexpected: {:?}", other),
        }

        assert!(parse_hex("C201 0080 E0CD").is_err());
        assert!(parse_hex("C201 0080 E0CD XYZW").is_err());
        assert!(parse_hex("C201 0080 E0CD 15350").is_err());
    }

    #[test]
    fn test_hex_snapshots_skip_errors() {
        let text = "C201 0080 E0CD 5350\n\
                    garbage\n\
                    \n\
                    C201 0081 E0CD 4F52\n";
        let snapshots: Vec<Snapshot> = hex_snapshots(io::Cursor::new(text)).collect();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(
            snapshots[1],
            Snapshot::Group(Group::new(0xC201, 0x0081, 0xE0CD, 0x4F52))
        );
    }
}
