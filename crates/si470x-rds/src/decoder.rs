//! Full RDS decoder

#[cfg(not(test))]
use log::trace;

#[cfg(test)]
use std::println as trace;

use std::io;
use std::iter::{IntoIterator, Iterator};

use crate::builder::DecoderBuilder;
use crate::group::{Group, GroupKind};
use crate::registers::{RegisterFile, RegisterSource};
use crate::text::{RadioText, ServiceName};

mod output;
mod radio_text;
mod service_name;

pub use output::{DecoderEvent, StationText};
pub use radio_text::RadioTextAssembler;
pub use service_name::ServiceNameAssembler;

/// RDS station text decoder
///
/// The decoder accepts RDS [groups](Group), one at a time,
/// and routes each to one of two assemblers:
///
/// 1. Groups 0A and 0B carry the eight-character program
///    service name. See [`ServiceNameAssembler`].
/// 2. Groups 2A and 2B carry up to 64 characters of radio
///    text. See [`RadioTextAssembler`].
///
/// All other groups are ignored. They do not change the state
/// of either assembler.
///
/// The decoder never blocks and never fails. Reception errors
/// only delay the output. Call it whenever the tuner reports
/// new RDS data, either with a [`Group`] directly or with any
/// [`RegisterSource`] via [`poll()`](Decoder::poll).
///
/// ```
/// use si470x_rds::{DecoderBuilder, Group, StationText};
///
/// let mut decoder = DecoderBuilder::default().build();
///
/// // group 0A, segment 0 .. 3, each received twice
/// let groups = (0..8u16).map(|i| {
///     let seg = i / 2;
///     let chars = [b"KX", b"YZ", b" F", b"M "][seg as usize];
///     Group::new(0x1234, seg, 0, u16::from_be_bytes(*chars))
/// });
///
/// let evt = decoder.iter(groups).next().expect("no service name");
/// match evt.what() {
///     StationText::ServiceName(ps) => assert_eq!("KXYZ FM ", ps.as_str()),
///     _ => unreachable!(),
/// }
/// ```
///
/// The decoder owns all of its state. If more than one thread
/// must feed it, guard the entire `Decoder` with a single lock.
#[derive(Clone, Debug)]
pub struct Decoder {
    service_name: ServiceNameAssembler,
    radio_text: RadioTextAssembler,
    decode_service_name: bool,
    decode_radio_text: bool,
    group_counter: u64,
}

impl Decoder {
    /// Decode one group
    ///
    /// Classifies the `group` and passes its contents to the
    /// matching assembler. If this group completes a new
    /// service name or radio text, returns an event.
    pub fn observe(&mut self, group: &Group) -> Option<DecoderEvent> {
        self.group_counter = self.group_counter.wrapping_add(1);
        trace!("decoder: {}", group);

        let what: StationText = match group.kind() {
            GroupKind::ServiceName { segment, chars } if self.decode_service_name => {
                self.service_name.observe(segment, chars)?.into()
            }
            GroupKind::RadioText {
                version,
                segment,
                toggle,
                chars,
            } if self.decode_radio_text => self
                .radio_text
                .observe(version, segment, toggle, &chars)?
                .into(),
            _ => return None,
        };

        Some(DecoderEvent::new(what, group, self.group_counter))
    }

    /// Decode the group in a register file snapshot, if ready
    ///
    /// If the `RDSR` (RDS ready) bit of `regs` is set, the
    /// group in `RDSA`..`RDSD` is decoded. Otherwise, nothing
    /// happens.
    pub fn observe_registers(&mut self, regs: &RegisterFile) -> Option<DecoderEvent> {
        if regs.rds_ready() {
            self.observe(&regs.group())
        } else {
            None
        }
    }

    /// Read the tuner once and decode any new group
    ///
    /// Reads one register file snapshot from `source` and
    /// decodes it per [`observe_registers()`](Decoder::observe_registers).
    /// The only error is a failure to read the source; the
    /// decoder state is unchanged when that happens.
    pub fn poll<S>(&mut self, source: &mut S) -> io::Result<Option<DecoderEvent>>
    where
        S: RegisterSource + ?Sized,
    {
        let regs = source.read_register_file()?;
        Ok(self.observe_registers(&regs))
    }

    /// Decode events from a source of groups
    ///
    /// Bind an iterator which will consume the `input` and
    /// produce [`DecoderEvent`]s. The iterator consumes as many
    /// groups as are required to produce the next event. It
    /// returns `None` once the input is exhausted.
    #[must_use = "iterators are lazy and do nothing unless consumed"]
    pub fn iter<'dec, I, T>(&'dec mut self, input: I) -> GroupIter<'dec, T>
    where
        I: IntoIterator<Item = Group> + IntoIterator<IntoIter = T>,
        T: Iterator<Item = Group>,
    {
        GroupIter {
            source: input.into_iter(),
            decoder: self,
        }
    }

    /// Most recently published service name
    pub fn service_name(&self) -> Option<&ServiceName> {
        self.service_name.published()
    }

    /// Most recently verified radio text
    ///
    /// Cleared whenever the broadcaster starts a new message.
    pub fn radio_text(&self) -> Option<&RadioText> {
        self.radio_text.last_verified()
    }

    /// Lifetime total of groups observed
    pub fn group_counter(&self) -> u64 {
        self.group_counter
    }

    /// Clear both assemblers and reset to zero initial conditions
    pub fn reset(&mut self) {
        self.service_name.reset();
        self.radio_text.reset();
        self.group_counter = 0;
    }
}

impl From<&DecoderBuilder> for Decoder {
    fn from(cfg: &DecoderBuilder) -> Self {
        Self {
            service_name: ServiceNameAssembler::new(),
            radio_text: RadioTextAssembler::new(),
            decode_service_name: cfg.service_name(),
            decode_radio_text: cfg.radio_text(),
            group_counter: 0,
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        DecoderBuilder::default().build()
    }
}

/// Iterator over decoder events
///
/// Created by [`Decoder::iter()`].
#[derive(Debug)]
pub struct GroupIter<'dec, I>
where
    I: Iterator<Item = Group>,
{
    decoder: &'dec mut Decoder,
    source: I,
}

impl<'dec, I> Iterator for GroupIter<'dec, I>
where
    I: Iterator<Item = Group>,
{
    type Item = DecoderEvent;

    fn next(&mut self) -> Option<Self::Item> {
        for group in &mut self.source {
            if let Some(evt) = self.decoder.observe(&group) {
                return Some(evt);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;

    use crate::registers::{bits, reg};
    use crate::ProgramType;

    const PI: u16 = 0xC0DE;

    fn ps_group(segment: u16, chars: &[u8; 2]) -> Group {
        Group::new(PI, (9 << 5) | segment, 0xE0CD, u16::from_be_bytes(*chars))
    }

    fn rt_group(segment: u16, toggle: bool, chars: &[u8]) -> Group {
        Group::new(
            PI,
            0x2000 | (9 << 5) | ((toggle as u16) << 4) | segment,
            u16::from_be_bytes([chars[0], chars[1]]),
            u16::from_be_bytes([chars[2], chars[3]]),
        )
    }

    fn ps_groups(name: &[u8; 8]) -> Vec<Group> {
        (0..4u16)
            .flat_map(|seg| {
                let i = usize::from(seg) * 2;
                let grp = ps_group(seg, &[name[i], name[i + 1]]);
                [grp, grp]
            })
            .collect()
    }

    fn rt_groups(text: &[u8; 64], toggle: bool) -> Vec<Group> {
        (0..16u16)
            .map(|seg| {
                let i = usize::from(seg) * 4;
                rt_group(seg, toggle, &text[i..i + 4])
            })
            .collect()
    }

    fn hello() -> [u8; 64] {
        let mut text = [b' '; 64];
        text[..13].copy_from_slice(b"Hello, World!");
        text
    }

    #[test]
    fn test_service_name_event() {
        let mut uut = Decoder::default();
        let events: Vec<DecoderEvent> = uut.iter(ps_groups(b"ABCDEFGH")).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].service_name().unwrap().as_str(), "ABCDEFGH");
        assert_eq!(events[0].pi(), PI);
        assert_eq!(events[0].program_type(), ProgramType::Varied);
        assert_eq!(events[0].group_counter(), 8);
        assert_eq!(uut.service_name().unwrap().as_str(), "ABCDEFGH");
    }

    #[test]
    fn test_radio_text_event() {
        let text = hello();
        let mut uut = Decoder::default();

        let mut input = rt_groups(&text, false);
        input.extend(rt_groups(&text, false));
        input.extend(rt_groups(&text, false));
        let events: Vec<DecoderEvent> = uut.iter(input).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].radio_text().unwrap().as_bytes(), &text);
        assert_eq!(events[0].group_counter(), 32);
        assert_eq!(uut.radio_text().unwrap().trimmed(), "Hello, World!");
    }

    #[test]
    fn test_interleaved() {
        let text = hello();
        let ps = ps_groups(b"INTERLVD");
        let rt = rt_groups(&text, true);

        // stations interleave group types; each assembler only
        // sees its own groups
        let mut input = Vec::new();
        for i in 0..32 {
            input.push(ps[i % ps.len()]);
            input.push(Group::new(PI, 0x5000 | (i as u16 & 0x1F), 0x4142, 0x4344));
            input.push(rt[i % rt.len()]);
        }

        let mut uut = Decoder::default();
        let events: Vec<StationText> = uut.iter(input).map(StationText::from).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_code_str(), "PS");
        assert_eq!(events[0].trimmed(), "INTERLVD");
        assert_eq!(events[1].as_code_str(), "RT");
        assert_eq!(events[1].trimmed(), "Hello, World!");
    }

    #[test]
    fn test_ignored_groups_do_not_mutate() {
        let mut uut = Decoder::default();

        // half of a service name
        for grp in &ps_groups(b"ABCDEFGH")[..7] {
            assert!(uut.observe(grp).is_none());
        }
        let before = format!("{:?}{:?}", uut.service_name, uut.radio_text);

        // group 5A and 15B carry data which looks like text
        for seg in 0..16u16 {
            assert!(uut
                .observe(&Group::new(PI, 0x5000 | seg, 0x4142, 0x4344))
                .is_none());
            assert!(uut
                .observe(&Group::new(PI, 0xF810 | seg, 0x4142, 0x4344))
                .is_none());
        }
        let after = format!("{:?}{:?}", uut.service_name, uut.radio_text);
        assert_eq!(before, after);
        assert_eq!(uut.group_counter(), 7 + 32);

        // the service name still completes
        let evt = uut.observe(&ps_group(3, b"GH")).expect("no event");
        assert_eq!(evt.service_name().unwrap().as_str(), "ABCDEFGH");
    }

    #[test]
    fn test_disabled_assemblers() {
        let mut uut = DecoderBuilder::new().with_service_name(false).build();
        assert_eq!(uut.iter(ps_groups(b"ABCDEFGH")).count(), 0);
        assert!(uut.service_name().is_none());

        let text = hello();
        let mut uut = DecoderBuilder::new().with_radio_text(false).build();
        let mut input = rt_groups(&text, false);
        input.extend(rt_groups(&text, false));
        assert_eq!(uut.iter(input).count(), 0);
        assert!(uut.radio_text().is_none());
    }

    #[test]
    fn test_reset() {
        let mut uut = Decoder::default();
        assert_eq!(uut.iter(ps_groups(b"ABCDEFGH")).count(), 1);
        uut.reset();
        assert!(uut.service_name().is_none());
        assert_eq!(uut.group_counter(), 0);

        // after reset, the same name is new again
        assert_eq!(uut.iter(ps_groups(b"ABCDEFGH")).count(), 1);
    }

    // replays register snapshots, then fails
    struct Replay(VecDeque<RegisterFile>);

    impl RegisterSource for Replay {
        fn read_register_file(&mut self) -> io::Result<RegisterFile> {
            self.0
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more data"))
        }
    }

    fn snapshot(group: &Group, ready: bool) -> RegisterFile {
        let mut regs = RegisterFile::default();
        regs.set_bit(reg::STATUSRSSI, bits::RDSR, ready);
        regs[reg::RDSA] = group.a;
        regs[reg::RDSB] = group.b;
        regs[reg::RDSC] = group.c;
        regs[reg::RDSD] = group.d;
        regs
    }

    #[test]
    fn test_poll_register_source() {
        let mut snapshots = VecDeque::new();
        for grp in ps_groups(b"POLLING!") {
            // the tuner is not always ready; stale data must be ignored
            snapshots.push_back(snapshot(&ps_group(0, b"XX"), false));
            snapshots.push_back(snapshot(&grp, true));
        }
        let mut source = Replay(snapshots);

        let mut uut = Decoder::default();
        let mut events = Vec::new();
        loop {
            match uut.poll(&mut source) {
                Ok(Some(evt)) => events.push(evt),
                Ok(None) => {}
                Err(err) => {
                    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
                    break;
                }
            }
        }

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].service_name().unwrap().as_str(), "POLLING!");
        assert_eq!(uut.group_counter(), 8);
    }
}
