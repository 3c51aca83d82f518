use crate::{actor::Actor, control, csi, esc, osc};
use log::debug;
use carrier_vte::{Actor as VTActor, CsiParam, Parser as VTParser};

struct Performer<'a, A: Actor> {
    actor: &'a mut A,
    state: &'a mut ParserState,
}

impl<'a, A: Actor> VTActor for Performer<'a, A> {
    fn print(&mut self, c: char) {
        self.actor.print(c);
        self.state.last_preceding_char = Some(c);
    }

    fn execute(&mut self, byte: u8) {
        control::perform(byte, self.actor);
    }

    fn hook(
        &mut self,
        byte: u8,
        params: &[i64],
        intermediates: &[u8],
        ignored_excess_intermediates: bool,
    ) {
        debug!(
            "[unexpected hook] params: {:?}, intermediates: {:?}, ignore: {:?}, action: {:?}",
            params, intermediates, ignored_excess_intermediates, byte
        );
    }

    fn unhook(&mut self) {
        debug!("[unexpected unhook]");
    }

    fn put(&mut self, byte: u8) {
        debug!("[unexpected put] byte: {:?}", byte);
    }

    fn osc_dispatch(&mut self, params: &[&[u8]]) {
        osc::perform(self.actor, params);
    }

    fn csi_dispatch(
        &mut self,
        params: &[CsiParam],
        parameters_truncated: bool,
        byte: u8,
    ) {
        csi::perform(self.actor, params, parameters_truncated, byte)
    }

    fn esc_dispatch(
        &mut self,
        _params: &[i64],
        intermediates: &[u8],
        _ignored_excess_intermediates: bool,
        byte: u8,
    ) {
        esc::perform(self.actor, intermediates, byte);
    }
}

impl<'a, A: Actor> Performer<'a, A> {
    #[must_use]
    fn new(state: &'a mut ParserState, actor: &'a mut A) -> Self {
        Self { actor, state }
    }
}

#[derive(Default)]
struct ParserState {
    last_preceding_char: Option<char>,
}

/// High-level escape sequence parser that forwards semantic events to an
/// [`Actor`](crate::actor::Actor).
///
/// This is the ANSI/VT family parser: the same instance is
/// reused by the ATASCII fallback path, since both consume the same
/// `Actor` callback surface.
#[derive(Default)]
pub struct Parser {
    vt: VTParser,
    state: ParserState,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the parser with a new chunk of bytes.
    pub fn advance<A: Actor>(&mut self, bytes: &[u8], actor: &mut A) {
        let mut performer = Performer::new(&mut self.state, actor);
        self.vt.advance(bytes, &mut performer);
    }
}

pub(crate) fn parse_number(input: &[u8]) -> Option<u8> {
    if input.is_empty() {
        return None;
    }

    input.iter().try_fold(0u8, |acc, &b| {
        let d = (b as char).to_digit(10)? as u8;
        acc.checked_mul(10)?.checked_add(d)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_invalid_number() {
        assert_eq!(parse_number(b"1abc"), None);
    }

    #[test]
    fn parse_valid_number() {
        assert_eq!(parse_number(b"123"), Some(123));
    }

    #[test]
    fn parse_number_too_large() {
        assert_eq!(parse_number(b"321"), None);
    }
}
