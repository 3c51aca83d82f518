//! CSI dispatch for the cursor, erase, scroll-region, mode, and SGR subset
//! that the in-scope emulations actually use.
//!
//! Intermediate bytes (e.g. the `?` DEC private-mode introducer) arrive
//! folded into `params` as `CsiParam::P` entries, per the tokenizer's
//! `promote_intermediates_to_params` step.

use log::debug;
use carrier_vte::CsiParam;

use crate::actor::Actor;
use crate::mode::{ClearMode, LineClearMode, Mode, PrivateMode};

fn parse_params(params: &[CsiParam]) -> Vec<i64> {
    let mut values = Vec::new();
    let mut pending: Option<i64> = None;

    for param in params {
        match param {
            CsiParam::Integer(value) => pending = Some(*value),
            CsiParam::P(b';') => values.push(pending.take().unwrap_or(0)),
            CsiParam::P(_) => {},
        }
    }
    values.push(pending.take().unwrap_or(0));
    values
}

fn count_or(params: &[CsiParam], default: i64) -> i64 {
    match params {
        [] => default,
        [CsiParam::Integer(n)] => {
            if *n == 0 {
                default
            } else {
                *n
            }
        },
        _ => default,
    }
}

/// Dispatch a parsed CSI sequence to the direct methods on `actor`.
pub(crate) fn perform<A: Actor>(
    actor: &mut A,
    params: &[CsiParam],
    parameters_truncated: bool,
    byte: u8,
) {
    if parameters_truncated {
        debug!("[unexpected csi] truncated parameter list before {:?}", byte as char);
        return;
    }

    if let [CsiParam::P(b'?'), rest @ ..] = params {
        match byte {
            b'h' => {
                for value in parse_params(rest) {
                    actor.set_private_mode(PrivateMode::from_raw(value as u16));
                }
            },
            b'l' => {
                for value in parse_params(rest) {
                    actor.unset_private_mode(PrivateMode::from_raw(value as u16));
                }
            },
            _ => debug!(
                "[unexpected csi private] params: {:?}, action: {:?}",
                params, byte as char
            ),
        }
        return;
    }

    match byte {
        b'A' => actor.cursor_up(count_or(params, 1)),
        b'B' => actor.cursor_down(count_or(params, 1)),
        b'C' => actor.cursor_forward(count_or(params, 1)),
        b'D' => actor.cursor_backward(count_or(params, 1)),
        b'H' | b'f' => {
            let values = parse_params(params);
            let row = *values.first().unwrap_or(&0);
            let col = *values.get(1).unwrap_or(&0);
            actor.cursor_position(row.max(1), col.max(1));
        },
        b'J' => {
            let mode = match count_or(params, 0) {
                0 => ClearMode::Below,
                1 => ClearMode::Above,
                2 => ClearMode::All,
                3 => ClearMode::Saved,
                _ => return,
            };
            actor.erase_display(mode);
        },
        b'K' => {
            let mode = match count_or(params, 0) {
                0 => LineClearMode::Right,
                1 => LineClearMode::Left,
                2 => LineClearMode::All,
                _ => return,
            };
            actor.erase_line(mode);
        },
        b'r' => {
            let values = parse_params(params);
            let top = *values.first().unwrap_or(&0);
            let bottom = *values.get(1).unwrap_or(&0);
            actor.set_scroll_region(top, bottom);
        },
        b'm' => {
            let values = parse_params(params);
            actor.select_graphic_rendition(&values);
        },
        b'h' => {
            for value in parse_params(params) {
                actor.set_mode(Mode::from_raw(value as u16));
            }
        },
        b'l' => {
            for value in parse_params(params) {
                actor.unset_mode(Mode::from_raw(value as u16));
            }
        },
        _ => debug!(
            "[unexpected csi] params: {:?}, action: {:?}",
            params, byte as char
        ),
    }
}
