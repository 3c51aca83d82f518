//! Shared Select Graphic Rendition (SGR) semantics.
//!
//! Both the ATASCII parser (which hand-rolls a minimal `ESC [ ... m`) and the
//! ANSI/VT family parser (which reaches this through a full CSI dispatch)
//! fold their parameter list through [`apply_sgr`].

use crate::color::{Color, StdColor};
use crate::display::GraphicRendition;

/// Apply one SGR parameter list to `attrs`, per the shared rule table in
/// An empty list is equivalent to `[0]`. Unknown parameters are
/// ignored; the remainder of the list is still processed.
pub fn apply_sgr(attrs: &mut GraphicRendition, params: &[i64]) {
    if params.is_empty() {
        attrs.reset();
        return;
    }

    let mut i = 0;
    while i < params.len() {
        let p = params[i];
        match p {
            0 => attrs.reset(),
            1 => attrs.bold = true,
            4 => attrs.underline = true,
            5 => attrs.blink = true,
            7 => attrs.reverse = true,
            22 => attrs.bold = false,
            24 => attrs.underline = false,
            25 => attrs.blink = false,
            27 => attrs.reverse = false,
            30..=37 => {
                attrs.foreground =
                    Color::Std(StdColor::from_index((p - 30) as u8).unwrap());
            },
            40..=47 => {
                attrs.background =
                    Color::Std(StdColor::from_index((p - 40) as u8).unwrap());
            },
            38 if params.get(i + 1) == Some(&5) => {
                if let Some(&n) = params.get(i + 2) {
                    attrs.foreground = Color::Indexed(n as u8);
                    i += 2;
                }
            },
            48 if params.get(i + 1) == Some(&5) => {
                if let Some(&n) = params.get(i + 2) {
                    attrs.background = Color::Indexed(n as u8);
                    i += 2;
                }
            },
            39 => attrs.foreground = Color::Default,
            49 => attrs.background = Color::Default,
            _ => {},
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_resets() {
        let mut attrs = GraphicRendition::default();
        attrs.bold = true;
        apply_sgr(&mut attrs, &[]);
        assert!(!attrs.bold);
    }

    #[test]
    fn sets_red_foreground() {
        let mut attrs = GraphicRendition::default();
        apply_sgr(&mut attrs, &[31]);
        assert_eq!(attrs.foreground, Color::Std(StdColor::Red));
    }

    #[test]
    fn unknown_params_are_ignored_but_remainder_still_applies() {
        let mut attrs = GraphicRendition::default();
        apply_sgr(&mut attrs, &[63, 1, 77]);
        assert!(attrs.bold);
    }

    #[test]
    fn indexed_256_color() {
        let mut attrs = GraphicRendition::default();
        apply_sgr(&mut attrs, &[38, 5, 214]);
        assert_eq!(attrs.foreground, Color::Indexed(214));
    }

    #[test]
    fn clear_flags() {
        let mut attrs = GraphicRendition::default();
        apply_sgr(&mut attrs, &[1, 4, 5, 7]);
        apply_sgr(&mut attrs, &[22, 24, 25, 27]);
        assert!(!attrs.bold && !attrs.underline && !attrs.blink && !attrs.reverse);
    }

    #[test]
    fn default_foreground_background() {
        let mut attrs = GraphicRendition::default();
        apply_sgr(&mut attrs, &[31, 41]);
        apply_sgr(&mut attrs, &[39, 49]);
        assert_eq!(attrs.foreground, Color::Default);
        assert_eq!(attrs.background, Color::Default);
    }
}
