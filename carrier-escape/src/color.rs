//! Colors as they appear in SGR parameters.

/// A resolved color, as stored in [`GraphicRendition`](crate::display::GraphicRendition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Default,
    Std(StdColor),
    /// 256-color palette index (`38;5;n` / `48;5;n`).
    Indexed(u8),
}

/// The 16 standard ANSI colors (`30..37` / `90..97` and their background
/// equivalents).
#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u8)]
pub enum StdColor {
    Black = 0,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl StdColor {
    pub fn from_index(index: u8) -> Option<Self> {
        use StdColor::*;
        Some(match index {
            0 => Black,
            1 => Red,
            2 => Green,
            3 => Yellow,
            4 => Blue,
            5 => Magenta,
            6 => Cyan,
            7 => White,
            8 => BrightBlack,
            9 => BrightRed,
            10 => BrightGreen,
            11 => BrightYellow,
            12 => BrightBlue,
            13 => BrightMagenta,
            14 => BrightCyan,
            15 => BrightWhite,
            _ => return None,
        })
    }
}
