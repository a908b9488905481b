//! Color, modifier, and style types.
//!
//! A [`Style`] is the structured form of an SGR attribute set: two color
//! planes plus a modifier bitset. Escape text parsed out of written strings
//! is folded into a `Style` field by field (last writer wins), and the diff
//! renderer serializes a `Style` back out as a single reset-and-apply
//! sequence. Styles never exist as opaque escape strings inside the engine.

use bitflags::bitflags;

/// A terminal color for either plane (foreground or background).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum Color {
    /// The terminal's configured default for the plane.
    #[default]
    Default,
    /// ANSI black (SGR 30/40).
    Black,
    /// ANSI red (SGR 31/41).
    Red,
    /// ANSI green (SGR 32/42).
    Green,
    /// ANSI yellow (SGR 33/43).
    Yellow,
    /// ANSI blue (SGR 34/44).
    Blue,
    /// ANSI magenta (SGR 35/45).
    Magenta,
    /// ANSI cyan (SGR 36/46).
    Cyan,
    /// ANSI white (SGR 37/47).
    White,
    /// Bright black / gray (SGR 90/100).
    BrightBlack,
    /// Bright red (SGR 91/101).
    BrightRed,
    /// Bright green (SGR 92/102).
    BrightGreen,
    /// Bright yellow (SGR 93/103).
    BrightYellow,
    /// Bright blue (SGR 94/104).
    BrightBlue,
    /// Bright magenta (SGR 95/105).
    BrightMagenta,
    /// Bright cyan (SGR 96/106).
    BrightCyan,
    /// Bright white (SGR 97/107).
    BrightWhite,
    /// 24-bit truecolor (SGR 38;2;r;g;b / 48;2;r;g;b).
    Rgb(u8, u8, u8),
}

impl Color {
    /// Map a basic palette index (0-15) to its named variant.
    const fn from_index(idx: u8) -> Self {
        match idx {
            0 => Self::Black,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Yellow,
            4 => Self::Blue,
            5 => Self::Magenta,
            6 => Self::Cyan,
            7 => Self::White,
            8 => Self::BrightBlack,
            9 => Self::BrightRed,
            10 => Self::BrightGreen,
            11 => Self::BrightYellow,
            12 => Self::BrightBlue,
            13 => Self::BrightMagenta,
            14 => Self::BrightCyan,
            _ => Self::BrightWhite,
        }
    }

    /// Decode an xterm 256-color index. 0-15 map to the named palette,
    /// 16-231 to the 6x6x6 cube, 232-255 to the grayscale ramp.
    fn from_xterm(idx: u8) -> Self {
        match idx {
            0..=15 => Self::from_index(idx),
            16..=231 => {
                let v = idx - 16;
                let scale = |c: u8| if c == 0 { 0 } else { 55 + c * 40 };
                Self::Rgb(scale(v / 36), scale((v / 6) % 6), scale(v % 6))
            }
            _ => {
                let g = 8 + (idx - 232) * 10;
                Self::Rgb(g, g, g)
            }
        }
    }

    /// Basic palette index for named colors, `None` for default/truecolor.
    const fn index(self) -> Option<u8> {
        match self {
            Self::Black => Some(0),
            Self::Red => Some(1),
            Self::Green => Some(2),
            Self::Yellow => Some(3),
            Self::Blue => Some(4),
            Self::Magenta => Some(5),
            Self::Cyan => Some(6),
            Self::White => Some(7),
            Self::BrightBlack => Some(8),
            Self::BrightRed => Some(9),
            Self::BrightGreen => Some(10),
            Self::BrightYellow => Some(11),
            Self::BrightBlue => Some(12),
            Self::BrightMagenta => Some(13),
            Self::BrightCyan => Some(14),
            Self::BrightWhite => Some(15),
            Self::Default | Self::Rgb(..) => None,
        }
    }

    /// Append this color's SGR parameters for one plane. `base` is 30 for
    /// the foreground and 40 for the background.
    fn encode_params(self, base: u8, out: &mut Vec<u8>) {
        match self {
            Self::Default => {
                out.push(b';');
                push_dec(out, base + 9);
            }
            Self::Rgb(r, g, b) => {
                out.push(b';');
                push_dec(out, base + 8);
                out.extend_from_slice(b";2;");
                push_dec(out, r);
                out.push(b';');
                push_dec(out, g);
                out.push(b';');
                push_dec(out, b);
            }
            named => {
                // index() is Some for every named variant
                let idx = named.index().unwrap_or(7);
                out.push(b';');
                if idx < 8 {
                    push_dec(out, base + idx);
                } else {
                    push_dec(out, base + 60 + (idx - 8));
                }
            }
        }
    }
}

bitflags! {
    /// Text attribute modifiers.
    ///
    /// These can be combined using bitwise OR.
    ///
    /// # Example
    /// ```
    /// use weft::style::Modifiers;
    /// let mods = Modifiers::BOLD | Modifiers::UNDERLINE;
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Bold text (SGR 1).
        const BOLD = 0b0000_0001;
        /// Dim/faint text (SGR 2).
        const DIM = 0b0000_0010;
        /// Italic text (SGR 3).
        const ITALIC = 0b0000_0100;
        /// Underlined text (SGR 4).
        const UNDERLINE = 0b0000_1000;
        /// Blinking text (SGR 5).
        const BLINK = 0b0001_0000;
        /// Reversed colors (SGR 7).
        const REVERSED = 0b0010_0000;
        /// Hidden/invisible text (SGR 8).
        const HIDDEN = 0b0100_0000;
        /// Strikethrough text (SGR 9).
        const STRIKETHROUGH = 0b1000_0000;
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// SGR code for each modifier, in bit order.
const MODIFIER_CODES: [(Modifiers, u8); 8] = [
    (Modifiers::BOLD, 1),
    (Modifiers::DIM, 2),
    (Modifiers::ITALIC, 3),
    (Modifiers::UNDERLINE, 4),
    (Modifiers::BLINK, 5),
    (Modifiers::REVERSED, 7),
    (Modifiers::HIDDEN, 8),
    (Modifiers::STRIKETHROUGH, 9),
];

/// A complete cell style: foreground, background, and modifiers.
///
/// `Style::default()` is the "no attributes" style every parse starts from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Style {
    /// Foreground color.
    pub fg: Color,
    /// Background color.
    pub bg: Color,
    /// Attribute modifiers.
    pub mods: Modifiers,
}

impl Style {
    /// The default (unstyled) style.
    pub const DEFAULT: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        mods: Modifiers::empty(),
    };

    /// Create an unstyled style.
    #[inline]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Set the foreground color (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    /// Set the background color (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    /// Set the modifiers (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_mods(mut self, mods: Modifiers) -> Self {
        self.mods = mods;
        self
    }

    /// Whether every attribute is at its default.
    #[inline]
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Fold a parsed SGR parameter list into this style, last writer wins.
    ///
    /// An empty list behaves as `[0]` (full reset), matching `ESC[m`.
    /// Unknown parameters are ignored. Extended color introducers (`38`/`48`)
    /// consume their `2;r;g;b` or `5;n` arguments.
    pub fn apply_sgr(&mut self, params: &[u16]) {
        if params.is_empty() {
            *self = Self::DEFAULT;
            return;
        }
        let mut i = 0;
        while i < params.len() {
            let p = params[i];
            match p {
                0 => *self = Self::DEFAULT,
                1 => self.mods.insert(Modifiers::BOLD),
                2 => self.mods.insert(Modifiers::DIM),
                3 => self.mods.insert(Modifiers::ITALIC),
                4 => self.mods.insert(Modifiers::UNDERLINE),
                5 => self.mods.insert(Modifiers::BLINK),
                7 => self.mods.insert(Modifiers::REVERSED),
                8 => self.mods.insert(Modifiers::HIDDEN),
                9 => self.mods.insert(Modifiers::STRIKETHROUGH),
                22 => self.mods.remove(Modifiers::BOLD | Modifiers::DIM),
                23 => self.mods.remove(Modifiers::ITALIC),
                24 => self.mods.remove(Modifiers::UNDERLINE),
                25 => self.mods.remove(Modifiers::BLINK),
                27 => self.mods.remove(Modifiers::REVERSED),
                28 => self.mods.remove(Modifiers::HIDDEN),
                29 => self.mods.remove(Modifiers::STRIKETHROUGH),
                30..=37 => self.fg = Color::from_index((p - 30) as u8),
                39 => self.fg = Color::Default,
                40..=47 => self.bg = Color::from_index((p - 40) as u8),
                49 => self.bg = Color::Default,
                90..=97 => self.fg = Color::from_index((p - 90) as u8 + 8),
                100..=107 => self.bg = Color::from_index((p - 100) as u8 + 8),
                38 | 48 => {
                    let (color, consumed) = decode_extended(&params[i + 1..]);
                    if let Some(color) = color {
                        if p == 38 {
                            self.fg = color;
                        } else {
                            self.bg = color;
                        }
                    }
                    i += consumed;
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// Append the full reset-and-apply escape sequence for this style.
    ///
    /// Always leads with `0` so stale attributes from the previous run can
    /// never leak through: `ESC[0;1;38;2;255;0;0;44m` and so on. The default
    /// style serializes as plain `ESC[0m`.
    pub fn encode_sgr(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"\x1b[0");
        for (flag, code) in MODIFIER_CODES {
            if self.mods.contains(flag) {
                out.push(b';');
                push_dec(out, code);
            }
        }
        if self.fg != Color::Default {
            self.fg.encode_params(30, out);
        }
        if self.bg != Color::Default {
            self.bg.encode_params(40, out);
        }
        out.push(b'm');
    }

    /// The reset-and-apply escape sequence as a `String`.
    pub fn sgr(&self) -> String {
        let mut buf = Vec::with_capacity(16);
        self.encode_sgr(&mut buf);
        // encode_sgr only emits ASCII
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Decode the arguments after a `38`/`48` introducer. Returns the color (if
/// well formed) and how many parameters were consumed.
fn decode_extended(rest: &[u16]) -> (Option<Color>, usize) {
    match rest.first() {
        Some(2) if rest.len() >= 4 => {
            let clamp = |v: u16| u8::try_from(v.min(255)).unwrap_or(255);
            (
                Some(Color::Rgb(clamp(rest[1]), clamp(rest[2]), clamp(rest[3]))),
                4,
            )
        }
        Some(5) if rest.len() >= 2 => {
            let idx = u8::try_from(rest[1].min(255)).unwrap_or(255);
            (Some(Color::from_xterm(idx)), 2)
        }
        // Malformed extension: swallow the introducer argument if present
        Some(_) => (None, 1),
        None => (None, 0),
    }
}

/// Append `n` as decimal ASCII digits.
fn push_dec(out: &mut Vec<u8>, n: u8) {
    if n >= 100 {
        out.push(b'0' + n / 100);
    }
    if n >= 10 {
        out.push(b'0' + (n / 10) % 10);
    }
    out.push(b'0' + n % 10);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_is_plain_reset() {
        assert_eq!(Style::default().sgr(), "\x1b[0m");
        assert!(Style::default().is_default());
    }

    #[test]
    fn test_apply_named_colors() {
        let mut style = Style::default();
        style.apply_sgr(&[31, 44]);
        assert_eq!(style.fg, Color::Red);
        assert_eq!(style.bg, Color::Blue);
    }

    #[test]
    fn test_apply_bright_and_reset_planes() {
        let mut style = Style::default();
        style.apply_sgr(&[96, 100]);
        assert_eq!(style.fg, Color::BrightCyan);
        assert_eq!(style.bg, Color::BrightBlack);
        style.apply_sgr(&[39, 49]);
        assert_eq!(style, Style::default());
    }

    #[test]
    fn test_apply_truecolor_and_xterm() {
        let mut style = Style::default();
        style.apply_sgr(&[38, 2, 255, 128, 0]);
        assert_eq!(style.fg, Color::Rgb(255, 128, 0));
        style.apply_sgr(&[48, 5, 1]);
        assert_eq!(style.bg, Color::Red);
        style.apply_sgr(&[48, 5, 232]);
        assert_eq!(style.bg, Color::Rgb(8, 8, 8));
    }

    #[test]
    fn test_zero_resets_everything() {
        let mut style = Style::default().with_fg(Color::Green);
        style.apply_sgr(&[1, 4]);
        style.apply_sgr(&[0]);
        assert_eq!(style, Style::default());
        // Empty parameter list behaves like [0]
        let mut style = Style::default().with_bg(Color::Red);
        style.apply_sgr(&[]);
        assert_eq!(style, Style::default());
    }

    #[test]
    fn test_off_codes_remove_modifiers() {
        let mut style = Style::default();
        style.apply_sgr(&[1, 2, 4]);
        assert!(style.mods.contains(Modifiers::BOLD | Modifiers::DIM));
        style.apply_sgr(&[22]);
        assert!(!style.mods.contains(Modifiers::BOLD));
        assert!(!style.mods.contains(Modifiers::DIM));
        assert!(style.mods.contains(Modifiers::UNDERLINE));
    }

    #[test]
    fn test_last_writer_wins_within_sequence() {
        let mut style = Style::default();
        style.apply_sgr(&[31, 32, 33]);
        assert_eq!(style.fg, Color::Yellow);
    }

    #[test]
    fn test_encode_combines_reset_and_attributes() {
        let style = Style::default()
            .with_fg(Color::Rgb(255, 0, 128))
            .with_bg(Color::Blue)
            .with_mods(Modifiers::BOLD | Modifiers::UNDERLINE);
        assert_eq!(style.sgr(), "\x1b[0;1;4;38;2;255;0;128;44m");
    }

    #[test]
    fn test_encode_apply_round_trip() {
        let styles = [
            Style::default(),
            Style::default().with_fg(Color::BrightMagenta),
            Style::default()
                .with_bg(Color::Rgb(1, 22, 133))
                .with_mods(Modifiers::DIM | Modifiers::STRIKETHROUGH),
            Style::default()
                .with_fg(Color::White)
                .with_bg(Color::BrightWhite)
                .with_mods(Modifiers::all()),
        ];
        for original in styles {
            let mut reparsed = Style::default().with_fg(Color::Green);
            let encoded = original.sgr();
            let params: Vec<u16> = encoded[2..encoded.len() - 1]
                .split(';')
                .map(|p| p.parse().unwrap())
                .collect();
            reparsed.apply_sgr(&params);
            assert_eq!(reparsed, original, "round trip failed for {encoded:?}");
        }
    }

    #[test]
    fn test_malformed_extended_color_ignored() {
        let mut style = Style::default();
        style.apply_sgr(&[38]);
        assert_eq!(style.fg, Color::Default);
        style.apply_sgr(&[38, 9, 31]);
        // The bogus introducer argument is swallowed, the 31 still applies
        assert_eq!(style.fg, Color::Red);
    }
}
