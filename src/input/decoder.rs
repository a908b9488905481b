//! Incremental decoder for raw terminal bytes.
//!
//! Bytes arrive in arbitrary chunks; escape sequences may be split across
//! reads. The decoder buffers an incomplete tail and resumes on the next
//! [`Decoder::feed`]. A lone `ESC` is ambiguous (escape key or sequence
//! start), so it stays pending until more bytes arrive or the caller's poll
//! timeout fires [`Decoder::flush_pending`].
//!
//! Recognized input: UTF-8 text, control bytes, CSI and SS3 key sequences
//! with xterm modifier parameters, and the SGR extended mouse protocol
//! (`ESC [ < Cb ; Cx ; Cy M/m`). Anything malformed is discarded silently.

use tracing::trace;

use super::event::{
    InputEvent, KeyCode, KeyEvent, KeyModifiers, MouseAction, MouseButton, MouseEvent,
};

/// One decoding step over the head of the buffer.
enum Step {
    /// A complete event consuming `n` bytes.
    Event(InputEvent, usize),
    /// `n` bytes of unusable input to discard.
    Skip(usize),
    /// The buffer holds the prefix of an unfinished token.
    Incomplete,
}

/// Streaming input decoder.
#[derive(Debug, Default)]
pub struct Decoder {
    pending: Vec<u8>,
}

impl Decoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as many events as `bytes` (plus any buffered tail) yields.
    ///
    /// Incomplete trailing sequences are buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<InputEvent> {
        self.pending.extend_from_slice(bytes);
        let mut events = Vec::new();
        let mut pos = 0;
        while pos < self.pending.len() {
            match decode_one(&self.pending[pos..]) {
                Step::Event(ev, n) => {
                    events.push(ev);
                    pos += n;
                }
                Step::Skip(n) => {
                    trace!(skipped = n, "discarding unrecognized input");
                    pos += n;
                }
                Step::Incomplete => break,
            }
        }
        self.pending.drain(..pos);
        events
    }

    /// Whether an unfinished sequence is waiting for more bytes.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Resolve buffered input that will not be continued.
    ///
    /// Called on a poll timeout: a dangling `ESC` becomes the escape key and
    /// whatever followed it is re-decoded on its own; a torn non-escape tail
    /// is dropped.
    pub fn flush_pending(&mut self) -> Vec<InputEvent> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let buffered = std::mem::take(&mut self.pending);
        if buffered[0] == 0x1b {
            let mut events = vec![InputEvent::Key(KeyEvent::plain(KeyCode::Esc))];
            events.extend(self.feed(&buffered[1..]));
            events
        } else {
            trace!(bytes = buffered.len(), "dropping torn input tail");
            Vec::new()
        }
    }
}

/// Decode one token from the head of `buf`.
fn decode_one(buf: &[u8]) -> Step {
    let first = buf[0];
    if first == 0x1b {
        return decode_escape(buf);
    }
    if first < 0x20 || first == 0x7f {
        return decode_control(first);
    }
    decode_text(buf, KeyModifiers::NONE)
}

/// Decode a control byte into its conventional key.
fn decode_control(byte: u8) -> Step {
    let event = match byte {
        0x00 => KeyEvent::plain(KeyCode::Null),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0a | 0x0d => KeyEvent::plain(KeyCode::Enter),
        0x08 | 0x7f => KeyEvent::plain(KeyCode::Backspace),
        0x01..=0x1a => KeyEvent::new(
            KeyCode::Char((byte - 0x01 + b'a') as char),
            KeyModifiers::CTRL,
        ),
        _ => return Step::Skip(1),
    };
    Step::Event(InputEvent::Key(event), 1)
}

/// Decode UTF-8 text starting at `buf[0]`, with `modifiers` applied (used
/// for meta-prefixed characters). Uppercase ASCII also reports shift.
fn decode_text(buf: &[u8], mut modifiers: KeyModifiers) -> Step {
    let len = match buf[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Step::Skip(1),
    };
    if buf.len() < len {
        return Step::Incomplete;
    }
    let Ok(s) = std::str::from_utf8(&buf[..len]) else {
        return Step::Skip(1);
    };
    let Some(c) = s.chars().next() else {
        return Step::Skip(1);
    };
    if c.is_ascii_uppercase() {
        modifiers.shift = true;
    }
    Step::Event(
        InputEvent::Key(KeyEvent::new(KeyCode::Char(c), modifiers)),
        len,
    )
}

/// Decode a token beginning with `ESC`.
fn decode_escape(buf: &[u8]) -> Step {
    let Some(&second) = buf.get(1) else {
        return Step::Incomplete;
    };
    match second {
        b'[' => decode_csi(buf),
        b'O' => decode_ss3(buf),
        // Meta chord: ESC followed by a printable character
        0x20..=0x7e | 0xc0..=0xf7 => match decode_text(&buf[1..], KeyModifiers::META) {
            Step::Event(ev, n) => Step::Event(ev, n + 1),
            Step::Skip(n) => Step::Skip(n + 1),
            Step::Incomplete => Step::Incomplete,
        },
        // ESC before a control byte: the escape key on its own
        _ => Step::Event(InputEvent::Key(KeyEvent::plain(KeyCode::Esc)), 1),
    }
}

/// Decode `ESC O <final>` (SS3 keys sent by application cursor mode).
fn decode_ss3(buf: &[u8]) -> Step {
    let Some(&final_byte) = buf.get(2) else {
        return Step::Incomplete;
    };
    let code = match final_byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Step::Skip(3),
    };
    Step::Event(InputEvent::Key(KeyEvent::plain(code)), 3)
}

/// Decode a CSI sequence (`ESC [ ...`).
fn decode_csi(buf: &[u8]) -> Step {
    // Scan past parameter (0x30-0x3f) and intermediate (0x20-0x2f) bytes
    // for a final byte in 0x40-0x7e.
    let body_start = 2;
    let mut i = body_start;
    loop {
        let Some(&b) = buf.get(i) else {
            return Step::Incomplete;
        };
        match b {
            0x20..=0x3f => i += 1,
            0x40..=0x7e => break,
            // Aborted sequence: drop it, resync at the stray byte
            _ => return Step::Skip(i),
        }
    }
    let final_byte = buf[i];
    let body = &buf[body_start..i];
    let consumed = i + 1;

    // SGR mouse reports: ESC [ < Cb ; Cx ; Cy (M = press class, m = release)
    if body.first() == Some(&b'<') && (final_byte == b'M' || final_byte == b'm') {
        return match decode_sgr_mouse(&body[1..], final_byte == b'M') {
            Some(mouse) => Step::Event(InputEvent::Mouse(mouse), consumed),
            None => Step::Skip(consumed),
        };
    }

    let Some(params) = csi_params(body) else {
        return Step::Skip(consumed);
    };
    let modifiers = params
        .get(1)
        .map_or(KeyModifiers::NONE, |&m| decode_modifier_param(m));

    let code = match final_byte {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        b'P' => Some(KeyCode::F(1)),
        b'Q' => Some(KeyCode::F(2)),
        b'S' => Some(KeyCode::F(4)),
        b'Z' => {
            return Step::Event(
                InputEvent::Key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
                consumed,
            );
        }
        b'~' => tilde_key(params.first().copied().unwrap_or(0)),
        _ => None,
    };
    match code {
        Some(code) => Step::Event(
            InputEvent::Key(KeyEvent::new(code, modifiers)),
            consumed,
        ),
        None => Step::Skip(consumed),
    }
}

/// Key for a `CSI n ~` sequence.
fn tilde_key(n: u16) -> Option<KeyCode> {
    match n {
        1 | 7 => Some(KeyCode::Home),
        2 => Some(KeyCode::Insert),
        3 => Some(KeyCode::Delete),
        4 | 8 => Some(KeyCode::End),
        5 => Some(KeyCode::PageUp),
        6 => Some(KeyCode::PageDown),
        11..=15 => Some(KeyCode::F(u8::try_from(n - 10).ok()?)),
        17..=21 => Some(KeyCode::F(u8::try_from(n - 11).ok()?)),
        23 | 24 => Some(KeyCode::F(u8::try_from(n - 12).ok()?)),
        _ => None,
    }
}

/// Parse a plain CSI parameter body into numbers. Empty segments decode as
/// 0; any non-numeric byte makes the whole body unusable.
fn csi_params(body: &[u8]) -> Option<Vec<u16>> {
    if body.is_empty() {
        return Some(Vec::new());
    }
    let mut params = Vec::new();
    for seg in body.split(|&b| b == b';') {
        if seg.is_empty() {
            params.push(0);
            continue;
        }
        let mut value: u32 = 0;
        for &b in seg {
            if !b.is_ascii_digit() {
                return None;
            }
            value = (value * 10 + u32::from(b - b'0')).min(u32::from(u16::MAX));
        }
        params.push(value as u16);
    }
    Some(params)
}

/// Decode an xterm modifier parameter: the value minus one is a bitfield of
/// shift (1), meta (2), ctrl (4).
fn decode_modifier_param(m: u16) -> KeyModifiers {
    let bits = m.saturating_sub(1);
    KeyModifiers {
        shift: bits & 1 != 0,
        meta: bits & 2 != 0,
        ctrl: bits & 4 != 0,
    }
}

/// Decode the body of an SGR mouse report (after the `<`).
fn decode_sgr_mouse(body: &[u8], press_class: bool) -> Option<MouseEvent> {
    let params = csi_params(body)?;
    if params.len() < 3 {
        return None;
    }
    let cb = params[0];
    let modifiers = KeyModifiers {
        shift: cb & 4 != 0,
        meta: cb & 8 != 0,
        ctrl: cb & 16 != 0,
    };
    let base = cb & !(4 | 8 | 16);
    let low = base & 3;
    let (button, action) = if base & 64 != 0 {
        // Wheel: 64 up, 65 down; the protocol has no wheel release
        let wheel = if low & 1 == 0 {
            MouseButton::WheelUp
        } else {
            MouseButton::WheelDown
        };
        (Some(wheel), MouseAction::Down)
    } else if base & 32 != 0 {
        // Motion, with the held button in the low bits (3 = none)
        (low_button(low), MouseAction::Move)
    } else {
        let action = if press_class {
            MouseAction::Down
        } else {
            MouseAction::Up
        };
        (low_button(low), action)
    };
    Some(MouseEvent {
        x: params[1].saturating_sub(1),
        y: params[2].saturating_sub(1),
        button,
        action,
        modifiers,
    })
}

/// Button encoded in the low two bits of `Cb`.
const fn low_button(low: u16) -> Option<MouseButton> {
    match low {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Vec<InputEvent> {
        Decoder::new().feed(bytes)
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::plain(code))
    }

    #[test]
    fn test_plain_characters() {
        assert_eq!(
            decode(b"ab"),
            vec![key(KeyCode::Char('a')), key(KeyCode::Char('b'))]
        );
    }

    #[test]
    fn test_uppercase_reports_shift() {
        let events = decode(b"A");
        assert_eq!(
            events,
            vec![InputEvent::Key(KeyEvent::new(
                KeyCode::Char('A'),
                KeyModifiers::SHIFT
            ))]
        );
    }

    #[test]
    fn test_utf8_multibyte() {
        assert_eq!(decode("é".as_bytes()), vec![key(KeyCode::Char('é'))]);
        assert_eq!(decode("日".as_bytes()), vec![key(KeyCode::Char('日'))]);
    }

    #[test]
    fn test_utf8_split_across_feeds() {
        let mut decoder = Decoder::new();
        let bytes = "語".as_bytes();
        assert!(decoder.feed(&bytes[..1]).is_empty());
        assert!(decoder.has_pending());
        assert_eq!(decoder.feed(&bytes[1..]), vec![key(KeyCode::Char('語'))]);
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(decode(b"\r"), vec![key(KeyCode::Enter)]);
        assert_eq!(decode(b"\n"), vec![key(KeyCode::Enter)]);
        assert_eq!(decode(b"\t"), vec![key(KeyCode::Tab)]);
        assert_eq!(decode(b"\x7f"), vec![key(KeyCode::Backspace)]);
        assert_eq!(decode(b"\x08"), vec![key(KeyCode::Backspace)]);
        assert_eq!(decode(b"\x00"), vec![key(KeyCode::Null)]);
    }

    #[test]
    fn test_ctrl_letters() {
        let events = decode(b"\x01\x03\x1a");
        let expect = |c| InputEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CTRL));
        assert_eq!(events, vec![expect('a'), expect('c'), expect('z')]);
    }

    #[test]
    fn test_arrow_keys_csi_and_ss3() {
        assert_eq!(decode(b"\x1b[A"), vec![key(KeyCode::Up)]);
        assert_eq!(decode(b"\x1b[B"), vec![key(KeyCode::Down)]);
        assert_eq!(decode(b"\x1b[C"), vec![key(KeyCode::Right)]);
        assert_eq!(decode(b"\x1b[D"), vec![key(KeyCode::Left)]);
        assert_eq!(decode(b"\x1bOA"), vec![key(KeyCode::Up)]);
        assert_eq!(decode(b"\x1bOD"), vec![key(KeyCode::Left)]);
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(decode(b"\x1b[H"), vec![key(KeyCode::Home)]);
        assert_eq!(decode(b"\x1b[F"), vec![key(KeyCode::End)]);
        assert_eq!(decode(b"\x1b[2~"), vec![key(KeyCode::Insert)]);
        assert_eq!(decode(b"\x1b[3~"), vec![key(KeyCode::Delete)]);
        assert_eq!(decode(b"\x1b[5~"), vec![key(KeyCode::PageUp)]);
        assert_eq!(decode(b"\x1b[6~"), vec![key(KeyCode::PageDown)]);
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(decode(b"\x1bOP"), vec![key(KeyCode::F(1))]);
        assert_eq!(decode(b"\x1b[15~"), vec![key(KeyCode::F(5))]);
        assert_eq!(decode(b"\x1b[17~"), vec![key(KeyCode::F(6))]);
        assert_eq!(decode(b"\x1b[21~"), vec![key(KeyCode::F(10))]);
        assert_eq!(decode(b"\x1b[24~"), vec![key(KeyCode::F(12))]);
    }

    #[test]
    fn test_backtab() {
        assert_eq!(
            decode(b"\x1b[Z"),
            vec![InputEvent::Key(KeyEvent::new(
                KeyCode::BackTab,
                KeyModifiers::SHIFT
            ))]
        );
    }

    #[test]
    fn test_csi_modifier_parameters() {
        assert_eq!(
            decode(b"\x1b[1;5A"),
            vec![InputEvent::Key(KeyEvent::new(
                KeyCode::Up,
                KeyModifiers::CTRL
            ))]
        );
        assert_eq!(
            decode(b"\x1b[1;2D"),
            vec![InputEvent::Key(KeyEvent::new(
                KeyCode::Left,
                KeyModifiers::SHIFT
            ))]
        );
        assert_eq!(
            decode(b"\x1b[3;3~"),
            vec![InputEvent::Key(KeyEvent::new(
                KeyCode::Delete,
                KeyModifiers::META
            ))]
        );
    }

    #[test]
    fn test_meta_chords() {
        assert_eq!(
            decode(b"\x1bx"),
            vec![InputEvent::Key(KeyEvent::new(
                KeyCode::Char('x'),
                KeyModifiers::META
            ))]
        );
    }

    #[test]
    fn test_escape_sequence_split_across_feeds() {
        let mut decoder = Decoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert!(decoder.has_pending());
        assert_eq!(decoder.feed(b"[A"), vec![key(KeyCode::Up)]);
    }

    #[test]
    fn test_flush_pending_resolves_lone_escape() {
        let mut decoder = Decoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert_eq!(decoder.flush_pending(), vec![key(KeyCode::Esc)]);
        assert!(!decoder.has_pending());
        assert!(decoder.flush_pending().is_empty());
    }

    #[test]
    fn test_escape_before_control_byte_is_escape_key() {
        let events = decode(b"\x1b\r");
        assert_eq!(events, vec![key(KeyCode::Esc), key(KeyCode::Enter)]);
    }

    #[test]
    fn test_sgr_mouse_left_press() {
        // Column 5, row 10 on the wire; decoded coordinates are 0-based
        let events = decode(b"\x1b[<0;5;10M");
        assert_eq!(
            events,
            vec![InputEvent::Mouse(MouseEvent {
                x: 4,
                y: 9,
                button: Some(MouseButton::Left),
                action: MouseAction::Down,
                modifiers: KeyModifiers::NONE,
            })]
        );
    }

    #[test]
    fn test_sgr_mouse_release() {
        let events = decode(b"\x1b[<2;1;1m");
        assert_eq!(
            events,
            vec![InputEvent::Mouse(MouseEvent {
                x: 0,
                y: 0,
                button: Some(MouseButton::Right),
                action: MouseAction::Up,
                modifiers: KeyModifiers::NONE,
            })]
        );
    }

    #[test]
    fn test_sgr_mouse_wheel() {
        let events = decode(b"\x1b[<64;3;4M\x1b[<65;3;4M");
        assert_eq!(events.len(), 2);
        let InputEvent::Mouse(up) = events[0] else {
            panic!("expected mouse event");
        };
        let InputEvent::Mouse(down) = events[1] else {
            panic!("expected mouse event");
        };
        assert_eq!(up.button, Some(MouseButton::WheelUp));
        assert_eq!(up.action, MouseAction::Down);
        assert_eq!(down.button, Some(MouseButton::WheelDown));
        assert_eq!((down.x, down.y), (2, 3));
    }

    #[test]
    fn test_sgr_mouse_drag_and_hover() {
        let events = decode(b"\x1b[<32;2;2M\x1b[<35;7;8M");
        assert_eq!(
            events[0],
            InputEvent::Mouse(MouseEvent {
                x: 1,
                y: 1,
                button: Some(MouseButton::Left),
                action: MouseAction::Move,
                modifiers: KeyModifiers::NONE,
            })
        );
        assert_eq!(
            events[1],
            InputEvent::Mouse(MouseEvent {
                x: 6,
                y: 7,
                button: None,
                action: MouseAction::Move,
                modifiers: KeyModifiers::NONE,
            })
        );
    }

    #[test]
    fn test_sgr_mouse_modifier_bits() {
        let events = decode(b"\x1b[<16;1;1M\x1b[<12;1;1M");
        let InputEvent::Mouse(ctrl_click) = events[0] else {
            panic!("expected mouse event");
        };
        let InputEvent::Mouse(shift_meta) = events[1] else {
            panic!("expected mouse event");
        };
        assert!(ctrl_click.modifiers.ctrl);
        assert_eq!(ctrl_click.button, Some(MouseButton::Left));
        assert!(shift_meta.modifiers.shift);
        assert!(shift_meta.modifiers.meta);
    }

    #[test]
    fn test_malformed_sequences_discarded() {
        assert!(decode(b"\x1b[<0;5M").is_empty());
        assert!(decode(b"\x1b[?25h").is_empty());
        assert!(decode(b"\x1b[999q").is_empty());
        // Decoding resumes cleanly after garbage
        assert_eq!(decode(b"\x1b[<0;5Mz"), vec![key(KeyCode::Char('z'))]);
    }

    #[test]
    fn test_interleaved_text_and_sequences() {
        let events = decode(b"a\x1b[Ab");
        assert_eq!(
            events,
            vec![key(KeyCode::Char('a')), key(KeyCode::Up), key(KeyCode::Char('b'))]
        );
    }
}
