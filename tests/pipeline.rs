//! End-to-end tests over the public API: bytes in, escape stream out.
//!
//! Each scenario drives a writer-backed session the way an application
//! would (mount roots, register widgets, feed input) and asserts on the
//! emitted bytes or the resulting cell grid. Property tests at the end
//! pin the clipping and truncation invariants.
//!
//! Run with: cargo test --test pipeline

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use weft::input::ReaderEvent;
use weft::screen::layer;
use weft::style::{strip, truncate, truncate_split, visual_width};
use weft::widget::{Button, TextInput};
use weft::{Cell, Focusable, Modifiers, Rect, Session, Style, Surface};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

fn session(width: u16, height: u16) -> (Session, SharedBuf) {
    let buf = SharedBuf::default();
    let session = Session::with_writer(Box::new(buf.clone()), width, height);
    (session, buf)
}

fn feed(session: &mut Session, bytes: &[u8]) {
    session
        .injector()
        .send(ReaderEvent::Bytes(bytes.to_vec()))
        .unwrap();
    session.pump(Duration::ZERO).unwrap();
}

fn glyphs(session: &Session, y: u16) -> String {
    let surface = session.surface();
    (0..surface.width())
        .filter_map(|x| surface.cell(x, y))
        .filter(|cell| !cell.is_continuation())
        .map(Cell::glyph)
        .collect()
}

#[test]
fn test_frame_reaches_writer_once() {
    let (mut session, buf) = session(20, 4);
    session.mount(
        layer::CONTENT,
        Box::new(|s| s.write(1, 1, "status: \x1b[32mok\x1b[0m", None)),
    );
    session.pump(Duration::ZERO).unwrap();

    let first = buf.contents();
    assert!(first.contains("status: "));
    assert!(first.contains("\x1b[0;32m"), "green run restyled: {first:?}");

    // A pump with no changes emits nothing further
    session.pump(Duration::ZERO).unwrap();
    assert_eq!(buf.len(), first.len());
}

#[test]
fn test_typed_text_flows_to_the_frame() {
    let (mut session, buf) = session(30, 3);
    let input = Rc::new(RefCell::new(
        TextInput::new(Rect::new(0, 0, 30, 1)).with_prompt("> "),
    ));
    session.focus().register(input.clone());
    {
        let input = input.clone();
        session.mount(layer::CONTENT, Box::new(move |s| input.borrow().draw(s)));
    }
    session.pump(Duration::ZERO).unwrap();

    feed(&mut session, b"hello");
    assert_eq!(input.borrow().content(), "hello");
    assert!(glyphs(&session, 0).starts_with("> hello"));
    assert!(buf.contents().contains("hello"));
}

#[test]
fn test_focus_cycles_between_widgets_end_to_end() {
    let (mut session, _buf) = session(30, 5);
    let field = Rc::new(RefCell::new(TextInput::new(Rect::new(0, 0, 30, 1))));
    let button = Rc::new(RefCell::new(Button::new(Rect::new(0, 2, 10, 1), "Go")));
    session.focus().register(field.clone());
    session.focus().register(button.clone());
    assert!(field.borrow().is_focused());

    feed(&mut session, b"\t");
    assert!(!field.borrow().is_focused());
    assert!(button.borrow().is_focused());

    // Shift+tab wraps back
    feed(&mut session, b"\x1b[Z");
    assert!(field.borrow().is_focused());

    // The field swallows arrows, so focus stays put
    feed(&mut session, b"ab\x1b[D");
    assert!(field.borrow().is_focused());
    assert_eq!(field.borrow().content(), "ab");
}

#[test]
fn test_arrow_at_field_edge_moves_focus() {
    let (mut session, _buf) = session(30, 5);
    let first = Rc::new(RefCell::new(TextInput::new(Rect::new(0, 0, 30, 1))));
    let second = Rc::new(RefCell::new(TextInput::new(Rect::new(0, 2, 30, 1))));
    session.focus().register(first.clone());
    session.focus().register(second.clone());

    // The cursor sits at column zero, so left has nothing to edit and
    // becomes navigation
    feed(&mut session, b"\x1b[D");
    assert!(!first.borrow().is_focused());
    assert!(second.borrow().is_focused());

    // Right at the end of the content cycles forward again
    feed(&mut session, b"hi\x1b[C");
    assert!(first.borrow().is_focused());
    assert_eq!(second.borrow().content(), "hi");
}

#[test]
fn test_modal_layer_overdraws_and_restores() {
    let (mut session, _buf) = session(12, 3);
    session.mount(
        layer::CONTENT,
        Box::new(|s| s.write(0, 1, "underneath", None)),
    );
    session.pump(Duration::ZERO).unwrap();
    assert!(glyphs(&session, 1).starts_with("underneath"));

    let modal = session.mount(layer::MODAL, Box::new(|s| s.write(0, 1, "MODAL", None)));
    session.pump(Duration::ZERO).unwrap();
    assert!(glyphs(&session, 1).starts_with("MODALneath"));

    session.unmount(modal);
    session.pump(Duration::ZERO).unwrap();
    assert!(glyphs(&session, 1).starts_with("underneath"));
}

#[test]
fn test_resize_repaints_the_whole_frame() {
    let (mut session, buf) = session(20, 3);
    session.mount(layer::CONTENT, Box::new(|s| s.write(0, 0, "wide", None)));
    session.pump(Duration::ZERO).unwrap();
    let before = buf.len();

    session.set_size(10, 2);
    session.pump(Duration::ZERO).unwrap();
    let tail = &buf.contents()[before..];
    assert!(tail.contains("\x1b[2J"), "resize clears the screen");
    assert!(tail.contains("wide"), "content repaints after resize");
    assert_eq!(session.size(), (10, 2));
}

#[test]
fn test_mouse_click_drives_button() {
    let (mut session, _buf) = session(20, 3);
    let pressed = Rc::new(RefCell::new(0));
    let count = pressed.clone();
    let button = Rc::new(RefCell::new(
        Button::new(Rect::new(2, 1, 6, 1), "OK").with_action(move || *count.borrow_mut() += 1),
    ));
    {
        let button = button.clone();
        session.on_mouse(move |_, mouse| {
            if button.borrow().contains(mouse.x, mouse.y) {
                button.borrow_mut().press();
                return true;
            }
            false
        });
    }

    // Press at column 3, row 2 (1-based on the wire)
    feed(&mut session, b"\x1b[<0;4;2M");
    assert_eq!(*pressed.borrow(), 1);
    // A click elsewhere misses
    feed(&mut session, b"\x1b[<0;15;1M");
    assert_eq!(*pressed.borrow(), 1);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn text_strategy() -> impl Strategy<Value = String> {
        "[ -~]{0,24}(\u{1b}\\[3[12]m)?[ -~日本語é]{0,12}"
    }

    fn style_strategy() -> impl Strategy<Value = Style> {
        use weft::Color;
        let color = prop_oneof![
            Just(Color::Default),
            Just(Color::Red),
            Just(Color::BrightCyan),
            any::<(u8, u8, u8)>().prop_map(|(r, g, b)| Color::Rgb(r, g, b)),
        ];
        (color.clone(), color, any::<u8>()).prop_map(|(fg, bg, bits)| {
            Style::default()
                .with_fg(fg)
                .with_bg(bg)
                .with_mods(Modifiers::from_bits_truncate(bits))
        })
    }

    proptest! {
        /// No write, whatever its coordinates, escapes its clip rectangle.
        #[test]
        fn prop_writes_never_escape_clip(
            x in -20i32..40,
            y in -5i32..15,
            cx in 0u16..12,
            cy in 0u16..6,
            cw in 0u16..14,
            ch in 0u16..6,
            text in text_strategy(),
        ) {
            let mut surface = Surface::new(24, 8);
            let clip = Rect::new(cx, cy, cw, ch);
            surface.write(x, y, &text, Some(clip));
            for py in 0..8u16 {
                for px in 0..24u16 {
                    if !clip.contains(px, py) {
                        prop_assert_eq!(
                            *surface.cell(px, py).unwrap(),
                            Cell::EMPTY,
                            "cell ({}, {}) written outside clip {:?}",
                            px, py, clip
                        );
                    }
                }
            }
        }

        /// Truncation never exceeds the budget and never reorders text.
        #[test]
        fn prop_truncate_respects_budget(text in text_strategy(), max in 0usize..30) {
            let cut = truncate(&text, max);
            prop_assert!(visual_width(&cut) <= max);

            let full = strip(&text);
            let kept = strip(&cut);
            prop_assert!(
                full.starts_with(&kept),
                "{:?} is not a prefix of {:?}", kept, full
            );
            if visual_width(&text) <= max {
                prop_assert_eq!(cut, text);
            }
        }

        /// Splitting preserves every visible character exactly once.
        #[test]
        fn prop_truncate_split_loses_nothing(text in text_strategy(), max in 0usize..30) {
            let (head, tail, _style) = truncate_split(&text, max);
            prop_assert!(visual_width(&head) <= max);
            let mut joined = strip(&head);
            joined.push_str(&strip(&tail));
            prop_assert_eq!(joined, strip(&text));
        }

        /// A style written as SGR text reads back as the same style.
        #[test]
        fn prop_style_roundtrips_through_write(style in style_strategy()) {
            let mut surface = Surface::new(4, 1);
            let mut text = style.sgr();
            text.push('x');
            surface.write(0, 0, &text, None);
            prop_assert_eq!(surface.cell(0, 0).unwrap().style(), style);
        }
    }
}
