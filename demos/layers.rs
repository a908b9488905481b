//! Layer compositing demo.
//!
//! Demonstrates:
//! - Roots mounted at the background, content, modal, and tooltip levels
//! - Mounting and unmounting a modal at runtime
//! - A tooltip layer following the mouse

use std::cell::Cell;
use std::rc::Rc;

use weft::screen::{layer, RootId, Surface};
use weft::style::styled;
use weft::{Color, KeyCode, Modifiers, MouseAction, Session, Style};

fn main() -> Result<(), weft::Error> {
    let mut session = Session::new();

    session.mount(layer::BACKGROUND, Box::new(draw_background));
    session.mount(layer::CONTENT, Box::new(draw_content));

    // The modal mounts and unmounts on demand; remember its handle
    let modal: Rc<Cell<Option<RootId>>> = Rc::new(Cell::new(None));
    session.on_key(move |s, key| match key.code {
        KeyCode::Char('m') => {
            match modal.get() {
                Some(id) => {
                    s.unmount(id);
                    modal.set(None);
                }
                None => {
                    let id = s.mount(layer::MODAL, Box::new(draw_modal));
                    modal.set(Some(id));
                }
            }
            true
        }
        KeyCode::Esc | KeyCode::Char('q') => {
            s.stop();
            true
        }
        _ => false,
    });

    // Tooltip follows the pointer
    let pointer: Rc<Cell<(u16, u16)>> = Rc::new(Cell::new((0, 0)));
    {
        let pointer = pointer.clone();
        session.mount(
            layer::TOOLTIP,
            Box::new(move |s| {
                let (x, y) = pointer.get();
                let text = format!(" {x},{y} ");
                let tip = styled(
                    &text,
                    Style::default().with_fg(Color::Black).with_bg(Color::Yellow),
                );
                s.write(i32::from(x) + 1, i32::from(y), &tip, None);
            }),
        );
    }
    session.on_mouse(move |_, mouse| {
        if mouse.action == MouseAction::Move || mouse.action == MouseAction::Down {
            pointer.set((mouse.x, mouse.y));
        }
        true
    });

    session.run()
}

fn draw_background(surface: &mut Surface) {
    let bounds = surface.bounds();
    surface.fill(bounds, '.', Style::default().with_fg(Color::BrightBlack));
}

#[allow(clippy::cast_possible_truncation)]
fn draw_content(surface: &mut Surface) {
    let panel = surface.bounds().centered(46, 11);
    surface.fill(panel, ' ', Style::default());
    let title = styled(
        "Layered compositing",
        Style::default().with_mods(Modifiers::BOLD),
    );
    let lines = [
        "Roots paint in ascending z order,",
        "so the modal covers this panel and",
        "the tooltip covers everything.",
        "",
        "m      toggle the modal",
        "mouse  move the tooltip",
        "q/esc  quit",
    ];
    surface.write(2, 1, &title, Some(panel));
    for (i, line) in lines.iter().enumerate() {
        surface.write(2, 3 + i as i32, line, Some(panel));
    }
}

fn draw_modal(surface: &mut Surface) {
    let frame = surface.bounds().centered(30, 5);
    let body = Style::default().with_fg(Color::Black).with_bg(Color::Cyan);
    surface.fill(frame, ' ', body);
    let mut sgr = Vec::new();
    body.encode_sgr(&mut sgr);
    let prefix = String::from_utf8_lossy(&sgr);
    surface.write(2, 1, &format!("{prefix}This is the modal layer."), Some(frame));
    surface.write(2, 3, &format!("{prefix}Press m to dismiss."), Some(frame));
}
