//! Login form demo.
//!
//! Demonstrates:
//! - TextInput and Button widgets on the focus ring
//! - Tab / shift+tab / arrow navigation between fields
//! - Masked input for the password field
//! - Mouse clicks moving focus and pressing the button

use std::cell::RefCell;
use std::rc::Rc;

use weft::focus::{FocusHandle, Focusable};
use weft::screen::layer;
use weft::style::styled;
use weft::widget::{Button, TextInput};
use weft::{Color, KeyCode, Modifiers, MouseAction, MouseButton, Rect, Session, Style};

const FORM_WIDTH: u16 = 40;

fn main() -> Result<(), weft::Error> {
    let mut session = Session::new();
    let (width, _) = session.size();
    let left = width.saturating_sub(FORM_WIDTH) / 2;

    let username = Rc::new(RefCell::new(
        TextInput::new(Rect::new(left, 4, FORM_WIDTH, 1))
            .with_prompt("Username: ")
            .with_placeholder("your name"),
    ));
    let password = Rc::new(RefCell::new(
        TextInput::new(Rect::new(left, 6, FORM_WIDTH, 1))
            .with_prompt("Password: ")
            .with_mask('*'),
    ));
    let status = Rc::new(RefCell::new(String::from(
        "Tab moves focus, enter submits, esc quits.",
    )));

    let submit = {
        let username = username.clone();
        let password = password.clone();
        let status = status.clone();
        move || {
            let user = username.borrow();
            let pass = password.borrow();
            *status.borrow_mut() = if user.is_empty() || pass.is_empty() {
                String::from("Both fields are required.")
            } else {
                format!("Welcome, {}!", user.content())
            };
        }
    };
    let button = Rc::new(RefCell::new(
        Button::new(Rect::new(left, 8, 12, 1), "Sign in").with_action(submit),
    ));

    // Tab order follows registration order
    session.focus().register(username.clone());
    session.focus().register(password.clone());
    session.focus().register(button.clone());

    {
        let username = username.clone();
        let password = password.clone();
        let button = button.clone();
        let status = status.clone();
        session.mount(
            layer::CONTENT,
            Box::new(move |s| {
                let title = styled(
                    "Sign in",
                    Style::default().with_mods(Modifiers::BOLD),
                );
                s.write(i32::from(left), 2, &title, None);
                username.borrow().draw(s);
                password.borrow().draw(s);
                button.borrow().draw(s);
                let line = styled(
                    &status.borrow(),
                    Style::default().with_fg(Color::BrightBlack),
                );
                s.write(i32::from(left), 10, &line, None);
            }),
        );
    }

    // Enter submits from anywhere in the form
    {
        let button = button.clone();
        session.on_key(move |s, key| match key.code {
            KeyCode::Esc => {
                s.stop();
                true
            }
            KeyCode::Enter => {
                button.borrow_mut().press();
                true
            }
            _ => false,
        });
    }

    // Click to focus a field or press the button
    session.on_mouse(move |s, mouse| {
        if mouse.action != MouseAction::Down || mouse.button != Some(MouseButton::Left) {
            return false;
        }
        if button.borrow().contains(mouse.x, mouse.y) {
            let handle: FocusHandle = button.clone();
            s.focus().focus(&handle);
            button.borrow_mut().press();
            return true;
        }
        let fields: [(FocusHandle, Rect); 2] = [
            (username.clone(), username.borrow().bounds()),
            (password.clone(), password.borrow().bounds()),
        ];
        for (handle, bounds) in fields {
            if bounds.contains(mouse.x, mouse.y) {
                s.focus().focus(&handle);
                return true;
            }
        }
        false
    });

    session.run()
}
