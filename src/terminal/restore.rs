//! Shared terminal restore path.
//!
//! The terminal must come back to a usable state no matter how the process
//! ends: orderly teardown, panic unwind, or a fatal signal. All three paths
//! funnel through [`restore_now`], which consults process-global flags set
//! on session entry. The flags are the one piece of global state in the
//! crate; restore has to be reachable from contexts that cannot hold a
//! session reference.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::output::OutputBuffer;

/// An entered session exists and the terminal needs restoring.
static ENTERED: AtomicBool = AtomicBool::new(false);
/// Raw mode was enabled on entry.
static RAW_MODE: AtomicBool = AtomicBool::new(false);
/// The alternate screen was switched on on entry.
static ALT_SCREEN: AtomicBool = AtomicBool::new(false);
/// Mouse reporting was switched on on entry.
static MOUSE: AtomicBool = AtomicBool::new(false);
/// The panic hook has been chained already.
static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Record what session entry changed, so out-of-band restores know what to
/// undo.
pub(crate) fn mark_entered(raw: bool, alt_screen: bool, mouse: bool) {
    RAW_MODE.store(raw, Ordering::SeqCst);
    ALT_SCREEN.store(alt_screen, Ordering::SeqCst);
    MOUSE.store(mouse, Ordering::SeqCst);
    ENTERED.store(true, Ordering::SeqCst);
}

/// Record an orderly teardown; later [`restore_now`] calls become no-ops.
pub(crate) fn mark_left() {
    ENTERED.store(false, Ordering::SeqCst);
}

/// Restore the terminal immediately, writing straight to stdout.
///
/// Idempotent: only the first call after an entry does anything. Undoes the
/// entry steps in reverse order (mouse reporting, cursor, attributes,
/// alternate screen, raw mode). Errors are swallowed; there is nowhere to
/// report them from a panic or signal context.
pub fn restore_now() {
    if !ENTERED.swap(false, Ordering::SeqCst) {
        return;
    }
    let mut out = OutputBuffer::with_capacity(64);
    if MOUSE.load(Ordering::SeqCst) {
        out.disable_mouse();
    }
    out.cursor_show();
    out.reset_attrs();
    if ALT_SCREEN.load(Ordering::SeqCst) {
        out.leave_alt_screen();
    }
    let _ = out.flush_to(&mut io::stdout());
    if RAW_MODE.load(Ordering::SeqCst) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
    debug!("terminal restored out of band");
}

/// Chain a panic hook that restores the terminal before the default hook
/// prints the panic message, so the message lands on a readable screen.
/// Installs at most once per process.
pub(crate) fn install_panic_hook() {
    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_now();
        default_hook(info);
    }));
}
