//! The session: terminal lifecycle, event loop, and wiring.
//!
//! A [`Session`] owns the drawing surface, the compositor, the focus ring,
//! and the input decoder, and connects them to a real terminal: it enters
//! raw mode and the alternate screen, spawns the stdin and signal threads,
//! routes decoded events through listeners and the focus ring, and flushes
//! frame diffs to the writer.
//!
//! Event routing order is fixed: quit interception, then listeners newest
//! first until one consumes, then the focus ring. Resizes are debounced so
//! a drag produces one repaint, not hundreds.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use crossterm::terminal;
use crossterm::tty::IsTty;
use tracing::debug;

use crate::focus::FocusRing;
use crate::input::{Decoder, InputEvent, KeyEvent, MouseEvent, ReaderEvent, StdinReader};
use crate::layout::Rect;
use crate::screen::{Compositor, RootId, Surface};
use crate::terminal::{install_panic_hook, mark_entered, mark_left, OutputBuffer};

#[cfg(unix)]
use crate::input::SignalWatcher;

/// Wait used by [`Session::run`] between wakeups when nothing is pending.
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Session failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Writing to or configuring the terminal failed.
    #[error("terminal io: {0}")]
    Io(#[from] io::Error),
    /// The input threads could not be spawned.
    #[error("input reader: {0}")]
    Reader(io::Error),
}

/// Session tunables.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct SessionConfig {
    /// Switch to the alternate screen on enter.
    pub alternate_screen: bool,
    /// Enable SGR mouse reporting on enter.
    pub mouse: bool,
    /// Hide the cursor while the session runs.
    pub hide_cursor: bool,
    /// Treat ctrl+c as a stop request before any listener sees it.
    pub ctrl_c_stops: bool,
    /// How long to coalesce window resizes before repainting.
    pub resize_debounce: Duration,
    /// How long a dangling escape byte may wait before it becomes the
    /// escape key.
    pub escape_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse: true,
            hide_cursor: true,
            ctrl_c_stops: true,
            resize_debounce: Duration::from_millis(100),
            escape_timeout: Duration::from_millis(25),
        }
    }
}

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type KeyHandler = Box<dyn FnMut(&mut Session, &KeyEvent) -> bool>;
type MouseHandler = Box<dyn FnMut(&mut Session, &MouseEvent) -> bool>;
type ResizeHandler = Box<dyn FnMut(&mut Session, u16, u16)>;

/// A running terminal session.
pub struct Session {
    config: SessionConfig,
    surface: Surface,
    compositor: Compositor,
    focus: FocusRing,
    decoder: Decoder,
    output: OutputBuffer,
    writer: Box<dyn Write + Send>,
    events_tx: Sender<ReaderEvent>,
    events_rx: Receiver<ReaderEvent>,
    stdin_reader: Option<StdinReader>,
    #[cfg(unix)]
    signal_watcher: Option<SignalWatcher>,
    key_listeners: Vec<(ListenerId, KeyHandler)>,
    mouse_listeners: Vec<(ListenerId, MouseHandler)>,
    resize_listeners: Vec<(ListenerId, ResizeHandler)>,
    dead_listeners: Vec<ListenerId>,
    next_listener: u64,
    pending_resize: Option<Instant>,
    // False when driving a caller-supplied writer: no raw mode, no size
    // queries, no global restore state.
    owns_terminal: bool,
    entered: bool,
    running: bool,
}

impl Session {
    /// Create a session on stdout with default configuration.
    ///
    /// The surface takes the current terminal size, falling back to 80x24
    /// when stdout is not a terminal.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Create a session on stdout with custom configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        let (width, height) = terminal::size().unwrap_or((80, 24));
        let mut session = Self::build(config, Box::new(io::stdout()), width, height);
        session.owns_terminal = true;
        session
    }

    /// Create a session that renders to an arbitrary writer.
    ///
    /// No terminal modes are touched and the size never changes on its
    /// own; drive it with [`Session::set_size`] and [`Session::pump`].
    pub fn with_writer(writer: Box<dyn Write + Send>, width: u16, height: u16) -> Self {
        Self::build(SessionConfig::default(), writer, width, height)
    }

    fn build(
        config: SessionConfig,
        writer: Box<dyn Write + Send>,
        width: u16,
        height: u16,
    ) -> Self {
        let (events_tx, events_rx) = bounded(64);
        Self {
            config,
            surface: Surface::new(width, height),
            compositor: Compositor::new(),
            focus: FocusRing::new(),
            decoder: Decoder::new(),
            output: OutputBuffer::new(),
            writer,
            events_tx,
            events_rx,
            stdin_reader: None,
            #[cfg(unix)]
            signal_watcher: None,
            key_listeners: Vec::new(),
            mouse_listeners: Vec::new(),
            resize_listeners: Vec::new(),
            dead_listeners: Vec::new(),
            next_listener: 0,
            pending_resize: None,
            owns_terminal: false,
            entered: false,
            running: true,
        }
    }

    /// Surface size as `(width, height)`.
    pub fn size(&self) -> (u16, u16) {
        (self.surface.width(), self.surface.height())
    }

    /// The drawing surface, for inspection.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The focus ring.
    pub fn focus(&mut self) -> &mut FocusRing {
        &mut self.focus
    }

    /// Whether the session has not been stopped.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Request the event loop to finish after the current iteration.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Mount a draw root at a z level. See [`crate::screen::layer`].
    pub fn mount(&mut self, z: i32, draw: Box<dyn FnMut(&mut Surface)>) -> RootId {
        self.compositor.mount(z, draw)
    }

    /// Remove a draw root.
    pub fn unmount(&mut self, id: RootId) -> bool {
        self.compositor.unmount(id)
    }

    /// Request a repaint on the next loop iteration.
    pub fn schedule_render(&mut self) {
        self.compositor.schedule();
    }

    /// Write styled text into the frame at `(x, y)`, optionally clipped,
    /// and schedule a render.
    ///
    /// While draw roots are mounted the next repaint rebuilds the frame
    /// from the roots; direct writes are for sessions that do not mount.
    pub fn write(&mut self, x: i32, y: i32, text: &str, clip: Option<Rect>) {
        self.surface.write(x, y, text, clip);
        self.compositor.schedule();
    }

    /// Queue raw bytes ahead of the next frame flush.
    ///
    /// The bytes bypass the cell grid, so anything they draw is unknown to
    /// the diff; follow up with [`Session::refresh`] if they touched cells.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.output.write_raw(bytes);
    }

    /// Drop all knowledge of what the terminal shows and repaint from
    /// scratch. Heals the screen after external output scribbled over it.
    pub fn refresh(&mut self) {
        self.output.clear_screen();
        self.output.cursor_home();
        self.surface.invalidate();
        self.compositor.schedule();
    }

    /// Give the terminal its input back and drop every registered
    /// listener: cooked mode, no mouse reporting, empty listener lists.
    ///
    /// The screen is left as drawn; [`Session::leave`] ends the whole
    /// session. Safe to call before [`Session::enter`].
    ///
    /// # Errors
    ///
    /// Returns an error if the mouse-off sequence cannot be written or
    /// raw mode cannot be disabled.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.key_listeners.clear();
        self.mouse_listeners.clear();
        self.resize_listeners.clear();
        if self.entered && self.owns_terminal && io::stdout().is_tty() {
            if self.config.mouse {
                self.output.disable_mouse();
            }
            self.flush_output()?;
            terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Register a key listener. Listeners run newest first, before the
    /// focus ring, until one returns `true`.
    pub fn on_key<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&mut Session, &KeyEvent) -> bool + 'static,
    {
        let id = self.listener_id();
        self.key_listeners.push((id, Box::new(handler)));
        id
    }

    /// Remove a key listener.
    pub fn off_key(&mut self, id: ListenerId) {
        self.key_listeners.retain(|(lid, _)| *lid != id);
        self.dead_listeners.push(id);
    }

    /// Register a mouse listener. Same ordering rules as key listeners.
    pub fn on_mouse<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&mut Session, &MouseEvent) -> bool + 'static,
    {
        let id = self.listener_id();
        self.mouse_listeners.push((id, Box::new(handler)));
        id
    }

    /// Remove a mouse listener.
    pub fn off_mouse(&mut self, id: ListenerId) {
        self.mouse_listeners.retain(|(lid, _)| *lid != id);
        self.dead_listeners.push(id);
    }

    /// Register a resize listener, called with the new size after a
    /// debounced resize lands.
    pub fn on_resize<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&mut Session, u16, u16) + 'static,
    {
        let id = self.listener_id();
        self.resize_listeners.push((id, Box::new(handler)));
        id
    }

    /// Remove a resize listener.
    pub fn off_resize(&mut self, id: ListenerId) {
        self.resize_listeners.retain(|(lid, _)| *lid != id);
        self.dead_listeners.push(id);
    }

    fn listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }

    /// Put the terminal into session state and start the input threads.
    ///
    /// Raw mode, alternate screen, cursor and mouse state are applied in
    /// that order and undone in reverse by [`Session::leave`]. Idempotent.
    /// When stdout is not a terminal only the modes are skipped; the input
    /// threads still run, so piped stdin keeps decoding and dispatching.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode fails or the reader threads cannot
    /// spawn.
    pub fn enter(&mut self) -> Result<(), Error> {
        if self.entered {
            return Ok(());
        }
        // Terminal modes are applied only after thread spawning succeeds
        if self.owns_terminal {
            self.stdin_reader =
                Some(StdinReader::spawn(self.events_tx.clone()).map_err(Error::Reader)?);
            #[cfg(unix)]
            {
                self.signal_watcher =
                    Some(SignalWatcher::spawn(self.events_tx.clone()).map_err(Error::Reader)?);
            }
        }
        let control = self.owns_terminal && io::stdout().is_tty();
        if control {
            terminal::enable_raw_mode()?;
            if self.config.alternate_screen {
                self.output.enter_alt_screen();
            }
            if self.config.hide_cursor {
                self.output.cursor_hide();
            }
            if self.config.mouse {
                self.output.enable_mouse();
            }
            self.output.clear_screen();
            self.output.cursor_home();
            self.flush_output()?;
            mark_entered(true, self.config.alternate_screen, self.config.mouse);
            install_panic_hook();
        }
        self.surface.invalidate();
        self.compositor.schedule();
        self.entered = true;
        debug!(control, "session entered");
        Ok(())
    }

    /// Undo [`Session::enter`] and stop watching for input. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the restoring sequences cannot be written.
    pub fn leave(&mut self) -> Result<(), Error> {
        if !self.entered {
            return Ok(());
        }
        self.entered = false;
        #[cfg(unix)]
        {
            self.signal_watcher = None;
        }
        self.stdin_reader = None;
        let control = self.owns_terminal && io::stdout().is_tty();
        if control {
            if self.config.mouse {
                self.output.disable_mouse();
            }
            self.output.cursor_show();
            self.output.reset_attrs();
            if self.config.alternate_screen {
                self.output.leave_alt_screen();
            }
            self.flush_output()?;
            terminal::disable_raw_mode()?;
            mark_left();
        }
        debug!("session left");
        Ok(())
    }

    /// Enter the terminal and process events until [`Session::stop`].
    ///
    /// # Errors
    ///
    /// Returns the first terminal or reader failure; the terminal is
    /// restored before the error propagates.
    pub fn run(&mut self) -> Result<(), Error> {
        self.enter()?;
        while self.running {
            let wait = self.next_wait();
            if let Err(e) = self.pump(wait) {
                let _ = self.leave();
                return Err(e);
            }
        }
        self.leave()
    }

    /// Process pending events and render if needed, waiting at most
    /// `timeout` for something to arrive.
    ///
    /// Returns whether the session is still running, for host-driven
    /// loops.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the frame to the writer fails.
    pub fn pump(&mut self, timeout: Duration) -> Result<bool, Error> {
        let wait = timeout.min(self.next_wait());
        match self.events_rx.recv_timeout(wait) {
            Ok(event) => {
                self.handle_reader_event(event);
                while let Ok(event) = self.events_rx.try_recv() {
                    self.handle_reader_event(event);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                for event in self.decoder.flush_pending() {
                    self.dispatch_input(event);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.running = false;
            }
        }
        self.apply_due_resize();
        if self.compositor.scheduled() {
            self.render()?;
        }
        Ok(self.running)
    }

    /// Resize the surface now, bypassing the debounce. Fires resize
    /// listeners and schedules a repaint.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.surface.resize(width, height);
        self.output.clear_screen();
        self.output.cursor_home();
        self.compositor.schedule();
        let mut listeners = std::mem::take(&mut self.resize_listeners);
        for (id, handler) in &mut listeners {
            if !self.dead_listeners.contains(id) {
                handler(self, width, height);
            }
        }
        self.merge_listeners(listeners, |s| &mut s.resize_listeners);
    }

    /// Upper bound on how long the loop may sleep before internal
    /// deadlines (escape disambiguation, resize debounce) need service.
    fn next_wait(&self) -> Duration {
        if self.decoder.has_pending() {
            return self.config.escape_timeout;
        }
        if let Some(deadline) = self.pending_resize {
            return deadline
                .saturating_duration_since(Instant::now())
                .max(Duration::from_millis(1));
        }
        IDLE_WAIT
    }

    fn handle_reader_event(&mut self, event: ReaderEvent) {
        match event {
            ReaderEvent::Bytes(bytes) => {
                for input in self.decoder.feed(&bytes) {
                    self.dispatch_input(input);
                }
            }
            ReaderEvent::Winch => {
                self.pending_resize = Some(Instant::now() + self.config.resize_debounce);
            }
            ReaderEvent::HangUp => {
                debug!("input hangup, stopping");
                self.running = false;
            }
        }
    }

    fn apply_due_resize(&mut self) {
        let due = self
            .pending_resize
            .is_some_and(|deadline| Instant::now() >= deadline);
        if !due {
            return;
        }
        self.pending_resize = None;
        if let Ok((width, height)) = terminal::size() {
            debug!(width, height, "applying resize");
            self.set_size(width, height);
        }
    }

    fn dispatch_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => {
                if self.config.ctrl_c_stops && key.is_ctrl('c') {
                    self.running = false;
                    return;
                }
                self.dispatch_key(&key);
            }
            InputEvent::Mouse(mouse) => self.dispatch_mouse(&mouse),
        }
        // Listeners and focused elements mutate state without reaching the
        // compositor; every dispatched event buys one repaint
        self.compositor.schedule();
    }

    fn dispatch_key(&mut self, key: &KeyEvent) {
        let mut listeners = std::mem::take(&mut self.key_listeners);
        let mut consumed = false;
        for (id, handler) in listeners.iter_mut().rev() {
            if self.dead_listeners.contains(id) {
                continue;
            }
            if handler(self, key) {
                consumed = true;
                break;
            }
        }
        self.merge_listeners(listeners, |s| &mut s.key_listeners);
        if !consumed {
            self.focus.handle_key(key);
        }
    }

    fn dispatch_mouse(&mut self, mouse: &MouseEvent) {
        let mut listeners = std::mem::take(&mut self.mouse_listeners);
        for (id, handler) in listeners.iter_mut().rev() {
            if self.dead_listeners.contains(id) {
                continue;
            }
            if handler(self, mouse) {
                break;
            }
        }
        self.merge_listeners(listeners, |s| &mut s.mouse_listeners);
    }

    /// Put a taken listener list back, dropping entries removed during
    /// dispatch and keeping any registered during dispatch at the end.
    fn merge_listeners<H>(
        &mut self,
        mut taken: Vec<(ListenerId, H)>,
        field: fn(&mut Self) -> &mut Vec<(ListenerId, H)>,
    ) {
        taken.retain(|(id, _)| !self.dead_listeners.contains(id));
        taken.append(field(self));
        *field(self) = taken;
        self.dead_listeners.clear();
    }

    fn render(&mut self) -> Result<(), Error> {
        self.compositor.repaint(&mut self.surface);
        let stats = self.surface.flush_into(self.output.as_mut_vec());
        if stats.cells_changed > 0 {
            debug!(
                cells = stats.cells_changed,
                runs = stats.runs,
                "frame flushed"
            );
        }
        self.flush_output()?;
        Ok(())
    }

    fn flush_output(&mut self) -> Result<(), Error> {
        if self.output.as_bytes().is_empty() {
            return Ok(());
        }
        self.output.flush_to(&mut self.writer)?;
        self.output.clear();
        Ok(())
    }

    /// Channel feeding the session loop. Raw byte chunks sent here are
    /// decoded exactly as if they came from stdin.
    pub fn injector(&self) -> Sender<ReaderEvent> {
        self.events_tx.clone()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("size", &self.size())
            .field("entered", &self.entered)
            .field("running", &self.running)
            .finish()
    }
}
