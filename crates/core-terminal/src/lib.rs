//! Terminal session lifecycle: raw mode, the epoll/signalfd event loop, and
//! the glue that turns decoded keys into redraws.
//!
//! This replaces the crossterm `TerminalBackend`/`CrosstermBackend` pair
//! this crate used to carry with a direct `nix` implementation: raw mode is
//! entered via termios rather than crossterm's wrapper, window size and
//! `SIGWINCH` are read straight off the fd instead of going through an
//! abstraction layer, and the input loop is a plain non-blocking
//! epoll wait instead of an event-stream future. The RAII shape — enter,
//! hand back a guard, restore unconditionally on drop — carries over
//! unchanged.
//!
//! Two ways to drive a session:
//! - [`Terminal::read_line`]: the simple case. This crate owns the whole
//!   wait loop (`EventLoop::owned`) and blocks until a line is ready.
//! - [`Terminal::prepare`] + [`Terminal::process`]: for a caller that
//!   already runs its own epoll loop alongside other fds. `prepare` draws
//!   the initial frame and registers this session's descriptors on the
//!   caller's epoll instance; `process` is then called once per readiness
//!   notification the caller's own loop hands back, and reports whether a
//!   line is ready, the event was ours but inconclusive, or the fd wasn't
//!   ours at all.

pub mod capabilities;
pub mod event_loop;
pub mod raw_mode;

pub use capabilities::detect as detect_capabilities;
pub use event_loop::{EventLoop, LoopWake};
pub use raw_mode::RawModeGuard;

use core_actions::ActionOutcome;
use core_config::SessionConfig;
use core_events::KeyDecoder;
use core_input::AnsiKeyDecoder;
use core_render::{draw_frame, FrameColors, Writer};
use core_state::Session;
use nix::errno::Errno;
use nix::sys::epoll::EpollTimeout;
use nix::unistd::{read, write};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::io::RawFd;
use thiserror::Error;

/// How long the loop waits for more bytes before treating a lone buffered
/// `ESC` as the Esc key rather than the start of a sequence still in
/// flight.
fn escape_timeout() -> EpollTimeout {
    EpollTimeout::try_from(std::time::Duration::from_millis(25)).expect("25ms fits in an epoll timeout")
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] nix::Error),
    #[error("cursor position report from the terminal was malformed")]
    MalformedCursorReport,
    #[error("terminal did not answer the cursor position query")]
    CursorQueryTimedOut,
    #[error("process() called before prepare()")]
    NotPrepared,
}

/// A readiness notification handed back by a caller-owned multiplexer, to
/// be passed to [`Terminal::process`].
#[derive(Debug, Clone, Copy)]
pub struct ReadinessEvent {
    pub fd: RawFd,
}

/// The result of feeding one [`ReadinessEvent`] to [`Terminal::process`].
#[derive(Debug)]
pub enum ProcessOutcome {
    /// The session committed: accepted, cancelled, or hit end-of-input.
    /// Carries the final buffer (empty on cancel/EOF, by the same
    /// convention [`Terminal::read_line`] uses).
    Line(String),
    /// The event belonged to this session but editing isn't finished yet.
    Consumed,
    /// `event.fd` isn't one of this session's descriptors.
    Unknown,
}

struct ActiveEdit {
    session: Session,
    prompt: String,
    config: SessionConfig,
    colors: FrameColors,
}

/// One interactive line-editing session bound to a raw-mode terminal.
///
/// `read_fd`/`write_fd` are usually both the controlling tty (stdin and
/// stdout), kept distinct here since nothing about the protocol requires
/// them to be the same descriptor.
pub struct Terminal {
    read_fd: RawFd,
    write_fd: RawFd,
    _raw_mode: RawModeGuard,
    event_loop: EventLoop,
    decoder: AnsiKeyDecoder,
    active: Option<ActiveEdit>,
}

impl Terminal {
    /// Enter raw mode on `read_fd`/`write_fd` and create this crate's own
    /// epoll instance for the event loop. Raw mode (and the loop's
    /// signalfd) is torn down when the returned `Terminal` is dropped.
    pub fn open(read_fd: RawFd, write_fd: RawFd) -> Result<Self, SessionError> {
        let raw_mode = RawModeGuard::enable(read_fd)?;
        let event_loop = EventLoop::owned(read_fd)?;
        Ok(Self::from_parts(read_fd, write_fd, raw_mode, event_loop))
    }

    /// Enter raw mode on `read_fd`/`write_fd`, but register this session's
    /// descriptors on `epoll_fd`, an epoll instance owned and driven by the
    /// caller rather than by this crate. Use [`Terminal::prepare`] and
    /// [`Terminal::process`] to drive a terminal constructed this way;
    /// [`Terminal::read_line`] requires an owned loop and will misbehave
    /// here since nothing else is servicing `epoll_fd`.
    pub fn open_with_epoll(read_fd: RawFd, write_fd: RawFd, epoll_fd: RawFd) -> Result<Self, SessionError> {
        let raw_mode = RawModeGuard::enable(read_fd)?;
        let event_loop = EventLoop::borrowed(epoll_fd, read_fd)?;
        Ok(Self::from_parts(read_fd, write_fd, raw_mode, event_loop))
    }

    fn from_parts(read_fd: RawFd, write_fd: RawFd, raw_mode: RawModeGuard, event_loop: EventLoop) -> Self {
        Self {
            read_fd,
            write_fd,
            _raw_mode: raw_mode,
            event_loop,
            decoder: AnsiKeyDecoder::new(),
            active: None,
        }
    }

    /// Convenience constructor for the common case of stdin/stdout.
    pub fn open_stdio() -> Result<Self, SessionError> {
        Self::open(0, 1)
    }

    /// The descriptors this session watches, for a caller-owned
    /// multiplexer's own registration bookkeeping.
    pub fn watched_fds(&self) -> (RawFd, RawFd) {
        (self.event_loop.session_fd(), self.event_loop.signal_fd())
    }

    fn write_all(&self, bytes: &[u8]) -> Result<(), SessionError> {
        let fd = unsafe { BorrowedFd::borrow_raw(self.write_fd) };
        let mut written = 0;
        while written < bytes.len() {
            written += write(fd, &bytes[written..]).map_err(SessionError::Io)?;
        }
        Ok(())
    }

    /// Drain every byte currently available on the read fd into the
    /// decoder, stopping at `EAGAIN`/`EWOULDBLOCK` (nothing more queued) or
    /// `Ok(0)` (peer closed).
    fn drain_readable(&mut self) -> Result<bool, SessionError> {
        let fd = unsafe { BorrowedFd::borrow_raw(self.read_fd) };
        let mut buf = [0u8; 1024];
        loop {
            match read(fd.as_fd(), &mut buf) {
                Ok(0) => return Ok(false),
                Ok(n) => self.decoder.feed(&buf[..n]),
                Err(Errno::EAGAIN) => return Ok(true),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(SessionError::Io(e)),
            }
        }
    }

    /// Send `ESC[6n` and block (briefly) until the terminal answers with
    /// `ESC[row;colR`, returning the 0-indexed row/col.
    fn query_cursor_position(&mut self) -> Result<(u16, u16), SessionError> {
        self.write_all(b"\x1b[6n")?;
        let mut raw = Vec::new();
        let deadline = EpollTimeout::try_from(std::time::Duration::from_millis(200))
            .expect("200ms fits in an epoll timeout");
        loop {
            let wake = self.event_loop.wait(deadline)?;
            if !wake.input {
                return Err(SessionError::CursorQueryTimedOut);
            }
            let fd = unsafe { BorrowedFd::borrow_raw(self.read_fd) };
            let mut buf = [0u8; 64];
            match read(fd, &mut buf) {
                Ok(0) => return Err(SessionError::CursorQueryTimedOut),
                Ok(n) => raw.extend_from_slice(&buf[..n]),
                Err(Errno::EAGAIN) => continue,
                Err(e) => return Err(SessionError::Io(e)),
            }
            if raw.last() == Some(&b'R') {
                return parse_cursor_report(&raw);
            }
        }
    }

    /// Draw the initial frame and register this session for events.
    /// Idempotent: calling `prepare` again while a session is already
    /// active is a no-op.
    pub fn prepare(&mut self, config: &SessionConfig) -> Result<(), SessionError> {
        if self.active.is_some() {
            return Ok(());
        }

        if config.osc133 {
            let mut w = Writer::new();
            w.osc133_new_line();
            self.write_all(&w.into_bytes())?;
        }

        let term = capabilities::detect(self.write_fd)?;
        let prompt = config.prompt.render();
        let prompt_len = core_text::visible_len_ignoring_csi(&prompt);
        let mut session = Session::new(term, prompt_len, config.frame_mode, config.max_lines);
        if let Some(initial) = &config.initial_buffer {
            session.insert_at_cursor(initial);
        }

        let (col, row) = self.query_cursor_position()?;
        session.set_initial_cursor(col, row);

        if config.osc133 {
            let mut w = Writer::new();
            w.osc133_prompt_start();
            self.write_all(&w.into_bytes())?;
        }

        let colors = FrameColors::new(config.fg, config.bg);
        self.active = Some(ActiveEdit {
            session,
            prompt,
            config: config.clone(),
            colors,
        });
        self.redraw_active()?;

        if config.osc133 {
            let mut w = Writer::new();
            w.osc133_command_start();
            self.write_all(&w.into_bytes())?;
        }
        Ok(())
    }

    fn redraw_active(&mut self) -> Result<(), SessionError> {
        let Some(active) = self.active.as_ref() else {
            return Ok(());
        };
        let bytes = draw_frame(
            &active.session,
            &active.prompt,
            active.config.empty_message.as_deref(),
            active.config.frame_style,
            active.colors,
        );
        self.write_all(&bytes)
    }

    /// Emit the commit marker and end the active edit, returning its final
    /// buffer.
    fn finish(&mut self) -> Result<String, SessionError> {
        let osc133 = self.active.as_ref().map(|a| a.config.osc133).unwrap_or(false);
        let line = self
            .active
            .take()
            .map(|a| a.session.buffer)
            .unwrap_or_default();
        if osc133 {
            let mut w = Writer::new();
            w.osc133_command_executed();
            self.write_all(&w.into_bytes())?;
        }
        Ok(line)
    }

    /// Feed one readiness notification from a caller-owned multiplexer.
    /// Requires [`Terminal::prepare`] to have been called first.
    pub fn process(&mut self, event: ReadinessEvent) -> Result<ProcessOutcome, SessionError> {
        let (session_fd, signal_fd) = self.watched_fds();

        if event.fd == session_fd {
            if self.active.is_none() {
                return Err(SessionError::NotPrepared);
            }
            let peer_closed = !self.drain_readable()?;

            let mut committed = None;
            {
                let active = self.active.as_mut().expect("checked above");
                while let Some(key) = self.decoder.try_next() {
                    if let Some(result) = handle_key(key, &mut active.session) {
                        committed = Some(result);
                        break;
                    }
                }
            }

            if committed.is_some() || peer_closed {
                let line = self.finish()?;
                return Ok(ProcessOutcome::Line(line));
            }

            self.redraw_active()?;
            return Ok(ProcessOutcome::Consumed);
        }

        if event.fd == signal_fd {
            if self.active.is_none() {
                return Err(SessionError::NotPrepared);
            }
            self.event_loop.drain_resize()?;
            let term = capabilities::detect(self.write_fd)?;
            if let Some(active) = self.active.as_mut() {
                active.session.term_cols = term.cols;
                active.session.term_rows = term.rows;
                active.session.recompute(0);
            }
            self.redraw_active()?;
            return Ok(ProcessOutcome::Consumed);
        }

        Ok(ProcessOutcome::Unknown)
    }

    /// Run one interactive line-editing session to completion, returning
    /// the accepted line (`None` on cancel or end-of-input). Requires an
    /// owned event loop (see [`Terminal::open`]/[`Terminal::open_stdio`]).
    /// Built on the same `prepare`/drain/redraw primitives as
    /// [`Terminal::process`], except for the resize path, which delegates
    /// to it directly since a `SIGWINCH` never ends the session.
    pub fn read_line(&mut self, config: &SessionConfig) -> Result<Option<String>, SessionError> {
        self.prepare(config)?;
        loop {
            let wake = self.event_loop.wait(escape_timeout())?;

            if !wake.input && !wake.resize {
                if let Some(key) = self.decoder.force_pending_escape() {
                    let active = self.active.as_mut().expect("prepared above");
                    if let Some(result) = handle_key(key, &mut active.session) {
                        let cancelled = result.is_none();
                        let line = self.finish()?;
                        return Ok((!cancelled).then_some(line));
                    }
                    self.redraw_active()?;
                }
                continue;
            }

            if wake.resize {
                let signal_fd = self.event_loop.signal_fd();
                self.process(ReadinessEvent { fd: signal_fd })?;
            }

            if wake.input {
                let peer_closed = !self.drain_readable()?;
                let mut committed = None;
                {
                    let active = self.active.as_mut().expect("prepared above");
                    while let Some(key) = self.decoder.try_next() {
                        if let Some(result) = handle_key(key, &mut active.session) {
                            committed = Some(result);
                            break;
                        }
                    }
                }

                if let Some(result) = committed {
                    let cancelled = result.is_none();
                    let line = self.finish()?;
                    return Ok((!cancelled).then_some(line));
                }
                if peer_closed {
                    self.finish()?;
                    return Ok(None);
                }
                self.redraw_active()?;
            }
        }
    }
}

/// Dispatch and execute one decoded key, returning `Some` when the session
/// is finished (accepted, cancelled, or EOF); the inner `Option` carries
/// `None` for cancel/EOF and `Some(line)` for an accepted line.
fn handle_key(key: core_events::DecodedKey, session: &mut Session) -> Option<Option<String>> {
    let action = core_keymap::dispatch(key)?;
    match core_actions::execute(action, session) {
        ActionOutcome::Continue | ActionOutcome::Repaint => None,
        ActionOutcome::Accept(line) => Some(Some(line)),
        ActionOutcome::Cancel | ActionOutcome::Eof => Some(None),
    }
}

/// Parse a `ESC[row;colR` device status report into 0-indexed coordinates.
fn parse_cursor_report(raw: &[u8]) -> Result<(u16, u16), SessionError> {
    let text = std::str::from_utf8(raw).map_err(|_| SessionError::MalformedCursorReport)?;
    let start = text.rfind("\x1b[").ok_or(SessionError::MalformedCursorReport)?;
    let body = &text[start + 2..text.len() - 1]; // strip ESC[ and trailing R
    let (row, col) = body.split_once(';').ok_or(SessionError::MalformedCursorReport)?;
    let row: u16 = row.parse().map_err(|_| SessionError::MalformedCursorReport)?;
    let col: u16 = col.parse().map_err(|_| SessionError::MalformedCursorReport)?;
    Ok((col.saturating_sub(1), row.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_cursor_report() {
        assert_eq!(parse_cursor_report(b"\x1b[5;10R").unwrap(), (9, 4));
    }

    #[test]
    fn rejects_report_missing_separator() {
        assert!(parse_cursor_report(b"\x1b[510R").is_err());
    }

    #[test]
    fn rejects_report_with_no_escape_prefix() {
        assert!(parse_cursor_report(b"5;10R").is_err());
    }
}
