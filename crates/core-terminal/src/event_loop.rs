//! Non-blocking epoll + signalfd event loop.
//!
//! The session fd (stdin, almost always) and a `SIGWINCH` signalfd are the
//! only two sources registered; everything else (decoding, dispatch,
//! rendering) happens synchronously between wakeups, matching this engine's
//! preference for a single-threaded, synchronous core wherever a separate
//! thread or async runtime isn't earning its keep.
//!
//! A caller embedding this engine into a larger event-driven program (one
//! that already runs its own epoll loop alongside other fds) doesn't have to
//! hand control to a second, competing loop: [`EventLoop::borrowed`]
//! registers this loop's two descriptors on an epoll instance the caller
//! already owns and never closes it. [`EventLoop::owned`] is the simpler
//! case, used by [`crate::Terminal::read_line`], where this crate creates
//! and owns the whole loop.

use crate::SessionError;
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags, EpollTimeout};
use nix::sys::signal::{SigSet, Signal};
use nix::sys::signalfd::{SfdFlags, SignalFd};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd};
use std::os::unix::io::RawFd;

const INPUT_TOKEN: u64 = 0;
const RESIZE_TOKEN: u64 = 1;

/// Which of the registered sources woke the loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoopWake {
    pub input: bool,
    pub resize: bool,
}

pub struct EventLoop {
    epoll: Option<Epoll>,
    /// `true` when `epoll` was handed to us by a caller (a borrowed
    /// multiplexer) rather than created by [`EventLoop::owned`]; we never
    /// close it ourselves in that case.
    extern_epfd: bool,
    signal_fd: SignalFd,
    session_fd: RawFd,
}

impl EventLoop {
    /// Create and own a fresh epoll instance for `session_fd`.
    pub fn owned(session_fd: RawFd) -> Result<Self, SessionError> {
        let epoll = Epoll::new(EpollCreateFlags::empty()).map_err(SessionError::Io)?;
        Self::register(epoll, session_fd, false)
    }

    /// Register `session_fd` (and this loop's signalfd) on an epoll
    /// instance the caller already owns, identified by its raw fd. This
    /// loop adds and, on drop, removes only its own two descriptors; the
    /// epoll fd itself stays open and under the caller's control.
    pub fn borrowed(epoll_fd: RawFd, session_fd: RawFd) -> Result<Self, SessionError> {
        let epoll = unsafe { Epoll::from_raw_fd(epoll_fd) };
        Self::register(epoll, session_fd, true)
    }

    fn register(epoll: Epoll, session_fd: RawFd, extern_epfd: bool) -> Result<Self, SessionError> {
        let mut mask = SigSet::empty();
        mask.add(Signal::SIGWINCH);
        mask.thread_block().map_err(SessionError::Io)?;
        let signal_fd = SignalFd::with_flags(&mask, SfdFlags::SFD_NONBLOCK).map_err(SessionError::Io)?;

        let session = unsafe { BorrowedFd::borrow_raw(session_fd) };
        epoll
            .add(session, EpollEvent::new(EpollFlags::EPOLLIN, INPUT_TOKEN))
            .map_err(SessionError::Io)?;
        epoll
            .add(signal_fd.as_fd(), EpollEvent::new(EpollFlags::EPOLLIN, RESIZE_TOKEN))
            .map_err(SessionError::Io)?;

        Ok(Self {
            epoll: Some(epoll),
            extern_epfd,
            signal_fd,
            session_fd,
        })
    }

    /// Block (with `timeout`) until the session fd has bytes ready, a
    /// `SIGWINCH` has arrived, or the timeout expires with nothing ready.
    ///
    /// Only meaningful for an owned loop: a caller driving a borrowed
    /// multiplexer waits on its own epoll instance and routes readiness
    /// back in through [`crate::Terminal::process`] instead.
    pub fn wait(&self, timeout: EpollTimeout) -> Result<LoopWake, SessionError> {
        let mut events = [EpollEvent::empty(); 2];
        let epoll = self.epoll.as_ref().expect("epoll present while loop is alive");
        let n = epoll.wait(&mut events, timeout).map_err(SessionError::Io)?;
        let mut wake = LoopWake::default();
        for ev in &events[..n] {
            match ev.data() {
                INPUT_TOKEN => wake.input = true,
                RESIZE_TOKEN => wake.resize = true,
                _ => {}
            }
        }
        Ok(wake)
    }

    /// Drain one pending `SIGWINCH` siginfo so the signalfd stops reporting
    /// readiness for a resize we've already handled.
    pub fn drain_resize(&mut self) -> Result<(), SessionError> {
        while self.signal_fd.read_signal().map_err(SessionError::Io)?.is_some() {}
        Ok(())
    }

    /// The session (input) fd this loop watches, for matching against a
    /// caller-owned multiplexer's readiness notifications.
    pub fn session_fd(&self) -> RawFd {
        self.session_fd
    }

    /// The signalfd this loop watches for `SIGWINCH`, for the same purpose.
    pub fn signal_fd(&self) -> RawFd {
        self.signal_fd.as_raw_fd()
    }

    /// Whether this loop is registered on a caller-owned epoll instance
    /// rather than one it created itself.
    pub fn is_borrowed(&self) -> bool {
        self.extern_epfd
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        if let Some(epoll) = &self.epoll {
            let session = unsafe { BorrowedFd::borrow_raw(self.session_fd) };
            let _ = epoll.delete(session);
            let _ = epoll.delete(self.signal_fd.as_fd());
        }
        if self.extern_epfd {
            // The caller owns this epoll fd; don't let `Epoll`'s own drop
            // close it out from under them.
            std::mem::forget(self.epoll.take());
        }
    }
}
