//! Raw-mode termios guard.
//!
//! Grounded on the same RAII lifecycle idea as the crossterm backend this
//! module replaces: entering raw mode is paired with an unconditional
//! restoration on drop, so a panic or early return never leaves the caller's
//! shell in a broken state.

use crate::SessionError;
use nix::sys::termios::{self, SetArg, Termios};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::io::RawFd;

pub struct RawModeGuard {
    fd: RawFd,
    saved: Termios,
}

impl RawModeGuard {
    /// Switch `fd` into raw mode, returning a guard that restores the
    /// original termios settings when dropped.
    pub fn enable(fd: RawFd) -> Result<Self, SessionError> {
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
        let saved = termios::tcgetattr(borrowed).map_err(SessionError::Io)?;
        let mut raw = saved.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(borrowed, SetArg::TCSANOW, &raw).map_err(SessionError::Io)?;
        Ok(Self { fd, saved })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let borrowed = unsafe { BorrowedFd::borrow_raw(self.fd) };
        let _ = termios::tcsetattr(borrowed, SetArg::TCSANOW, &self.saved);
    }
}

impl AsFd for RawModeGuard {
    fn as_fd(&self) -> BorrowedFd<'_> {
        unsafe { BorrowedFd::borrow_raw(self.fd) }
    }
}
