// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};

use parking_lot::{Condvar, Mutex};

/// A cancel handle lets one thread park until another asks it to stop. The output
/// thread parks on one for as long as its stream should stay open.
#[derive(Clone, Default)]
pub struct CancelHandle {
    /// Set once the handle has been cancelled. Never reset.
    cancelled: Arc<Mutex<bool>>,
    /// Wakes waiters on cancellation or notification.
    condvar: Arc<Condvar>,
}

impl CancelHandle {
    pub fn new() -> CancelHandle {
        CancelHandle::default()
    }

    /// Returns true if the handle has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.lock()
    }

    /// Blocks until the handle is cancelled or finished is set to true and a
    /// notification arrives.
    pub fn wait(&self, finished: Arc<AtomicBool>) {
        let mut cancelled = self.cancelled.lock();
        while !*cancelled && !finished.load(Ordering::Relaxed) {
            self.condvar.wait(&mut cancelled);
        }
    }

    /// Wakes waiters so they can re-check their finished flag.
    pub fn notify(&self) {
        self.condvar.notify_all();
    }

    /// Cancels the handle, waking every waiter.
    pub fn cancel(&self) {
        let mut cancelled = self.cancelled.lock();
        if !*cancelled {
            *cancelled = true;
            self.notify();
        }
    }
}

#[cfg(test)]
mod test {
    use std::thread;

    use super::*;

    #[test]
    fn test_cancel_handle_cancelled() {
        let cancel_handle = CancelHandle::new();
        assert!(!cancel_handle.is_cancelled());

        let join = {
            let cancel_handle = cancel_handle.clone();
            thread::spawn(move || cancel_handle.wait(Arc::new(AtomicBool::new(false))))
        };

        cancel_handle.cancel();
        assert!(join.join().is_ok());
        assert!(cancel_handle.is_cancelled());
    }

    #[test]
    fn test_cancel_handle_finished() {
        let cancel_handle = CancelHandle::new();

        let finished = Arc::new(AtomicBool::new(false));
        let join = {
            let cancel_handle = cancel_handle.clone();
            let finished = finished.clone();
            thread::spawn(move || cancel_handle.wait(finished))
        };

        finished.store(true, Ordering::Relaxed);
        // The waiter may not have parked yet, so keep nudging until it exits.
        while !join.is_finished() {
            cancel_handle.notify();
            thread::yield_now();
        }
        assert!(join.join().is_ok());
        assert!(!cancel_handle.is_cancelled());
    }

    #[test]
    fn test_cancel_before_wait() {
        let cancel_handle = CancelHandle::new();
        cancel_handle.cancel();
        cancel_handle.cancel();
        cancel_handle.wait(Arc::new(AtomicBool::new(false)));
        assert!(cancel_handle.is_cancelled());
    }
}
