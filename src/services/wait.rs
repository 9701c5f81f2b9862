//! Cancellable timed wait used to hold back connections.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

pub use crate::models::WaitOutcome;

/// Per-connection cancellation signal
///
/// The host trips the switch when the connection's thread is killed. A thread
/// blocked in [`conditional_wait`] on the same switch wakes up immediately.
#[derive(Debug, Default)]
pub struct KillSwitch {
    killed: Mutex<bool>,
    wakeup: Condvar,
}

impl KillSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the connection as killed and wake any waiter
    pub fn kill(&self) {
        let mut killed = self.killed.lock();
        *killed = true;
        self.wakeup.notify_all();
    }

    pub fn is_killed(&self) -> bool {
        *self.killed.lock()
    }
}

/// Trips a kill switch when dropped
///
/// Held by whoever owns the request a connection serves, so abandoning the
/// request releases a thread blocked on the switch.
#[derive(Debug)]
pub struct KillOnDrop {
    switch: Arc<KillSwitch>,
}

impl KillOnDrop {
    pub fn new(switch: Arc<KillSwitch>) -> Self {
        Self { switch }
    }
}

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        self.switch.kill();
    }
}

/// Block the calling thread for at most `wait`, returning early if `switch` is tripped.
///
/// The deadline is absolute, so spurious wakeups never extend the total wait.
pub fn conditional_wait(switch: &KillSwitch, wait: Duration) -> WaitOutcome {
    let deadline = Instant::now().checked_add(wait);
    let mut killed = switch.killed.lock();

    while !*killed {
        match deadline {
            Some(deadline) => {
                if switch.wakeup.wait_until(&mut killed, deadline).timed_out() {
                    return if *killed {
                        WaitOutcome::Killed
                    } else {
                        WaitOutcome::Elapsed
                    };
                }
            }
            // Deadline not representable; only a kill ends the wait
            None => switch.wakeup.wait(&mut killed),
        }
    }

    WaitOutcome::Killed
}
