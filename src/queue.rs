//! Bounded command queue
//!
//! Any number of callers submit [`Command`]s through cloned
//! [`CommandSender`]s; the controller alone drains the [`CommandReceiver`].
//! Submission never blocks: a full queue drops the new command and reports
//! `false`. The queue is an [`embassy_sync`] channel over a critical
//! section, so senders may run in interrupt handlers or other threads.

use alloc::sync::Arc;
use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use crate::command::Command;

/// Number of commands the queue holds
pub const QUEUE_CAPACITY: usize = 10;

type Queue = Channel<CriticalSectionRawMutex, Command, QUEUE_CAPACITY>;

/// Create an empty queue
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let queue = Arc::new(Queue::new());
    (
        CommandSender {
            queue: Arc::clone(&queue),
        },
        CommandReceiver { queue },
    )
}

/// Submitting side of the queue
#[derive(Clone)]
pub struct CommandSender {
    queue: Arc<Queue>,
}

impl CommandSender {
    /// Enqueue a command without blocking
    ///
    /// Returns `false` if the queue is full.
    pub fn send(&self, command: Command) -> bool {
        match self.queue.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(command)) => {
                log::debug!("command queue full, dropping {}", command.name());
                false
            }
        }
    }
}

impl fmt::Debug for CommandSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSender").finish_non_exhaustive()
    }
}

/// Draining side of the queue
pub struct CommandReceiver {
    queue: Arc<Queue>,
}

impl CommandReceiver {
    /// Take the oldest pending command, if any
    pub fn try_recv(&self) -> Option<Command> {
        self.queue.try_receive().ok()
    }
}

impl fmt::Debug for CommandReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandReceiver").finish_non_exhaustive()
    }
}
