// Copyright (c) 2022 MASSA LABS <info@massa.net>
//! Channel plumbing for the node's internal queues.
//!
//! Thin wrap over crossbeam channels that keeps a prometheus gauge of each
//! queue's depth. The depth is not only an operator metric: the consensus
//! core reads it back (via [`QuillReceiver::len`]) to defer repeat
//! missing-message requests while its command queue is congested.

use std::time::Instant;

use crossbeam::channel::{
    bounded, unbounded, Receiver, RecvTimeoutError, SendError, Sender, TryRecvError, TrySendError,
};
use prometheus::Gauge;
use tracing::debug;

/// Open a named queue; `capacity` of `None` means unbounded.
///
/// The name becomes the prometheus gauge `<name>_queue_depth`. Running
/// several nodes in one process registers the name once; the later ones
/// keep a private, unregistered gauge.
pub fn channel<T>(name: &str, capacity: Option<usize>) -> (QuillSender<T>, QuillReceiver<T>) {
    let (sender, receiver) = match capacity {
        Some(capacity) => bounded::<T>(capacity),
        None => unbounded::<T>(),
    };

    let depth = Gauge::new(
        format!("{}_queue_depth", name),
        "Messages waiting in the queue",
    )
    .expect("queue name must form a valid metric name");
    if let Err(err) = prometheus::register(Box::new(depth.clone())) {
        debug!("queue depth gauge for {} not registered: {}", name, err);
    }

    (
        QuillSender {
            sender,
            depth: depth.clone(),
        },
        QuillReceiver { receiver, depth },
    )
}

/// Sending half of a queue. Broadcast and elections sends are
/// fire-and-forget; callers ignore or log the error of a closed queue.
#[derive(Clone, Debug)]
pub struct QuillSender<T> {
    sender: Sender<T>,
    depth: Gauge,
}

impl<T> QuillSender<T> {
    /// Queue a message, blocking if the queue is bounded and full.
    pub fn send(&self, msg: T) -> Result<(), SendError<T>> {
        self.sender.send(msg).map(|()| self.depth.inc())
    }

    /// Queue a message or give up immediately on a full queue.
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        self.sender.try_send(msg).map(|()| self.depth.inc())
    }
}

/// Receiving half of a queue.
#[derive(Clone)]
pub struct QuillReceiver<T> {
    receiver: Receiver<T>,
    depth: Gauge,
}

impl<T> QuillReceiver<T> {
    fn settle_depth(&self) {
        self.depth.set(self.receiver.len() as f64);
    }

    /// Take a message if one is already waiting.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let msg = self.receiver.try_recv()?;
        self.settle_depth();
        Ok(msg)
    }

    /// Wait for a message until `deadline`; the worker's processing tick
    /// fires on the timeout.
    pub fn recv_deadline(&self, deadline: Instant) -> Result<T, RecvTimeoutError> {
        let msg = self.receiver.recv_deadline(deadline)?;
        self.settle_depth();
        Ok(msg)
    }

    /// Messages currently waiting. Admission back-pressure compares this
    /// against its congestion threshold.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
