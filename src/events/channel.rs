//! Event channel implementation using crossbeam-channel.
//!
//! Provides a thread-safe way to send events from a running task
//! to any UI layer.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::fmt::Display;

use super::{Event, RunSummary, StatusLine};

/// Message sent before `Completed` on every run that wasn't cancelled
pub const ALL_DONE: &str = "All Done";

/// Sends events from the core library.
///
/// Cheap to clone and send across threads. A sender from [`null_sender`]
/// has no channel behind it at all.
#[derive(Clone)]
pub struct EventSender {
    inner: Option<Sender<Event>>,
}

impl EventSender {
    /// Send an event.
    ///
    /// Returns false when nobody received it: the receiver is gone, or this
    /// is a null sender. The event is dropped either way.
    pub fn send(&self, event: Event) -> bool {
        match &self.inner {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    /// False for a [`null_sender`], so callers can skip building events
    pub fn is_connected(&self) -> bool {
        self.inner.is_some()
    }

    pub fn status(&self, line: StatusLine) -> bool {
        self.send(Event::Status(line))
    }

    /// Report a run that could not start
    pub fn fail(&self, error: &impl Display) {
        self.send(Event::Failed {
            message: error.to_string(),
        });
    }

    /// Close a run: [`ALL_DONE`] then `Completed`, or only `Cancelled`
    pub fn finish(&self, summary: &RunSummary, cancelled: bool) {
        if cancelled {
            self.send(Event::Cancelled(summary.clone()));
        } else {
            self.send(Event::Message(ALL_DONE.to_string()));
            self.send(Event::Completed(summary.clone()));
        }
    }
}

/// Receives events from the core library.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Returns an iterator over received events
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Drain everything currently queued
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// Factory for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        Self::pair(unbounded())
    }

    /// Create a bounded event channel with the specified capacity.
    ///
    /// Gives backpressure when the UI can't keep up.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        Self::pair(bounded(capacity))
    }

    fn pair((sender, receiver): (Sender<Event>, Receiver<Event>)) -> (EventSender, EventReceiver) {
        (
            EventSender {
                inner: Some(sender),
            },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender for runs nobody watches
pub fn null_sender() -> EventSender {
    EventSender { inner: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Message("hello".to_string()));
        });

        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Message(text) => assert_eq!(text, "hello"),
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn null_sender_delivers_nothing() {
        let sender = null_sender();
        assert!(!sender.is_connected());
        assert!(!sender.send(Event::Message("nobody listening".to_string())));
    }

    #[test]
    fn send_reports_a_dropped_receiver() {
        let (sender, receiver) = EventChannel::new();
        assert!(sender.is_connected());
        assert!(sender.send(Event::Message("heard".to_string())));

        drop(receiver);
        assert!(!sender.send(Event::Message("lost".to_string())));
    }

    #[test]
    fn drain_returns_events_in_send_order() {
        let (sender, receiver) = EventChannel::bounded(4);

        sender.send(Event::Message("one".to_string()));
        sender.send(Event::Message("two".to_string()));

        let drained = receiver.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(&drained[0], Event::Message(m) if m == "one"));
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn finish_closes_a_run() {
        let (sender, receiver) = EventChannel::new();
        let summary = RunSummary {
            files_processed: 3,
            ..Default::default()
        };

        sender.finish(&summary, false);
        sender.finish(&summary, true);

        let events = receiver.drain();
        assert!(matches!(&events[0], Event::Message(m) if m == ALL_DONE));
        assert!(matches!(&events[1], Event::Completed(s) if s.files_processed == 3));
        assert!(matches!(&events[2], Event::Cancelled(_)));
        assert_eq!(events.len(), 3);
    }
}
