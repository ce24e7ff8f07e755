//! Completion event queue.
//!
//! A min-heap of pending completions keyed by finish time. `BinaryHeap` is a
//! max-heap and makes no ordering promise for equal keys, so entries carry an
//! insertion sequence number; the reversed comparison yields
//! earliest-time-first with FIFO order among equal timestamps. Events are
//! terminal: there is no cancellation.

use flashsim_schedulers::Request;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A completion notification emitted by the device.
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    /// Completion timestamp in seconds.
    pub time: f64,
    /// Physical channel whose request finished.
    pub channel: usize,
    /// The request, carrying its runtime start/finish timestamps.
    pub request: Request,
}

#[derive(Debug)]
struct HeapEntry {
    sequence: u64,
    event: CompletionEvent,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.event.time == other.event.time && self.sequence == other.sequence
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest on top.
        other
            .event
            .time
            .total_cmp(&self.event.time)
            .then(other.sequence.cmp(&self.sequence))
    }
}

/// Min-heap of pending completion events.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<HeapEntry>,
    sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CompletionEvent) {
        self.heap.push(HeapEntry {
            sequence: self.sequence,
            event,
        });
        self.sequence += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// The earliest pending event, if any.
    pub fn peek(&self) -> Option<&CompletionEvent> {
        self.heap.peek().map(|entry| &entry.event)
    }

    /// Remove and return the earliest pending event.
    pub fn pop(&mut self) -> Option<CompletionEvent> {
        self.heap.pop().map(|entry| entry.event)
    }
}
