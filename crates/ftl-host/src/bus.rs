use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use ftl_ledger::{EventSink, HostFault};
use ftl_types::{LedgerEvent, TypeError};
use tracing::{debug, warn};

/// An event as delivered to subscribers, numbered in publication order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedEvent {
    pub seq: u64,
    pub name: String,
    pub payload: Vec<u8>,
}

impl PublishedEvent {
    pub fn decode(&self) -> Result<LedgerEvent, TypeError> {
        LedgerEvent::from_payload(&self.name, &self.payload)
    }
}

/// Filter for subscribing to a subset of events.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// If set, only events with one of these names are delivered.
    pub names: Option<Vec<String>>,
}

impl EventFilter {
    pub fn named(names: &[&str]) -> Self {
        Self {
            names: Some(names.iter().map(|n| n.to_string()).collect()),
        }
    }

    pub fn matches(&self, event: &PublishedEvent) -> bool {
        match &self.names {
            Some(names) => names.iter().any(|n| *n == event.name),
            None => true,
        }
    }
}

/// Receiving end of a bus subscription.
///
/// The queue behind it is bounded. Events published while it is full are
/// dropped for this subscriber and counted in [`Subscription::lagged`].
pub struct Subscription {
    rx: mpsc::Receiver<PublishedEvent>,
    lagged: Arc<AtomicU64>,
}

impl Subscription {
    /// Next delivered event, if one is waiting.
    pub fn try_next(&self) -> Option<PublishedEvent> {
        self.rx.try_recv().ok()
    }

    /// Every event delivered so far.
    pub fn drain(&self) -> Vec<PublishedEvent> {
        self.rx.try_iter().collect()
    }

    /// Number of events dropped because the queue was full.
    pub fn lagged(&self) -> u64 {
        self.lagged.load(Ordering::Relaxed)
    }
}

struct Subscriber {
    filter: EventFilter,
    sender: mpsc::SyncSender<PublishedEvent>,
    lagged: Arc<AtomicU64>,
}

impl Subscriber {
    /// Offer `event` without blocking. Returns `false` once the receiver is
    /// gone.
    fn offer(&self, event: &PublishedEvent) -> bool {
        if !self.filter.matches(event) {
            return true;
        }
        match self.sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::TrySendError::Full(_)) => {
                let lagged = self.lagged.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(seq = event.seq, lagged, "subscriber queue full; event dropped");
                true
            }
            Err(mpsc::TrySendError::Disconnected(_)) => false,
        }
    }
}

#[derive(Default)]
struct BusState {
    next_seq: u64,
    history: VecDeque<PublishedEvent>,
    subscribers: Vec<Subscriber>,
}

/// In-process event bus.
///
/// Events reach subscribers only once the invocation that produced them has
/// committed. A bounded history of recent events is kept for inspection.
pub struct EventBus {
    history_limit: usize,
    queue_capacity: usize,
    state: Mutex<BusState>,
}

impl EventBus {
    /// Keep up to `history_limit` recent events and queue at most
    /// `queue_capacity` undelivered events per subscriber.
    pub fn new(history_limit: usize, queue_capacity: usize) -> Self {
        Self {
            history_limit,
            queue_capacity: queue_capacity.max(1),
            state: Mutex::new(BusState::default()),
        }
    }

    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let (tx, rx) = mpsc::sync_channel(self.queue_capacity);
        let lagged = Arc::new(AtomicU64::new(0));
        // A poisoned bus still hands out a subscription; it just never
        // receives anything.
        if let Ok(mut state) = self.state.lock() {
            state.subscribers.push(Subscriber {
                filter,
                sender: tx,
                lagged: Arc::clone(&lagged),
            });
        }
        Subscription { rx, lagged }
    }

    /// Publish a committed batch, in order.
    pub fn publish(&self, batch: Vec<(String, Vec<u8>)>) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        for (name, payload) in batch {
            state.next_seq += 1;
            let event = PublishedEvent {
                seq: state.next_seq,
                name,
                payload,
            };
            // Drop subscribers whose receiver is gone.
            state.subscribers.retain(|sub| sub.offer(&event));
            debug!(seq = event.seq, name = %event.name, "event published");
            if self.history_limit > 0 {
                if state.history.len() == self.history_limit {
                    state.history.pop_front();
                }
                state.history.push_back(event);
            }
        }
    }

    /// Recently published events, oldest first.
    pub fn history(&self) -> Vec<PublishedEvent> {
        self.state
            .lock()
            .map(|s| s.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().map(|s| s.subscribers.len()).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

/// Per-invocation [`EventSink`] that holds events until the host decides
/// whether the invocation commits.
#[derive(Default)]
pub struct EventBuffer {
    events: Mutex<Vec<(String, Vec<u8>)>>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_events(self) -> Vec<(String, Vec<u8>)> {
        self.events.into_inner().unwrap_or_default()
    }
}

impl EventSink for EventBuffer {
    fn emit(&self, name: &str, payload: &[u8]) -> Result<(), HostFault> {
        self.events
            .lock()
            .map_err(|_| HostFault::new("event buffer poisoned"))?
            .push((name.to_string(), payload.to_vec()));
        Ok(())
    }
}
