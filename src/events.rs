//! Per-source publish/subscribe for data availability.
//!
//! Each data source owns its own [`EventEmitter`]; there is no shared bus.
//! Handlers run on the thread that fires the event, after the emitter's lock
//! has been released, so a handler may query the source or (un)subscribe.

use crate::interval::ContigInterval;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A range became fully available.
    NewData,
    /// Loading work for a request finished, successfully or not.
    NetworkDone,
}

impl Topic {
    pub fn name(&self) -> &'static str {
        match self {
            Topic::NewData => "newdata",
            Topic::NetworkDone => "networkdone",
        }
    }
}

impl FromStr for Topic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "newdata" => Ok(Topic::NewData),
            "networkdone" => Ok(Topic::NetworkDone),
            _ => Err(Error::NotFound(format!("unknown event: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    NewData(ContigInterval),
    NetworkDone,
}

impl DataEvent {
    pub fn topic(&self) -> Topic {
        match self {
            DataEvent::NewData(_) => Topic::NewData,
            DataEvent::NetworkDone => Topic::NetworkDone,
        }
    }
}

/// Handle returned by a subscription; pass it to [`EventEmitter::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    topic: Topic,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

type Handler = Arc<dyn Fn(&DataEvent) + Send + Sync>;

struct Listener {
    id: u64,
    topic: Topic,
    once: bool,
    handler: Handler,
}

#[derive(Default)]
pub struct EventEmitter {
    listeners: Mutex<Vec<Listener>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&DataEvent) + Send + Sync + 'static,
    {
        self.register(topic, false, Arc::new(handler))
    }

    /// Like [`on`](Self::on), but removed after its first delivery.
    pub fn once<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&DataEvent) + Send + Sync + 'static,
    {
        self.register(topic, true, Arc::new(handler))
    }

    /// Subscribe through a channel, for consumers that await events.
    pub fn channel(&self, topic: Topic) -> (Subscription, mpsc::UnboundedReceiver<DataEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sub = self.on(topic, move |event| {
            let _ = tx.send(event.clone());
        });
        (sub, rx)
    }

    /// Returns false if the subscription was already gone.
    pub fn off(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| l.id != subscription.id);
        listeners.len() != before
    }

    pub fn listener_count(&self, topic: Topic) -> usize {
        self.listeners.lock().iter().filter(|l| l.topic == topic).count()
    }

    pub fn emit(&self, event: DataEvent) {
        let topic = event.topic();
        let handlers: Vec<Handler> = {
            let mut listeners = self.listeners.lock();
            let handlers = listeners
                .iter()
                .filter(|l| l.topic == topic)
                .map(|l| l.handler.clone())
                .collect();
            listeners.retain(|l| !(l.once && l.topic == topic));
            handlers
        };

        tracing::trace!("{} -> {} listener(s)", topic.name(), handlers.len());
        for handler in handlers {
            handler(&event);
        }
    }

    fn register(&self, topic: Topic, once: bool, handler: Handler) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push(Listener {
            id,
            topic,
            once,
            handler,
        });
        Subscription { id, topic }
    }
}
