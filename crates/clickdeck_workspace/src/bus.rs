use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use clickdeck_core::TabPayload;

/// Broadcast payload for active-tab changes.
///
/// A `None` payload specifically signals "this tab was closed", as opposed
/// to the pointer moving to another existing tab; observers must not treat
/// closure as a navigable target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTabChange {
    pub tab_id: String,
    pub payload: Option<TabPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleUpdate {
    pub tab_id: String,
    pub title: String,
}

/// Event channels carried by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusChannel {
    Open,
    Activate,
    Close,
    Title,
}

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Channel<T> {
    subscribers: Vec<(u64, Callback<T>)>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<T> Channel<T> {
    fn add(&mut self, id: u64, callback: Callback<T>) {
        self.subscribers.push((id, callback));
    }

    fn remove(&mut self, id: u64) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    fn callbacks(&self) -> Vec<Callback<T>> {
        self.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
    }
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    open: Channel<TabPayload>,
    activate: Channel<ActiveTabChange>,
    close: Channel<String>,
    title: Channel<TitleUpdate>,

    /// Open events fired before any open-subscriber existed.
    queued_open: VecDeque<TabPayload>,

    /// Queued batch scheduled for delivery on the next dispatch turn.
    deferred_open: VecDeque<TabPayload>,
}

/// Event bus decoupling tab producers from the workspace that renders tabs
/// and from observers such as the schema tree.
///
/// Explicitly constructed and injected: clone it into every component that
/// needs it; clones share one registry. All channels dispatch synchronously
/// in emission order once a subscriber is attached. Open events fired with
/// no subscriber are queued and replayed on the next
/// [`TabBus::dispatch_deferred`] turn after the first subscriber attaches,
/// so producers that fire before the workspace mounts are not lost.
#[derive(Clone, Default)]
pub struct TabBus {
    inner: Arc<Mutex<BusInner>>,
}

/// Subscription guard; dropping it detaches the callback.
pub struct BusSubscription {
    channel: BusChannel,
    id: u64,
    inner: Weak<Mutex<BusInner>>,
}

impl BusSubscription {
    /// Keeps the callback attached for the life of the bus.
    pub fn detach(self) {
        std::mem::forget(self);
    }
}

impl Drop for BusSubscription {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
        match self.channel {
            BusChannel::Open => inner.open.remove(self.id),
            BusChannel::Activate => inner.activate.remove(self.id),
            BusChannel::Close => inner.close.remove(self.id),
            BusChannel::Title => inner.title.remove(self.id),
        }
    }
}

impl TabBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn subscription(&self, channel: BusChannel, id: u64) -> BusSubscription {
        BusSubscription {
            channel,
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Requests that a tab be opened (or re-activated if already open).
    pub fn open_tab(&self, payload: TabPayload) {
        let callbacks = {
            let mut inner = self.lock();
            if inner.open.subscribers.is_empty() {
                log::debug!("queueing open for {} (no subscriber yet)", payload.id());
                inner.queued_open.push_back(payload);
                return;
            }
            inner.open.callbacks()
        };
        // Callbacks run outside the lock so they may use the bus themselves.
        for callback in callbacks {
            (*callback)(&payload);
        }
    }

    pub fn subscribe_open(
        &self,
        callback: impl Fn(&TabPayload) + Send + Sync + 'static,
    ) -> BusSubscription {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;

            let first_subscriber = inner.open.subscribers.is_empty();
            inner.open.add(id, Arc::new(callback));

            // Replay is scheduled only on the zero-to-one transition, once
            // per queued batch; delivery happens on the next dispatch turn.
            if first_subscriber && !inner.queued_open.is_empty() {
                let batch: Vec<_> = inner.queued_open.drain(..).collect();
                inner.deferred_open.extend(batch);
            }
            id
        };
        self.subscription(BusChannel::Open, id)
    }

    /// Delivers the deferred replay batch, if any. The host calls this once
    /// per scheduling turn (the queued events must not arrive synchronously
    /// inside the subscribe call).
    pub fn dispatch_deferred(&self) {
        loop {
            let (event, callbacks) = {
                let mut inner = self.lock();
                let Some(event) = inner.deferred_open.pop_front() else {
                    return;
                };
                (event, inner.open.callbacks())
            };
            for callback in callbacks {
                (*callback)(&event);
            }
        }
    }

    pub fn emit_active_changed(&self, change: ActiveTabChange) {
        let callbacks = self.lock().activate.callbacks();
        for callback in callbacks {
            (*callback)(&change);
        }
    }

    pub fn subscribe_active_changed(
        &self,
        callback: impl Fn(&ActiveTabChange) + Send + Sync + 'static,
    ) -> BusSubscription {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.activate.add(id, Arc::new(callback));
            id
        };
        self.subscription(BusChannel::Activate, id)
    }

    pub fn emit_closed(&self, tab_id: &str) {
        let event = tab_id.to_string();
        let callbacks = self.lock().close.callbacks();
        for callback in callbacks {
            (*callback)(&event);
        }
    }

    pub fn subscribe_closed(
        &self,
        callback: impl Fn(&String) + Send + Sync + 'static,
    ) -> BusSubscription {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.close.add(id, Arc::new(callback));
            id
        };
        self.subscription(BusChannel::Close, id)
    }

    pub fn emit_title_updated(&self, update: TitleUpdate) {
        let callbacks = self.lock().title.callbacks();
        for callback in callbacks {
            (*callback)(&update);
        }
    }

    pub fn subscribe_title_updated(
        &self,
        callback: impl Fn(&TitleUpdate) + Send + Sync + 'static,
    ) -> BusSubscription {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.title.add(id, Arc::new(callback));
            id
        };
        self.subscription(BusChannel::Title, id)
    }

    pub fn subscriber_count(&self, channel: BusChannel) -> usize {
        let inner = self.lock();
        match channel {
            BusChannel::Open => inner.open.subscribers.len(),
            BusChannel::Activate => inner.activate.subscribers.len(),
            BusChannel::Close => inner.close.subscribers.len(),
            BusChannel::Title => inner.title.subscribers.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recorded() -> (Arc<StdMutex<Vec<String>>>, impl Fn(&TabPayload) + Send + Sync) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |payload: &TabPayload| {
            sink.lock().unwrap().push(payload.id().to_string());
        })
    }

    #[test]
    fn test_open_dispatches_synchronously_with_subscriber() {
        let bus = TabBus::new();
        let (seen, callback) = recorded();
        let _sub = bus.subscribe_open(callback);

        bus.open_tab(TabPayload::database("sales"));

        assert_eq!(*seen.lock().unwrap(), vec!["db:sales"]);
    }

    #[test]
    fn test_pre_subscription_opens_replay_once_asynchronously() {
        let bus = TabBus::new();
        bus.open_tab(TabPayload::database("sales"));
        bus.open_tab(TabPayload::table("sales", "orders", None));

        let (seen, callback) = recorded();
        let _sub = bus.subscribe_open(callback);

        // Nothing is delivered inside the subscribe call itself.
        assert!(seen.lock().unwrap().is_empty());

        bus.dispatch_deferred();
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["db:sales", "table:sales.orders"]
        );

        // The batch replays exactly once.
        bus.dispatch_deferred();
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_replay_is_scheduled_only_on_first_subscriber() {
        let bus = TabBus::new();
        bus.open_tab(TabPayload::database("sales"));

        let (first_seen, first_callback) = recorded();
        let _first = bus.subscribe_open(first_callback);
        bus.dispatch_deferred();

        let (second_seen, second_callback) = recorded();
        let _second = bus.subscribe_open(second_callback);
        bus.dispatch_deferred();

        assert_eq!(first_seen.lock().unwrap().len(), 1);
        assert!(second_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dropping_subscription_detaches() {
        let bus = TabBus::new();
        let (seen, callback) = recorded();
        let sub = bus.subscribe_open(callback);
        assert_eq!(bus.subscriber_count(BusChannel::Open), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count(BusChannel::Open), 0);

        // With no subscriber the event is queued again, not lost.
        bus.open_tab(TabPayload::database("sales"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_close_and_activate_channels_do_not_queue() {
        let bus = TabBus::new();
        bus.emit_closed("table:sales.orders");
        bus.emit_active_changed(ActiveTabChange {
            tab_id: "table:sales.orders".to_string(),
            payload: None,
        });

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = bus.subscribe_closed(move |id| sink.lock().unwrap().push(id.clone()));

        // Fire-and-forget channels deliver nothing retroactively.
        assert!(seen.lock().unwrap().is_empty());

        bus.emit_closed("db:sales");
        assert_eq!(*seen.lock().unwrap(), vec!["db:sales"]);
    }

    #[test]
    fn test_callbacks_may_reenter_the_bus() {
        let bus = TabBus::new();
        let reentrant = bus.clone();
        let _sub = bus.subscribe_open(move |payload| {
            reentrant.emit_title_updated(TitleUpdate {
                tab_id: payload.id().to_string(),
                title: payload.title(),
            });
        });

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        let _title = bus.subscribe_title_updated(move |update| {
            sink.lock().unwrap().push(update.title.clone());
        });

        bus.open_tab(TabPayload::database("sales"));
        assert_eq!(*seen.lock().unwrap(), vec!["sales"]);
    }
}
