use std::sync::{Arc, Mutex};

use uuid::Uuid;

use clickdeck_core::TabPayload;

use crate::bus::{ActiveTabChange, BusSubscription, TabBus};

/// Two-phase activation state for a freshly inserted tab.
///
/// A new tab must not become active before the list state containing it has
/// been committed to the rendered view, so insertion parks it here and the
/// host's post-commit hook performs the activation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PendingActivation {
    #[default]
    Idle,
    Inserted {
        tab_id: String,
    },
}

/// Per-workspace configuration.
#[derive(Debug, Clone, Default)]
pub struct TabStripConfig {
    /// Tab id that `close_all` never removes (a workspace's default query
    /// tab in some integrations). This is integration-specific and off by
    /// default.
    pub protected_tab: Option<String>,
}

/// Ordered tab collection and active pointer for one workspace instance.
///
/// Tabs keep insertion order; order never changes except by explicit close
/// operations. At most one tab is active. All mutations broadcast through
/// the injected [`TabBus`] so observers (tab bar, schema tree) stay in sync.
pub struct TabStrip {
    bus: TabBus,
    config: TabStripConfig,
    tabs: Vec<TabPayload>,
    active: Option<String>,
    pending: PendingActivation,
    connection: Option<Uuid>,
}

impl TabStrip {
    pub fn new(bus: TabBus, config: TabStripConfig) -> Self {
        Self {
            bus,
            config,
            tabs: Vec::new(),
            active: None,
            pending: PendingActivation::Idle,
            connection: None,
        }
    }

    /// Wires a shared strip to its bus's open channel.
    ///
    /// Activate subscribers must not call back into the strip synchronously:
    /// the strip's lock is held while its own broadcasts run.
    pub fn attach(strip: &Arc<Mutex<TabStrip>>) -> BusSubscription {
        let bus = strip
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .bus
            .clone();
        let weak = Arc::downgrade(strip);
        bus.subscribe_open(move |payload| {
            if let Some(strip) = weak.upgrade() {
                strip
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .open(payload.clone());
            }
        })
    }

    pub fn tabs(&self) -> &[TabPayload] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_tab(&self) -> Option<&TabPayload> {
        let id = self.active.as_deref()?;
        self.tabs.iter().find(|tab| tab.id() == id)
    }

    pub fn pending(&self) -> &PendingActivation {
        &self.pending
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id() == id)
    }

    /// Opens a tab: an already-present id is activated in place, a new
    /// payload is appended and parked for post-commit activation.
    pub fn open(&mut self, payload: TabPayload) {
        let id = payload.id().to_string();
        if self.index_of(&id).is_some() {
            self.activate(&id);
            return;
        }

        self.tabs.push(payload);
        self.pending = PendingActivation::Inserted { tab_id: id };
    }

    /// Post-commit hook: performs the activation parked by [`TabStrip::open`].
    pub fn commit(&mut self) {
        if let PendingActivation::Inserted { tab_id } = std::mem::take(&mut self.pending) {
            self.activate(&tab_id);
        }
    }

    /// Moves the active pointer; no-op for unknown ids or the current tab.
    pub fn activate(&mut self, id: &str) {
        if self.active.as_deref() == Some(id) {
            return;
        }
        let Some(index) = self.index_of(id) else {
            log::warn!("ignoring activation of unknown tab {id}");
            return;
        };

        self.active = Some(id.to_string());
        self.bus.emit_active_changed(ActiveTabChange {
            tab_id: id.to_string(),
            payload: Some(self.tabs[index].clone()),
        });
    }

    /// Closes one tab. If it was active, the neighbor after it takes over;
    /// failing that the neighbor before it; failing that none.
    pub fn close(&mut self, id: &str) {
        let Some(index) = self.index_of(id) else {
            return;
        };

        let was_active = self.active.as_deref() == Some(id);
        if was_active {
            // Closure broadcast goes out before removal so observers drop
            // their stale highlight instead of navigating to it.
            self.active = None;
            self.bus.emit_active_changed(ActiveTabChange {
                tab_id: id.to_string(),
                payload: None,
            });
        }
        if matches!(&self.pending, PendingActivation::Inserted { tab_id } if tab_id == id) {
            self.pending = PendingActivation::Idle;
        }

        self.tabs.remove(index);
        self.bus.emit_closed(id);

        if was_active {
            let replacement = self
                .tabs
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|i| self.tabs.get(i)))
                .map(|tab| tab.id().to_string());
            if let Some(replacement) = replacement {
                self.activate(&replacement);
            }
        }
    }

    /// Keeps the pivot and everything before it; drops the rest.
    pub fn close_right(&mut self, pivot: &str) {
        let Some(index) = self.index_of(pivot) else {
            return;
        };
        let dropped = self.tabs.split_off(index + 1);
        self.retire(dropped, pivot);
    }

    /// Keeps only the pivot.
    pub fn close_others(&mut self, pivot: &str) {
        let Some(index) = self.index_of(pivot) else {
            return;
        };
        let mut dropped = self.tabs.split_off(index + 1);
        let mut before: Vec<_> = self.tabs.drain(..index).collect();
        before.append(&mut dropped);
        self.retire(before, pivot);
    }

    /// Empties the list, except for the configured protected tab (which
    /// becomes active when present).
    pub fn close_all(&mut self) {
        let protected = self.config.protected_tab.clone();
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tabs)
            .into_iter()
            .partition(|tab| protected.as_deref() == Some(tab.id()));
        self.tabs = kept;

        match self.tabs.first().map(|tab| tab.id().to_string()) {
            Some(survivor) => {
                self.retire(dropped, &survivor);
                // The survivor ends up active even when no tab was active
                // before; a no-op when it already took over.
                self.activate(&survivor);
            }
            None => {
                self.drop_active_among(&dropped);
                for tab in &dropped {
                    self.bus.emit_closed(tab.id());
                }
                self.pending = PendingActivation::Idle;
            }
        }
    }

    /// A changed connection identity invalidates every tab: all views are
    /// connection-scoped.
    pub fn sync_connection(&mut self, connection: Uuid) {
        if self.connection == Some(connection) {
            return;
        }
        let previous = self.connection.replace(connection);
        if previous.is_none() {
            return;
        }

        log::info!("connection changed, dropping {} tabs", self.tabs.len());
        let dropped = std::mem::take(&mut self.tabs);
        self.drop_active_among(&dropped);
        for tab in &dropped {
            self.bus.emit_closed(tab.id());
        }
        self.pending = PendingActivation::Idle;
    }

    /// Shared tail of the bulk close operations: broadcast the drops and
    /// move the pointer to the pivot when the active tab went away.
    fn retire(&mut self, dropped: Vec<TabPayload>, pivot: &str) {
        if dropped.is_empty() {
            return;
        }
        let active_dropped = self
            .active
            .as_deref()
            .is_some_and(|active| dropped.iter().any(|tab| tab.id() == active));

        if active_dropped {
            self.drop_active_among(&dropped);
        }
        if matches!(&self.pending, PendingActivation::Inserted { tab_id }
            if dropped.iter().any(|tab| tab.id() == *tab_id))
        {
            self.pending = PendingActivation::Idle;
        }
        for tab in &dropped {
            self.bus.emit_closed(tab.id());
        }
        if active_dropped {
            self.activate(pivot);
        }
    }

    fn drop_active_among(&mut self, dropped: &[TabPayload]) {
        let Some(active) = self.active.as_deref() else {
            return;
        };
        if dropped.iter().any(|tab| tab.id() == active) {
            let closed = active.to_string();
            self.active = None;
            self.bus.emit_active_changed(ActiveTabChange {
                tab_id: closed,
                payload: None,
            });
        }
    }
}
