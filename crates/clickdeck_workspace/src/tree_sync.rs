use std::sync::{Arc, Mutex};

use clickdeck_core::SchemaNodeId;

use crate::bus::{ActiveTabChange, BusSubscription, TabBus};

/// Keeps the schema tree's highlight in step with the active tab.
///
/// While the tree is in a text-filtered state, scroll/highlight updates are
/// held back (latest change wins) and replayed once the filter clears, so
/// the filtered tree does not jump around under the user. A closure event
/// clears the highlight instead of navigating.
#[derive(Default)]
pub struct TreeSync {
    filtering: bool,
    deferred: Option<ActiveTabChange>,
    highlight: Option<SchemaNodeId>,
    scroll_target: Option<SchemaNodeId>,
}

impl TreeSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires a shared sync state to the bus's activate channel.
    pub fn attach(sync: &Arc<Mutex<TreeSync>>, bus: &TabBus) -> BusSubscription {
        let weak = Arc::downgrade(sync);
        bus.subscribe_active_changed(move |change| {
            if let Some(sync) = weak.upgrade() {
                sync.lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .on_active_changed(change);
            }
        })
    }

    /// Feeds one activation change; returns the scroll target, if any.
    pub fn on_active_changed(&mut self, change: &ActiveTabChange) -> Option<SchemaNodeId> {
        if self.filtering {
            self.deferred = Some(change.clone());
            return None;
        }
        self.apply(change)
    }

    /// Flags the filtered state. Clearing the filter replays the last change
    /// seen while filtered and returns its scroll target.
    pub fn set_filtering(&mut self, filtering: bool) -> Option<SchemaNodeId> {
        self.filtering = filtering;
        if filtering {
            return None;
        }
        let deferred = self.deferred.take()?;
        self.apply(&deferred)
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    /// Node currently highlighted in the tree, if any.
    pub fn highlight(&self) -> Option<&SchemaNodeId> {
        self.highlight.as_ref()
    }

    /// Consumes the pending scroll target (the view scrolls at most once
    /// per change).
    pub fn take_scroll_target(&mut self) -> Option<SchemaNodeId> {
        self.scroll_target.take()
    }

    fn apply(&mut self, change: &ActiveTabChange) -> Option<SchemaNodeId> {
        match &change.payload {
            None => {
                self.highlight = None;
                self.scroll_target = None;
                None
            }
            Some(tab) => {
                let target = tab.schema_target();
                self.highlight = target.clone();
                self.scroll_target = target.clone();
                target
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clickdeck_core::TabPayload;

    fn change_for(tab: TabPayload) -> ActiveTabChange {
        ActiveTabChange {
            tab_id: tab.id().to_string(),
            payload: Some(tab),
        }
    }

    #[test]
    fn test_unfiltered_changes_apply_immediately() {
        let mut sync = TreeSync::new();
        let target = sync.on_active_changed(&change_for(TabPayload::table("sales", "orders", None)));

        assert_eq!(target, Some(SchemaNodeId::table("sales", "orders")));
        assert_eq!(sync.highlight(), Some(&SchemaNodeId::table("sales", "orders")));
        assert_eq!(
            sync.take_scroll_target(),
            Some(SchemaNodeId::table("sales", "orders"))
        );
        assert_eq!(sync.take_scroll_target(), None);
    }

    #[test]
    fn test_filtered_changes_are_deferred_latest_wins() {
        let mut sync = TreeSync::new();
        assert!(sync.set_filtering(true).is_none());

        sync.on_active_changed(&change_for(TabPayload::table("sales", "orders", None)));
        sync.on_active_changed(&change_for(TabPayload::database("logs")));
        assert!(sync.highlight().is_none());

        let replayed = sync.set_filtering(false);
        assert_eq!(replayed, Some(SchemaNodeId::database("logs")));
        assert_eq!(sync.highlight(), Some(&SchemaNodeId::database("logs")));

        // The deferred change replays only once.
        assert!(sync.set_filtering(false).is_none());
    }

    #[test]
    fn test_closure_clears_highlight() {
        let mut sync = TreeSync::new();
        sync.on_active_changed(&change_for(TabPayload::table("sales", "orders", None)));

        sync.on_active_changed(&ActiveTabChange {
            tab_id: "table:sales.orders".to_string(),
            payload: None,
        });

        assert!(sync.highlight().is_none());
        assert!(sync.take_scroll_target().is_none());
    }

    #[test]
    fn test_tabs_without_schema_target_clear_nothing_useful() {
        let mut sync = TreeSync::new();
        sync.on_active_changed(&change_for(TabPayload::table("sales", "orders", None)));

        // A query tab has no tree counterpart; highlight follows to "none".
        let target = sync.on_active_changed(&change_for(TabPayload::query("query")));
        assert!(target.is_none());
        assert!(sync.highlight().is_none());
    }
}
