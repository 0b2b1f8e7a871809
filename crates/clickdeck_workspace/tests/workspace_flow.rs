use std::sync::{Arc, Mutex};

use clickdeck_core::{SchemaNodeId, TabPayload};
use clickdeck_workspace::{TabBus, TabStrip, TabStripConfig, TreeSync};

/// Producers fire before the workspace mounts; once the strip attaches and
/// the host pumps the bus, the queued opens land and the tree follows the
/// activation.
#[test]
fn queued_opens_flow_through_strip_and_tree() {
    let bus = TabBus::new();

    // Fired from a context menu before any workspace exists.
    bus.open_tab(TabPayload::table("sales", "orders", None));
    bus.open_tab(TabPayload::table("sales", "orders", None));

    let strip = Arc::new(Mutex::new(TabStrip::new(
        bus.clone(),
        TabStripConfig::default(),
    )));
    let _strip_sub = TabStrip::attach(&strip);

    let sync = Arc::new(Mutex::new(TreeSync::new()));
    let _sync_sub = TreeSync::attach(&sync, &bus);

    // Nothing happens until the host's next turn.
    assert!(strip.lock().unwrap().is_empty());

    bus.dispatch_deferred();
    {
        let mut strip = strip.lock().unwrap();
        // Duplicate open of the same id collapsed into one tab.
        assert_eq!(strip.len(), 1);
        strip.commit();
        assert_eq!(strip.active_id(), Some("table:sales.orders"));
    }

    let mut sync = sync.lock().unwrap();
    assert_eq!(
        sync.take_scroll_target(),
        Some(SchemaNodeId::table("sales", "orders"))
    );
}

/// A filtered tree ignores activations until the filter clears, then
/// replays the last one.
#[test]
fn filtered_tree_replays_last_activation() {
    let bus = TabBus::new();
    let strip = Arc::new(Mutex::new(TabStrip::new(
        bus.clone(),
        TabStripConfig::default(),
    )));
    let _strip_sub = TabStrip::attach(&strip);

    let sync = Arc::new(Mutex::new(TreeSync::new()));
    let _sync_sub = TreeSync::attach(&sync, &bus);

    sync.lock().unwrap().set_filtering(true);

    bus.open_tab(TabPayload::table("sales", "orders", None));
    strip.lock().unwrap().commit();
    bus.open_tab(TabPayload::database("logs"));
    strip.lock().unwrap().commit();

    assert!(sync.lock().unwrap().highlight().is_none());

    let replayed = sync.lock().unwrap().set_filtering(false);
    assert_eq!(replayed, Some(SchemaNodeId::database("logs")));
}

/// Closing the active tab pushes a null activation so the tree clears its
/// highlight before the neighbor takes over.
#[test]
fn close_clears_highlight_then_moves_to_neighbor() {
    let bus = TabBus::new();
    let strip = Arc::new(Mutex::new(TabStrip::new(
        bus.clone(),
        TabStripConfig::default(),
    )));
    let _strip_sub = TabStrip::attach(&strip);

    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = changes.clone();
    let _observer = bus.subscribe_active_changed(move |change| {
        sink.lock().unwrap().push(change.clone());
    });

    bus.open_tab(TabPayload::table("sales", "a", None));
    strip.lock().unwrap().commit();
    bus.open_tab(TabPayload::table("sales", "b", None));
    strip.lock().unwrap().commit();

    strip.lock().unwrap().close("table:sales.b");

    let changes = changes.lock().unwrap();
    let tail: Vec<_> = changes
        .iter()
        .rev()
        .take(2)
        .map(|c| (c.tab_id.clone(), c.payload.is_some()))
        .collect();

    // Newest first: the neighbor activation, preceded by the null closure.
    assert_eq!(
        tail,
        vec![
            ("table:sales.a".to_string(), true),
            ("table:sales.b".to_string(), false),
        ]
    );
    assert_eq!(strip.lock().unwrap().active_id(), Some("table:sales.a"));
}
