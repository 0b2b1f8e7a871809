mod bus;
mod strip;
mod tree_sync;

pub use bus::{ActiveTabChange, BusChannel, BusSubscription, TabBus, TitleUpdate};
pub use strip::{PendingActivation, TabStrip, TabStripConfig};
pub use tree_sync::TreeSync;
