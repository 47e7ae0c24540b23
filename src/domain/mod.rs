//! Domain layer: listings, server identity, tracking events and the
//! tracker's in-memory state.

pub mod listing;
pub mod server_key;
pub mod tracker_state;
pub mod tracking_event;

pub use listing::{ServerListing, ServerState};
pub use server_key::ServerKey;
pub use tracker_state::{TrackedServer, TrackerState};
pub use tracking_event::{TrackingEvent, sort_by_priority};
