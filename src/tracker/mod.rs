//! Change detection between successive server listings.
//!
//! [`EventDetector`] keeps the previous listing as a
//! [`crate::domain::TrackerState`] and turns each new listing into an
//! ordered list of [`crate::domain::TrackingEvent`]s.

pub mod detector;

pub use detector::{EventDetector, diff};
