//! Service layer: the ledger and archiver that write history, the poller
//! that drives them, the read-side history queries and alert
//! subscriptions.

pub mod alerts;
pub mod archiver;
pub mod history;
pub mod ledger;
pub mod poller;

pub use alerts::{AlertList, AlertService};
pub use archiver::SnapshotArchiver;
pub use history::HistoryService;
pub use ledger::{ApplyOutcome, ApplySummary, SightingLedger};
pub use poller::{CycleReport, Poller};
