/// Concurrent member index and pending-absence tracking
pub mod index;
/// Roster file persistence and locking
pub mod roster;
/// Per-file attribute snapshots
pub mod snapshot;

pub use index::Index;
pub use roster::{Access, Roster, RosterFile};
pub use snapshot::AttributeSnapshot;
