//! OS integration: signals, single-instance locking, the system event feed,
//! and the wake-lock primitive.

pub mod feed;
pub mod lock;
pub mod signals;
pub mod wakelock;
