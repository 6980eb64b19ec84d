//! Background Tasks Module
//!
//! Tasks a host can run alongside a shared cache.
//!
//! # Tasks
//! - Expiry: fires due timeout timers so expired entries are released
//!   without waiting for the next cache operation

mod expiry;

pub use expiry::spawn_expiry_task;
