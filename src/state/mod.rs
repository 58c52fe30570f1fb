//! Application state.
//!
//! - The batch session the UI drives (session.rs)
//! - Batch saving with overwrite confirmation (save.rs)

pub mod save;
pub mod session;
