//! Reconciliation — drift detection and classification, action generation,
//! and the versioned state history that backs rollback.

pub mod drift;
pub mod history;
