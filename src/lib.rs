//! Trazar — intent-to-infrastructure pipeline.
//!
//! Natural-language intent in, policy-checked declarative configuration out.
//! Four stages: extraction to a typed intent schema, policy and compliance
//! validation with auto-remediation, building-block synthesis, and drift
//! reconciliation with versioned state history.

pub mod blocks;
pub mod core;
pub mod reconcile;
