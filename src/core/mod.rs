//! Core pipeline — intent schema, extraction, validation, synthesis.

pub mod clock;
pub mod extract;
pub mod registry;
pub mod synth;
pub mod types;
pub mod validate;
