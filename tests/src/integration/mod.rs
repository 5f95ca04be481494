//! Cross-subsystem integration scenarios.

pub mod flows;
