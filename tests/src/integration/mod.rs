//! Cross-crate flows.

mod flows;
