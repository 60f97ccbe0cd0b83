//! # Remote Signer Test Suite
//!
//! Cross-crate tests that run the signer the way an operator would: key
//! files on disk, a real SQLite file, the runtime wiring in between.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Decision and signing throughput
//! └── src/integration/  # Runtime + signing + slashing protection flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p signer-tests
//! cargo bench -p signer-tests
//! ```

pub mod integration;
