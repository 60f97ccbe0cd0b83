//! Ports layer for slashing protection.

pub mod inbound;

pub use inbound::SlashingProtection;
