//! Request handlers.

mod signing;

pub use signing::{HandlerError, SigningHandler, SigningOutcome};
