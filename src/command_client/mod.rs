//! Command Client - camera command protocol over HTTP GET
//!
//! ## Responsibilities
//!
//! - Map camera operations to (command code, parameter) pairs
//! - Build the command URL from the current settings
//! - Execute one bounded GET per command and fold every outcome into a
//!   `CommandResult` (transport and protocol errors never propagate)

pub mod dispatcher;
pub mod transport;
pub mod types;

pub use dispatcher::{build_command_url, CommandDispatcher};
pub use transport::{CommandTransport, HttpCommandTransport, DEFAULT_COMMAND_TIMEOUT_SECS};
pub use types::*;
