//! Host protocol handling.
//!
//! A line-oriented stdin/stdout protocol standing in for the real transport:
//! the command parser for the host main loop and the response lines it
//! writes back.

pub mod parser;
pub mod response;

pub use parser::{parse_command, Command};
pub use response::{phase_name, Response, Snapshot};
