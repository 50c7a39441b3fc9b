//! External token issuer (`snctl`) and the orchestration around it.

pub mod command;
pub mod key_file;
pub mod orchestrator;
pub mod snctl;

pub use command::{CommandError, CommandOutput, CommandRunner, ProcessRunner};
pub use orchestrator::{Issued, Orchestrator};
pub use snctl::{IssuerOperation, SnctlIssuer};
