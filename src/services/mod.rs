pub mod hooks;
pub mod table;

pub use table::{CredentialKind, Mode, OutputFormat, ServiceConfig, ServiceId, WireDefaults, SERVICES};
