//! CLI command implementations.

mod config;
mod doctor;
mod mcp;
mod serve;
mod visit;

pub use config::run_config;
pub use doctor::run_doctor;
pub use mcp::run_mcp;
pub use serve::run_serve;
pub use visit::run_visit;
