// Platform-specific code module

pub mod command;
pub mod gpu;
pub mod hardware;

pub use command::run_with_timeout;
pub use hardware::{HardwareProbe, SysinfoProbe};
