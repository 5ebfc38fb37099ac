pub mod config;
pub mod consumers;
pub mod orchestrator;
pub mod protocol;
pub mod viewer;

pub use config::*;
pub use consumers::*;
pub use orchestrator::*;
pub use protocol::*;
pub use viewer::*;
