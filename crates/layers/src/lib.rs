pub mod actors;
pub mod draw;
pub mod map;
pub mod readout;
pub mod signals;
pub mod symbology;

pub use actors::*;
pub use draw::*;
pub use map::*;
pub use readout::*;
pub use signals::*;
