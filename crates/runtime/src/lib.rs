pub mod clock;
pub mod redraw;

pub use clock::*;
pub use redraw::*;
