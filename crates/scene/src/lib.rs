pub mod bounds;
pub mod controller;
pub mod model;
pub mod session;
pub mod transform;

pub use bounds::*;
pub use controller::*;
pub use model::*;
pub use session::*;
pub use transform::*;
