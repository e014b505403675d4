pub mod bootcamps;
pub mod system;
pub mod websocket;

pub use bootcamps::*;
pub use system::*;
pub use websocket::*;
