pub mod catalog;
pub mod client;
pub mod driver;
pub mod injector;
pub mod pacing;
pub mod session;

pub use catalog::*;
pub use client::*;
pub use driver::*;
pub use injector::*;
pub use session::*;
