pub mod application;
pub mod organization;

pub use application::*;
pub use organization::*;
