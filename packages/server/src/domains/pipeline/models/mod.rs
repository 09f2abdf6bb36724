pub mod artifact;
pub mod dataset;
pub mod settings;
pub mod target;

pub use artifact::*;
pub use dataset::*;
pub use settings::*;
pub use target::*;
