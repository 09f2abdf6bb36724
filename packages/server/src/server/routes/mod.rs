// HTTP routes
pub mod applications;
pub mod chat;
pub mod directory;
pub mod health;
pub mod pipeline;
pub mod profile;
pub mod scrape_requests;

pub use applications::*;
pub use chat::*;
pub use directory::*;
pub use health::*;
pub use pipeline::*;
pub use profile::*;
pub use scrape_requests::*;
