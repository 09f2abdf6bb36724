//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod scheduled_tasks;
pub mod simple_scraper;
pub mod test_dependencies;
pub mod traits;

pub use deps::{FoundryAdapter, ServerDeps};
pub use scheduled_tasks::start_scheduler;
pub use simple_scraper::SimpleScraper;
pub use test_dependencies::{MockPipelinePlatform, MockRead, MockWebScraper, TestDependencies};
pub use traits::*;
