// Campus Directory - API Core
//
// Organization directory backend plus the pipeline layer that pushes
// scraped text and images through the batch-processing platform and waits
// for matching output rows.
//
// Domain logic lives in domains/*, infrastructure seams in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
