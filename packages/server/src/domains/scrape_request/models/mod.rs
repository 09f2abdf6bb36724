pub mod scrape_request;

pub use scrape_request::*;
