pub mod essay;
pub mod image;
pub mod output;
pub mod push;
pub mod text;

pub use essay::{analyze_essay, quick_help, EssayRequest, EssayResponse};
pub use image::{submit_image, wait_for_media_item_rows, ImagePathResult};
pub use output::output_rows;
pub use push::{push_file, PushResult};
pub use text::{submit_text, TextPathResult};
