pub mod combine;
pub mod text;
pub mod url;

pub use combine::combine_verdicts;
pub use text::{extract_urls, score_text};
pub use url::score_url;
