pub mod header;
pub mod toast;
pub mod utils;

pub use header::draw_header;
pub use toast::draw_toast;
pub use utils::truncate;
