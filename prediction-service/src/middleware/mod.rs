pub mod cors;
pub mod preflight;

pub use cors::{home_cors, predict_cors};
pub use preflight::preflight_no_content_middleware;
