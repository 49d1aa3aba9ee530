mod builder;
mod global;
pub mod models;
mod utils;

pub use builder::AfreecaTv;
pub use builder::{URL_REGEX, VideoReference};
pub use global::{AfreecaTvGlobal, ChannelReference, GLOBAL_URL_REGEX};
pub use utils::{VideoKeyInfo, live_title, parse_video_key};
