mod gray;

pub use gray::{channels_equal, gray_from_bgr, to_single_channel};
