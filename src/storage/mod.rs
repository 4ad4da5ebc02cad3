pub mod watermark;

pub use watermark::{ALERT_WATERMARK, WatermarkStore};
