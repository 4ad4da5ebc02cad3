pub mod fs;
pub mod markdown;
