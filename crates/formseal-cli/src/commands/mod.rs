pub mod misc;
pub mod record;
pub mod slot;
