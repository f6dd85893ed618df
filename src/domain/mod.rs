pub mod booking;
pub mod schemas;

pub use booking::*;
pub use schemas::*;
