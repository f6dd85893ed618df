// Remote procedure paths served by the gateway
pub struct Procedures;

impl Procedures {
    pub const BOOK: &'static str = "/bookamovie.Book/Book";
    pub const HEALTH: &'static str = "/health";
    pub const METRICS: &'static str = "/metrics";
}

// Utility functions for log/metric keys
pub fn session_label(screen: u32, cinema: &str, location: &str) -> String {
    format!("{}#{}#{}", cinema, location, screen)
}
