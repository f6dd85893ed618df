use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Wire shape of the Book call. Every field may be absent on the wire;
// absent and zero values are treated alike by validation.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookRequest {
    pub cinema: Option<CinemaMessage>,
    pub movie: Option<MovieMessage>,
    pub session: Option<SessionMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CinemaMessage {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieMessage {
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionMessage {
    pub screen: u32,
    pub seat: u32,
    pub date: Option<DateTime<Utc>>,
}
