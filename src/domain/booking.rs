use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cinema {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub screen: u32,
    pub seat: u32,
    pub date: DateTime<Utc>,
}

/// A structurally valid booking request.
///
/// Only the gateway builds these, after every field has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub cinema: Cinema,
    pub movie: Movie,
    pub session: Session,
}

impl BookingRequest {
    pub fn session_key(&self) -> SessionKey {
        SessionKey {
            screen: self.session.screen,
            cinema: self.cinema.name.clone(),
            location: self.cinema.location.clone(),
            date: self.session.date,
        }
    }
}

/// Public reference of a confirmed booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(String);

impl Ticket {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row of the `bookings` table. Never mutated after it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub ticket: Ticket,
    pub movie: String,
    pub screen: u32,
    pub seat: u32,
    pub date: DateTime<Utc>,
    pub cinema: String,
    pub location: String,
}

impl BookingRecord {
    pub fn new(ticket: Ticket, request: &BookingRequest) -> Self {
        Self {
            ticket,
            movie: request.movie.title.clone(),
            screen: request.session.screen,
            seat: request.session.seat,
            date: request.session.date,
            cinema: request.cinema.name.clone(),
            location: request.cinema.location.clone(),
        }
    }

    pub fn screen_key(&self) -> ScreenKey {
        ScreenKey {
            screen: self.screen,
            cinema: self.cinema.clone(),
            location: self.location.clone(),
        }
    }

    pub fn session_key(&self) -> SessionKey {
        SessionKey {
            screen: self.screen,
            cinema: self.cinema.clone(),
            location: self.location.clone(),
            date: self.date,
        }
    }
}

/// Identifies a physical screen: (screen, cinema name, cinema location).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScreenKey {
    pub screen: u32,
    pub cinema: String,
    pub location: String,
}

/// Identifies one showing on a screen. Capacity is counted per session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub screen: u32,
    pub cinema: String,
    pub location: String,
    pub date: DateTime<Utc>,
}

/// Reference data: how many seats a screen has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenCapacity {
    pub screen: u32,
    pub cinema: String,
    pub location: String,
    pub seats: u32,
}

impl ScreenCapacity {
    pub fn key(&self) -> ScreenKey {
        ScreenKey {
            screen: self.screen,
            cinema: self.cinema.clone(),
            location: self.location.clone(),
        }
    }
}

/// Published once per committed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub ticket: Ticket,
    pub data: BookingRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub ticket: Ticket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    pub order: Order,
}

impl BookResponse {
    pub fn new(ticket: Ticket) -> Self {
        Self {
            order: Order { ticket },
        }
    }
}
