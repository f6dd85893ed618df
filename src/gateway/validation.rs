use super::messages::BookRequest;
use crate::{BookingRequest, Cinema, Movie, Session};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required request argument {0} must be specified")]
    Missing(&'static str),
}

fn required_text(value: Option<&String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.clone()),
        _ => Err(ValidationError::Missing(field)),
    }
}

/// Seconds from the Unix epoch back to 0001-01-01T00:00:00Z.
const YEAR_ONE_SECONDS: i64 = -62_135_596_800;

// Both the Unix epoch and 0001-01-01T00:00:00Z stand for an unset date.
fn is_zero_instant(date: &DateTime<Utc>) -> bool {
    date.timestamp_subsec_nanos() == 0
        && (date.timestamp() == 0 || date.timestamp() == YEAR_ONE_SECONDS)
}

/// Structural check of a Book call. Pure: touches neither the service nor storage.
pub fn validate_book_request(request: &BookRequest) -> Result<BookingRequest, ValidationError> {
    let cinema = request.cinema.as_ref();
    let session = request.session.as_ref();

    let name = required_text(cinema.map(|c| &c.name), "cinema.name")?;
    let location = required_text(cinema.map(|c| &c.location), "cinema.location")?;
    let title = required_text(request.movie.as_ref().map(|m| &m.title), "movie.title")?;

    let screen = session
        .map(|s| s.screen)
        .filter(|screen| *screen != 0)
        .ok_or(ValidationError::Missing("session.screen"))?;
    let seat = session
        .map(|s| s.seat)
        .filter(|seat| *seat != 0)
        .ok_or(ValidationError::Missing("session.seat"))?;
    let date = session
        .and_then(|s| s.date)
        .filter(|date| !is_zero_instant(date))
        .ok_or(ValidationError::Missing("session.date"))?;

    Ok(BookingRequest {
        cinema: Cinema { name, location },
        movie: Movie { title },
        session: Session { screen, seat, date },
    })
}
