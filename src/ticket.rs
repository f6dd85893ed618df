use crate::Ticket;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Number of decimal digits in a ticket, roughly 66 bits of randomness.
pub const TICKET_LEN: usize = 20;

/// Source of fresh ticket identifiers
pub trait TicketGenerator: Send + Sync {
    fn generate(&self) -> Ticket;
}

/// Draws tickets from the thread-local CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTicketGenerator;

impl TicketGenerator for RandomTicketGenerator {
    fn generate(&self) -> Ticket {
        random_ticket(&mut rand::thread_rng())
    }
}

/// Deterministic generator for tests and replays
pub struct SeededTicketGenerator {
    rng: Mutex<StdRng>,
}

impl SeededTicketGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl TicketGenerator for SeededTicketGenerator {
    fn generate(&self) -> Ticket {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        random_ticket(&mut *rng)
    }
}

pub fn random_ticket<R: Rng + ?Sized>(rng: &mut R) -> Ticket {
    let digits: String = (0..TICKET_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    Ticket::new(digits)
}

pub fn is_well_formed(ticket: &Ticket) -> bool {
    ticket.as_str().len() == TICKET_LEN && ticket.as_str().bytes().all(|b| b.is_ascii_digit())
}
