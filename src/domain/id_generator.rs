//! Identifier generation for new orders.

use rand::Rng;
use uuid::{Builder, Uuid};

/// Produces identifiers for newly started orders.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// Random version 4 UUIDs drawn from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> Uuid {
        let bytes: [u8; 16] = rand::rng().random();
        Builder::from_random_bytes(bytes).into_uuid()
    }
}
