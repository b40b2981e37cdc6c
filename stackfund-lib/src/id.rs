//! Short identifiers for shareable payment links.
//!
//! A link id is 8 characters drawn uniformly from `[A-Za-z0-9]`, about 47.6
//! bits of entropy. Generators know nothing about existing records; the
//! service checks candidates against the store and retries on collision.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of every payment link id.
pub const LINK_ID_LEN: usize = 8;

/// Source of candidate payment link ids.
pub trait LinkIdGenerator: Send + Sync {
    /// Produce one candidate id. Uniqueness is not guaranteed.
    fn generate(&self) -> String;
}

/// Production generator backed by the thread-local RNG.
///
/// # Example
///
/// ```
/// use stackfund_lib::id::{is_valid_link_id, LinkIdGenerator, RandomIdGenerator};
///
/// let id = RandomIdGenerator.generate();
/// assert!(is_valid_link_id(&id));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl LinkIdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(LINK_ID_LEN)
            .map(char::from)
            .collect()
    }
}

/// Check that `id` has the shape of a generated link id.
pub fn is_valid_link_id(id: &str) -> bool {
    id.len() == LINK_ID_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
}
