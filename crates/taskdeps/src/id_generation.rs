//! Hash-based identifiers for dependency edges.
//!
//! Edge ids have the form `dep-{hash}` where `hash` is a base36 rendering of
//! a SHA256 digest over the edge's endpoints, its creator, the creation
//! timestamp and a nonce. Collisions against already-issued ids are retried
//! with increasing nonces.
//!
//! ```
//! use taskdeps::id_generation::EdgeIdGenerator;
//!
//! let mut generator = EdgeIdGenerator::new();
//! let id = generator.generate("task-a", "task-b", "alice").unwrap();
//! assert!(id.starts_with("dep-"));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Prefix shared by every edge id
pub const EDGE_ID_PREFIX: &str = "dep";

/// Length of the hash part of an edge id
pub const EDGE_HASH_LENGTH: usize = 8;

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried
        attempts: u32,
    },
}

/// Edge id generator with collision detection.
///
/// Holds the set of ids it has issued or been told about; callers register
/// ids loaded from persistent storage with [`register_id`](Self::register_id).
#[derive(Debug, Default)]
pub struct EdgeIdGenerator {
    existing_ids: HashSet<String>,
}

impl EdgeIdGenerator {
    /// Create a generator that knows no ids yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: impl Into<String>) {
        self.existing_ids.insert(id.into());
    }

    /// Forget an id (after its edge is deleted)
    pub fn release_id(&mut self, id: &str) {
        self.existing_ids.remove(id);
    }

    /// Generate a new unique edge id
    ///
    /// # Errors
    ///
    /// Returns an error if every nonce produced a colliding id.
    pub fn generate(
        &mut self,
        task_id: &str,
        depends_on_task_id: &str,
        created_by: &str,
    ) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        for nonce in 0..MAX_NONCE {
            let content = format!(
                "{}|{}|{}|{}|{}",
                task_id, depends_on_task_id, created_by, timestamp, nonce
            );
            let id = format!("{}-{}", EDGE_ID_PREFIX, hash_base36(&content));

            if self.existing_ids.insert(id.clone()) {
                if nonce > 0 {
                    debug!(nonce, "Generated unique edge ID after collision retries");
                }
                return Ok(id);
            }
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE,
        })
    }
}

/// SHA256 the content and render the first 8 digest bytes in base36.
fn hash_base36(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());

    let mut num: u64 = 0;
    for &byte in &digest[..8] {
        num = num.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut chars = Vec::with_capacity(EDGE_HASH_LENGTH);
    while chars.len() < EDGE_HASH_LENGTH {
        chars.push(char::from(BASE36_CHARS[(num % 36) as usize]));
        num /= 36;
    }
    chars.iter().rev().collect()
}

/// Check that `id` looks like an edge id produced by this module
pub fn is_edge_id(id: &str) -> bool {
    id.strip_prefix(EDGE_ID_PREFIX)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hash| {
            hash.len() == EDGE_HASH_LENGTH
                && hash
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        })
}
