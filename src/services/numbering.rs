use crate::config::NumberingSettings;
use crate::error::Result;
use crate::repositories::TransactionRepository;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generates transaction numbers of the form `PREFIX-XXXXXXXXXXXX` from a
/// SHA-256 digest over a fresh UUID and the current timestamp. Uniqueness is
/// still checked against the store; on the (vanishing) chance of a collision
/// generation retries until the number is unique.
#[derive(Debug, Clone)]
pub struct TransactionNumberGenerator {
    prefix: String,
}

impl TransactionNumberGenerator {
    pub fn new(settings: &NumberingSettings) -> Self {
        Self {
            prefix: settings.prefix.clone(),
        }
    }

    fn generate(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
        let digest = hasher.finalize();
        format!("{}-{}", self.prefix, hex::encode(&digest[..6]).to_uppercase())
    }

    /// Returns a number that does not yet exist in the repository.
    pub async fn next_unique(&self, transactions: &TransactionRepository) -> Result<String> {
        loop {
            let candidate = self.generate();
            if !transactions.exists_by_number(&candidate).await {
                return Ok(candidate);
            }
        }
    }
}
