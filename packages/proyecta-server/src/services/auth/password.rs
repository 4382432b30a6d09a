use crate::error::AppError;
use bcrypt::{hash, verify};
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;
use tracing::error;

const DECOY_PASSWORD: &str = "decoy-password-never-issued";

/// bcrypt hashing with a configurable work factor.
///
/// Both operations run on the blocking pool so a slow hash never stalls the
/// request executor.
#[derive(Debug, Clone)]
pub(crate) struct PasswordHasher {
    cost: u32,
    // Hashed on first use, at the same cost as real accounts.
    decoy: Arc<OnceCell<String>>,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl PasswordHasher {
    pub(crate) fn new(cost: u32) -> Self {
        Self {
            cost,
            decoy: Arc::new(OnceCell::new()),
            #[cfg(test)]
            verifications: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                AppError::Internal("failed to process password".to_string())
            })
    }

    pub(crate) async fn verify(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("password verification task failed: {e}")))?
            .map_err(|e| {
                error!("Failed to verify password: {}", e);
                AppError::Internal("failed to verify password".to_string())
            })
    }

    /// Runs a full verification against a decoy hash and discards the result.
    ///
    /// Used when no account matches, so that path costs as much as a wrong
    /// password.
    pub(crate) async fn verify_decoy(&self, password: &str) -> Result<(), AppError> {
        let decoy = self
            .decoy
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))
            .await?;
        self.verify(password, decoy).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}
