use crate::{error, management::TokenManager, success};

/// Destroys the persisted session. All tokens live in the local cache only,
/// so this is the entire logout story.
pub async fn logout() {
    match TokenManager::reset().await {
        Ok(()) => success!("Logged out; cached session removed."),
        Err(e) => error!("Failed to remove cached session: {}", e),
    }
}
