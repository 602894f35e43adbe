use crate::{error::Error, spotify::gateway::Gateway, types::UserProfile};

/// Returns the authenticated user's profile. The id drives playlist creation
/// (`POST /users/{id}/playlists`).
pub async fn current_user(gateway: &Gateway) -> Result<UserProfile, Error> {
    gateway.get_json("/me").await
}
