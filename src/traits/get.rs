//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::error::Result;

/// Fetch a single entity by ID.
///
/// Implemented by service handles, which already carry the client and
/// any ancestor IDs the request path needs.
///
/// # Example
///
/// ```ignore
/// use snykapi::{Get, SnykClient};
///
/// let client = SnykClient::from_env()?;
/// let org = client.orgs().get("my-org-slug".to_string()).await?;
/// let project = org.projects().get(project_id).await?;
/// ```
#[async_trait]
pub trait Get {
    /// The ID type for this entity.
    type Id: Send;

    /// The entity returned.
    type Output;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get(&self, id: Self::Id) -> Result<Self::Output>;
}
