//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::error::Result;

/// List every entity a service handle can reach.
///
/// REST collections are paginated by cursor; implementations follow every
/// `next` link before returning, so the result is always complete.
///
/// # Example
///
/// ```ignore
/// use snykapi::{List, SnykClient};
///
/// let client = SnykClient::from_env()?;
/// for org in client.orgs().list_all().await? {
///     let projects = org.projects().list_all().await?;
///     println!("{}: {} projects", org.name, projects.len());
/// }
/// ```
#[async_trait]
pub trait List {
    /// The entity returned.
    type Output: Send;

    /// List all entities (fetches all pages).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(&self) -> Result<Vec<Self::Output>>;
}
