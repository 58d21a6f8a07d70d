//! User model and service.
//!
//! Users come from the v1 group members endpoint, which returns a plain
//! JSON array rather than a resource envelope.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::SnykClient;
use crate::error::Result;
use crate::traits::List;

/// A member of a Snyk group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Orgs the user belongs to, with their role in each.
    #[serde(default)]
    pub orgs: Vec<UserOrg>,
    #[serde(default)]
    pub group_role: String,
}

/// A user's membership in one org.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOrg {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Service handle for the members of one group.
#[derive(Debug, Clone)]
pub struct UsersService {
    client: SnykClient,
    group_id: String,
}

impl UsersService {
    pub(crate) fn new(client: SnykClient, group_id: &str) -> Self {
        Self {
            client,
            group_id: group_id.to_string(),
        }
    }
}

#[async_trait]
impl List for UsersService {
    type Output = User;

    /// List every member of the group.
    ///
    /// This endpoint is limited to one request per minute; the client's
    /// `Retry-After` handling covers it.
    #[tracing::instrument(skip(self), fields(group = %self.group_id))]
    async fn list_all(&self) -> Result<Vec<User>> {
        let path = format!("/v1/group/{}/members", self.group_id);
        let response = self.client.get(&path, None).await?;
        SnykClient::json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialize() {
        let json = r#"[{
            "id": "u1",
            "name": "Ada",
            "username": "ada",
            "email": "ada@example.com",
            "orgs": [{"name": "org1", "role": "admin"}],
            "groupRole": "viewer"
        }]"#;

        let users: Vec<User> = serde_json::from_str(json).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "ada@example.com");
        assert_eq!(users[0].orgs[0].role, "admin");
        assert_eq!(users[0].group_role, "viewer");
    }
}
