//! Group model and service.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::SnykClient;
use crate::error::Result;
use crate::models::org::Org;
use crate::models::user::{User, UsersService};
use crate::pagination::fetch_all;
use crate::resource::{fetch_one, Resource};
use crate::traits::{Get, List};

/// A Snyk group, the parent of a set of orgs.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    client: SnykClient,
}

/// Attributes of a `group` record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroupAttributes {
    pub name: String,
}

impl Group {
    pub fn from_resource(resource: Resource<GroupAttributes>, client: &SnykClient) -> Self {
        Self {
            id: resource.id,
            name: resource.attributes.name,
            client: client.clone(),
        }
    }

    /// Members of this group.
    pub fn users(&self) -> UsersService {
        UsersService::new(self.client.clone(), &self.id)
    }

    /// Add `user` to `org` with `role` (`"admin"` or `"collaborator"`).
    #[tracing::instrument(skip(self, org, user), fields(group = %self.id, org = %org.id, user = %user.id))]
    pub async fn add_user_to_org(&self, org: &Org, user: &User, role: &str) -> Result<()> {
        let path = format!("/v1/group/{}/org/{}/members", self.id, org.id);
        let body = HashMap::from([("userId", user.id.as_str()), ("role", role)]);
        self.client.post(&path, None, Some(&body)).await?;
        Ok(())
    }
}

/// Service handle for group endpoints.
#[derive(Debug, Clone)]
pub struct GroupsService {
    client: SnykClient,
}

impl GroupsService {
    pub(crate) fn new(client: SnykClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl List for GroupsService {
    type Output = Group;

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Group>> {
        let resources = fetch_all::<GroupAttributes>(&self.client, "/rest/groups", None).await?;
        Ok(resources
            .into_iter()
            .map(|r| Group::from_resource(r, &self.client))
            .collect())
    }
}

#[async_trait]
impl Get for GroupsService {
    type Id = String;
    type Output = Group;

    #[tracing::instrument(skip(self))]
    async fn get(&self, group_id: String) -> Result<Group> {
        let path = format!("/rest/groups/{}", urlencoding::encode(&group_id));
        let resource = fetch_one::<GroupAttributes>(&self.client, &path, None).await?;
        Ok(Group::from_resource(resource, &self.client))
    }
}
