//! Target model and service.
//!
//! A target is the repository, image or CLI upload that one or more
//! projects were created from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::SnykClient;
use crate::error::Result;
use crate::pagination::fetch_all;
use crate::params::QueryParams;
use crate::resource::{fetch_one, null_as_default, Resource};
use crate::traits::{Get, List};

/// API version the targets endpoints are pinned to.
const TARGETS_API_VERSION: &str = "2024-01-23~beta";

/// A scan target in an org.
#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub id: String,
    pub display_name: String,
    pub origin: String,
    pub remote_url: String,
    pub is_private: bool,
    org_id: String,
    #[serde(skip)]
    client: SnykClient,
}

/// Attributes of a `target` record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TargetAttributes {
    #[serde(rename = "displayName", alias = "display_name", deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub origin: String,
    #[serde(rename = "remoteUrl", alias = "url", deserialize_with = "null_as_default")]
    pub remote_url: String,
    #[serde(rename = "isPrivate", alias = "is_private", deserialize_with = "null_as_default")]
    pub is_private: bool,
}

impl Target {
    pub fn from_resource(
        resource: Resource<TargetAttributes>,
        client: &SnykClient,
        org_id: &str,
    ) -> Self {
        Self {
            id: resource.id,
            display_name: resource.attributes.display_name,
            origin: resource.attributes.origin,
            remote_url: resource.attributes.remote_url,
            is_private: resource.attributes.is_private,
            org_id: org_id.to_string(),
            client: client.clone(),
        }
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// Delete the target and every project created from it.
    #[tracing::instrument(skip(self), fields(target = %self.id))]
    pub async fn delete(&self) -> Result<()> {
        let path = format!("/rest/orgs/{}/targets/{}", self.org_id, self.id);
        let params = QueryParams::new().with("version", TARGETS_API_VERSION);
        self.client.delete(&path, Some(&params)).await?;
        Ok(())
    }
}

/// Service handle for the targets of one org.
#[derive(Debug, Clone)]
pub struct TargetsService {
    client: SnykClient,
    org_id: String,
}

impl TargetsService {
    pub(crate) fn new(client: SnykClient, org_id: &str) -> Self {
        Self {
            client,
            org_id: org_id.to_string(),
        }
    }

    fn collection_path(&self) -> String {
        format!("/rest/orgs/{}/targets", self.org_id)
    }

    async fn list_with(&self, params: &QueryParams) -> Result<Vec<Target>> {
        let resources =
            fetch_all::<TargetAttributes>(&self.client, &self.collection_path(), Some(params)).await?;
        Ok(resources
            .into_iter()
            .map(|r| Target::from_resource(r, &self.client, &self.org_id))
            .collect())
    }

    /// Targets whose remote URL matches `remote_url`.
    #[tracing::instrument(skip(self), fields(org = %self.org_id))]
    pub async fn get_by_remote_url(&self, remote_url: &str) -> Result<Vec<Target>> {
        let params = QueryParams::new().with("remoteUrl", remote_url);
        self.list_with(&params).await
    }
}

#[async_trait]
impl List for TargetsService {
    type Output = Target;

    /// List all targets, including those without projects.
    #[tracing::instrument(skip(self), fields(org = %self.org_id))]
    async fn list_all(&self) -> Result<Vec<Target>> {
        let params = QueryParams::new()
            .with("version", TARGETS_API_VERSION)
            .with("excludeEmpty", "false");
        self.list_with(&params).await
    }
}

#[async_trait]
impl Get for TargetsService {
    type Id = String;
    type Output = Target;

    #[tracing::instrument(skip(self), fields(org = %self.org_id))]
    async fn get(&self, id: String) -> Result<Target> {
        let path = format!("{}/{}", self.collection_path(), urlencoding::encode(&id));
        let resource = fetch_one::<TargetAttributes>(&self.client, &path, None).await?;
        Ok(Target::from_resource(resource, &self.client, &self.org_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_attributes_camel_case() {
        let attrs: TargetAttributes = serde_json::from_value(serde_json::json!({
            "displayName": "snyk/goof",
            "origin": "github",
            "remoteUrl": "http://github.com/snyk/goof",
            "isPrivate": true
        }))
        .unwrap();

        assert_eq!(attrs.display_name, "snyk/goof");
        assert_eq!(attrs.remote_url, "http://github.com/snyk/goof");
        assert!(attrs.is_private);
    }

    #[test]
    fn test_target_attributes_snake_case_alias() {
        let attrs: TargetAttributes = serde_json::from_value(serde_json::json!({
            "display_name": "snyk/goof",
            "url": "http://github.com/snyk/goof",
            "is_private": false
        }))
        .unwrap();

        assert_eq!(attrs.display_name, "snyk/goof");
        assert_eq!(attrs.remote_url, "http://github.com/snyk/goof");
        assert_eq!(attrs.origin, "");
    }
}
