//! Project model and service.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::SnykClient;
use crate::error::Result;
use crate::models::issue::ProjectIssuesService;
use crate::pagination::fetch_all;
use crate::params::QueryParams;
use crate::resource::{fetch_one, null_as_default, Relationship, Resource, ResourceMeta};
use crate::traits::{Get, List};

/// A Snyk project.
///
/// A project is one scanned manifest, image or code base inside an org.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,

    /// Project type (e.g. "npm", "dockerfile", "sast").
    #[serde(rename = "type")]
    pub project_type: String,

    pub target_file: String,
    pub target_reference: String,

    /// How the project was imported (e.g. "github", "cli").
    pub origin: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    pub status: String,
    pub business_criticality: Vec<String>,
    pub environment: Vec<String>,
    pub lifecycle: Vec<String>,
    pub tags: Vec<Tag>,
    pub read_only: bool,
    pub meta: ResourceMeta,
    pub relationships: HashMap<String, Relationship>,

    org_id: String,
    #[serde(skip)]
    client: SnykClient,
}

/// A key/value project tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Attributes of a `project` record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectAttributes {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub project_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_file: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_reference: String,
    #[serde(deserialize_with = "null_as_default")]
    pub origin: String,
    pub created: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub business_criticality: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub environment: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub lifecycle: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(deserialize_with = "null_as_default")]
    pub read_only: bool,
}

/// Broad product area a project belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Container,
    Iac,
    Sast,
    OpenSource,
}

impl std::fmt::Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Container => "container",
            Self::Iac => "iac",
            Self::Sast => "sast",
            Self::OpenSource => "opensource",
        };
        f.write_str(name)
    }
}

impl Project {
    pub fn from_resource(
        resource: Resource<ProjectAttributes>,
        client: &SnykClient,
        org_id: &str,
    ) -> Self {
        let attrs = resource.attributes;
        Self {
            id: resource.id,
            name: attrs.name,
            project_type: attrs.project_type,
            target_file: attrs.target_file,
            target_reference: attrs.target_reference,
            origin: attrs.origin,
            created: attrs.created,
            status: attrs.status,
            business_criticality: attrs.business_criticality,
            environment: attrs.environment,
            lifecycle: attrs.lifecycle,
            tags: attrs.tags,
            read_only: attrs.read_only,
            meta: resource.meta,
            relationships: resource.relationships,
            org_id: org_id.to_string(),
            client: client.clone(),
        }
    }

    /// ID of the org that owns this project.
    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// Issues of this project.
    pub fn issues(&self) -> ProjectIssuesService {
        ProjectIssuesService::new(self.client.clone(), &self.org_id, &self.id, &self.origin)
    }

    /// Classify the project by its type.
    pub fn scan_type(&self) -> ScanType {
        match self.project_type.as_str() {
            "deb" | "linux" | "dockerfile" | "rpm" | "apk" => ScanType::Container,
            "k8sconfig" | "helmconfig" | "terraformconfig" | "armconfig"
            | "cloudformationconfig" | "cloudconfig" => ScanType::Iac,
            "sast" => ScanType::Sast,
            _ => ScanType::OpenSource,
        }
    }

    /// Delete the project.
    #[tracing::instrument(skip(self), fields(project = %self.id))]
    pub async fn delete(&self) -> Result<()> {
        let path = format!("/v1/org/{}/project/{}", self.org_id, self.id);
        self.client.delete(&path, None).await?;
        Ok(())
    }

    /// Stop monitoring the project without deleting it.
    #[tracing::instrument(skip(self), fields(project = %self.id))]
    pub async fn deactivate(&self) -> Result<()> {
        let path = format!("/v1/org/{}/project/{}/deactivate", self.org_id, self.id);
        self.client.post::<()>(&path, None, None).await?;
        Ok(())
    }

    /// Move the project to another org.
    #[tracing::instrument(skip(self), fields(project = %self.id))]
    pub async fn move_to(&self, target_org_id: &str) -> Result<()> {
        let path = format!("/v1/org/{}/project/{}/move", self.org_id, self.id);
        let body = HashMap::from([("targetOrgId", target_org_id)]);
        self.client.put(&path, &body).await?;
        Ok(())
    }
}

/// Service handle for the projects of one org.
#[derive(Debug, Clone)]
pub struct ProjectsService {
    client: SnykClient,
    org_id: String,
}

impl ProjectsService {
    pub(crate) fn new(client: SnykClient, org_id: &str) -> Self {
        Self {
            client,
            org_id: org_id.to_string(),
        }
    }
}

#[async_trait]
impl List for ProjectsService {
    type Output = Project;

    /// List all projects, including latest dependency and issue counts.
    #[tracing::instrument(skip(self), fields(org = %self.org_id))]
    async fn list_all(&self) -> Result<Vec<Project>> {
        let path = format!("/rest/orgs/{}/projects", self.org_id);
        let params = QueryParams::new()
            .with("meta.latest_dependency_total", "true")
            .with("meta.latest_issue_counts", "true");

        let resources = fetch_all::<ProjectAttributes>(&self.client, &path, Some(&params)).await?;
        Ok(resources
            .into_iter()
            .map(|r| Project::from_resource(r, &self.client, &self.org_id))
            .collect())
    }
}

#[async_trait]
impl Get for ProjectsService {
    type Id = String;
    type Output = Project;

    #[tracing::instrument(skip(self), fields(org = %self.org_id))]
    async fn get(&self, id: String) -> Result<Project> {
        let path = format!("/rest/orgs/{}/projects/{}", self.org_id, urlencoding::encode(&id));
        let resource = fetch_one::<ProjectAttributes>(&self.client, &path, None).await?;
        Ok(Project::from_resource(resource, &self.client, &self.org_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::SingleEnvelope;

    fn project_of_type(project_type: &str) -> Project {
        let client = SnykClient::new("token").unwrap();
        let resource: Resource<ProjectAttributes> = serde_json::from_value(serde_json::json!({
            "type": "project",
            "id": "p1",
            "attributes": {"name": "acme/app", "type": project_type}
        }))
        .unwrap();
        Project::from_resource(resource, &client, "o1")
    }

    #[test]
    fn test_scan_type() {
        assert_eq!(project_of_type("dockerfile").scan_type(), ScanType::Container);
        assert_eq!(project_of_type("apk").scan_type(), ScanType::Container);
        assert_eq!(project_of_type("helmconfig").scan_type(), ScanType::Iac);
        assert_eq!(project_of_type("cloudconfig").scan_type(), ScanType::Iac);
        assert_eq!(project_of_type("sast").scan_type(), ScanType::Sast);
        assert_eq!(project_of_type("npm").scan_type(), ScanType::OpenSource);
        assert_eq!(ScanType::OpenSource.to_string(), "opensource");
    }

    #[test]
    fn test_null_attributes_take_zero_value() {
        let client = SnykClient::new("token").unwrap();
        let resource: Resource<ProjectAttributes> = serde_json::from_value(serde_json::json!({
            "type": "project",
            "id": "p1",
            "attributes": {
                "name": "acme/app",
                "target_reference": null,
                "target_file": null,
                "tags": null,
                "read_only": null
            }
        }))
        .unwrap();
        let project = Project::from_resource(resource, &client, "o1");

        assert_eq!(project.name, "acme/app");
        assert_eq!(project.target_reference, "");
        assert_eq!(project.target_file, "");
        assert!(project.tags.is_empty());
        assert!(!project.read_only);
    }

    #[test]
    fn test_project_from_resource() {
        let json = r#"{
            "data": {
                "type": "project",
                "id": "331ede0a-de94-456f-b788-166caeca58bf",
                "attributes": {
                    "name": "snyk/goof",
                    "type": "maven",
                    "target_file": "package.json",
                    "target_reference": "main",
                    "origin": "github",
                    "created": "2021-05-29T09:50:54.014Z",
                    "status": "active",
                    "business_criticality": ["high"],
                    "environment": ["external", "hosted"],
                    "lifecycle": ["production"],
                    "tags": [{"key": "tag-key", "value": "tag-value"}],
                    "read_only": false,
                    "settings": {"recurring_tests": {"frequency": "daily"}}
                },
                "relationships": {
                    "target": {"data": {"id": "t-1", "type": "target"}}
                },
                "meta": {
                    "latest_dependency_total": {"total": 42, "updated_at": "2021-05-29T09:50:54.014Z"}
                }
            }
        }"#;

        let client = SnykClient::new("token").unwrap();
        let envelope: SingleEnvelope<ProjectAttributes> = serde_json::from_str(json).unwrap();
        let project = Project::from_resource(envelope.data, &client, "org-1");

        assert_eq!(project.name, "snyk/goof");
        assert_eq!(project.project_type, "maven");
        assert_eq!(project.origin, "github");
        assert_eq!(project.environment, vec!["external", "hosted"]);
        assert_eq!(project.tags[0].key, "tag-key");
        assert!(project.created.is_some());
        assert_eq!(project.meta.latest_dependency_total.as_ref().map(|d| d.total), Some(42));
        assert_eq!(project.relationships["target"].data.id, "t-1");
        assert_eq!(project.org_id(), "org-1");
    }

    #[test]
    fn test_project_missing_attributes_are_empty() {
        let project = project_of_type("npm");
        assert!(project.created.is_none());
        assert!(project.tags.is_empty());
        assert!(!project.read_only);
        assert_eq!(project.status, "");
    }
}
