//! Organization model and service.

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::client::SnykClient;
use crate::error::{Result, SnykError};
use crate::models::container_image::ContainerImagesService;
use crate::models::issue_v2::OrgIssuesService;
use crate::models::project::ProjectsService;
use crate::models::target::TargetsService;
use crate::models::user::User;
use crate::pagination::fetch_all;
use crate::params::QueryParams;
use crate::resource::{fetch_one, Resource};
use crate::traits::{Get, List};

// The pattern is a literal; `test_is_uuid` compiles it.
static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("UUID pattern is valid")
});

/// Whether `value` is a hyphenated UUID.
pub(crate) fn is_uuid(value: &str) -> bool {
    UUID_PATTERN.is_match(value)
}

/// A Snyk organization.
///
/// Organizations own projects, targets, container images and issues; the
/// handles for those are available from [`Org::projects`] and friends.
#[derive(Debug, Clone, Serialize)]
pub struct Org {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// The owning group, when the API reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip)]
    client: SnykClient,
}

/// Attributes of an `org` record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrgAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub group_id: Option<String>,
}

impl Org {
    pub fn from_resource(resource: Resource<OrgAttributes>, client: &SnykClient) -> Self {
        Self {
            id: resource.id,
            name: resource.attributes.name,
            slug: resource.attributes.slug,
            group_id: resource.attributes.group_id.filter(|g| !g.is_empty()),
            client: client.clone(),
        }
    }

    pub fn projects(&self) -> ProjectsService {
        ProjectsService::new(self.client.clone(), &self.id)
    }

    pub fn targets(&self) -> TargetsService {
        TargetsService::new(self.client.clone(), &self.id)
    }

    pub fn container_images(&self) -> ContainerImagesService {
        ContainerImagesService::new(self.client.clone(), &self.id)
    }

    /// Issues across every project in the org (REST issues API).
    pub fn issues(&self) -> OrgIssuesService {
        OrgIssuesService::new(self.client.clone(), &self.id)
    }

    /// Set `user`'s role in this org.
    #[tracing::instrument(skip(self, user), fields(org = %self.id, user = %user.id))]
    pub async fn update_user_role(&self, user: &User, role_id: &str) -> Result<()> {
        let path = format!("/v1/org/{}/members/update/{}", self.id, user.id);
        let body = HashMap::from([("rolePublicId", role_id)]);
        self.client.put(&path, &body).await?;
        Ok(())
    }

    /// Fetch the org's settings.
    #[tracing::instrument(skip(self), fields(org = %self.id))]
    pub async fn settings(&self) -> Result<OrgSettings> {
        let path = format!("/v1/org/{}/settings", self.id);
        let response = self.client.get(&path, None).await?;
        SnykClient::json(response).await
    }

    #[tracing::instrument(skip(self, settings), fields(org = %self.id))]
    pub async fn update_settings(&self, settings: &OrgSettings) -> Result<()> {
        let path = format!("/v1/org/{}/settings", self.id);
        self.client.put(&path, settings).await?;
        Ok(())
    }

    /// Configured integrations, keyed by integration name with the
    /// integration ID as value.
    #[tracing::instrument(skip(self), fields(org = %self.id))]
    pub async fn integrations(&self) -> Result<HashMap<String, String>> {
        let path = format!("/v1/org/{}/integrations", self.id);
        let response = self.client.get(&path, None).await?;
        SnykClient::json(response).await
    }

    /// Clone an integration into another org and return the new
    /// integration's ID.
    #[tracing::instrument(skip(self), fields(org = %self.id))]
    pub async fn clone_integration(
        &self,
        integration_id: &str,
        destination_org_id: &str,
    ) -> Result<String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CloneResponse {
            new_integration_id: String,
        }

        let path = format!(
            "/v1/org/{}/integrations/{}/clone",
            self.id,
            urlencoding::encode(integration_id)
        );
        let body = HashMap::from([("destinationOrgPublicId", destination_org_id)]);
        let response = self.client.post(&path, None, Some(&body)).await?;
        let cloned: CloneResponse = SnykClient::json(response).await?;
        Ok(cloned.new_integration_id)
    }

    /// Import a repository through the given integration.
    #[tracing::instrument(skip(self, target), fields(org = %self.id))]
    pub async fn import_project(&self, integration_id: &str, target: &ImportTarget) -> Result<()> {
        let path = format!(
            "/v1/org/{}/integrations/{}/import",
            self.id,
            urlencoding::encode(integration_id)
        );
        self.client.post(&path, None, Some(target)).await?;
        Ok(())
    }
}

/// Configurable settings of an org.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgSettings {
    #[serde(default)]
    pub request_access: RequestAccess,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestAccess {
    /// Whether requesting access to the organization is enabled.
    #[serde(default)]
    pub enabled: bool,
}

/// A repository to import into an org.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTarget {
    pub target: ImportRepository,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ImportFile>,

    /// Comma-separated folder names to exclude from scanning (at most 10).
    /// `None` keeps the server default; an empty string excludes nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusion_globs: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportRepository {
    /// Repository owner (GitHub) or project ID (Azure Repos).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub owner: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub branch: String,
}

/// A manifest file to import, relative to the repository root.
#[derive(Debug, Clone, Serialize)]
pub struct ImportFile {
    pub path: String,
}

/// Service handle for organization endpoints.
#[derive(Debug, Clone)]
pub struct OrgsService {
    client: SnykClient,
}

impl OrgsService {
    pub(crate) fn new(client: SnykClient) -> Self {
        Self { client }
    }

    /// Create an org in a group, optionally copying settings from
    /// `source_org_id`.
    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        group_id: &str,
        name: &str,
        source_org_id: Option<&str>,
    ) -> Result<Org> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CreateRequest<'a> {
            name: &'a str,
            group_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            source_org_id: Option<&'a str>,
        }

        #[derive(Deserialize)]
        struct CreateResponse {
            id: String,
            #[serde(default)]
            name: String,
            #[serde(default)]
            slug: String,
        }

        let body = CreateRequest {
            name,
            group_id,
            source_org_id,
        };
        let response = self.client.post("/v1/org", None, Some(&body)).await?;
        let created: CreateResponse = SnykClient::json(response).await?;

        Ok(Org {
            id: created.id,
            name: created.name,
            slug: created.slug,
            group_id: Some(group_id.to_string()),
            client: self.client.clone(),
        })
    }
}

#[async_trait]
impl List for OrgsService {
    type Output = Org;

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Org>> {
        let resources = fetch_all::<OrgAttributes>(&self.client, "/rest/orgs", None).await?;
        Ok(resources
            .into_iter()
            .map(|r| Org::from_resource(r, &self.client))
            .collect())
    }
}

#[async_trait]
impl Get for OrgsService {
    /// An org UUID or slug.
    type Id = String;
    type Output = Org;

    /// Fetch an org by UUID, or by slug when `identifier` is not a UUID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, identifier: String) -> Result<Org> {
        if is_uuid(&identifier) {
            let path = format!("/rest/orgs/{identifier}");
            let resource = fetch_one::<OrgAttributes>(&self.client, &path, None).await?;
            return Ok(Org::from_resource(resource, &self.client));
        }

        let params = QueryParams::new().with("slug", identifier.as_str());
        let resources = fetch_all::<OrgAttributes>(&self.client, "/rest/orgs", Some(&params)).await?;

        resources
            .into_iter()
            .next()
            .map(|r| Org::from_resource(r, &self.client))
            .ok_or(SnykError::NotFound {
                entity_type: "Org",
                id: identifier,
            })
    }
}
