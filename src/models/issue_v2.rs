//! Issue model for the REST issues API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::SnykClient;
use crate::error::Result;
use crate::models::issue::{Issue, IssueBinding, ProjectIssuesService};
use crate::pagination::fetch_all;
use crate::params::QueryParams;
use crate::resource::{null_as_default, Resource, ResourceRef};
use crate::traits::List;

const ISSUES_API_VERSION: &str = "2024-05-23~beta";

/// An issue from the REST issues API.
///
/// Ignore management is only available through the v1 API; the ignore
/// operations on this type go through [`IssueV2::to_issue_v1`].
#[derive(Debug, Clone, Serialize)]
pub struct IssueV2 {
    pub id: String,
    /// Stable issue key shared with the v1 API (e.g. `SNYK-JS-LODASH-567746`).
    pub key: String,
    pub title: String,
    pub status: String,
    pub effective_severity_level: String,
    pub ignored: bool,
    /// `"package_vulnerability"`, `"license"`, `"code"`, ...
    #[serde(rename = "type")]
    pub issue_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub classes: Vec<ResourceRef>,
    pub problems: Vec<ResourceRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// From the `organization` relationship.
    pub org_id: String,
    /// From the `scan_item` relationship; empty when the issue has none.
    pub project_id: String,
    #[serde(skip)]
    pub(crate) client: SnykClient,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolution {
    #[serde(deserialize_with = "null_as_default")]
    pub details: String,
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub resolution_type: String,
}

/// Attributes of an `issue` record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IssueV2Attributes {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub effective_severity_level: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ignored: bool,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub issue_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub classes: Vec<ResourceRef>,
    #[serde(deserialize_with = "null_as_default")]
    pub problems: Vec<ResourceRef>,
    pub resolution: Option<Resolution>,
}

impl IssueV2 {
    pub fn from_resource(resource: Resource<IssueV2Attributes>, client: &SnykClient) -> Self {
        let org_id = resource.related_id("organization").unwrap_or_default().to_string();
        let project_id = resource.related_id("scan_item").unwrap_or_default().to_string();
        let attrs = resource.attributes;

        Self {
            id: resource.id,
            key: attrs.key,
            title: attrs.title,
            status: attrs.status,
            effective_severity_level: attrs.effective_severity_level,
            ignored: attrs.ignored,
            issue_type: attrs.issue_type,
            created_at: attrs.created_at,
            updated_at: attrs.updated_at,
            classes: attrs.classes,
            problems: attrs.problems,
            resolution: attrs.resolution,
            org_id,
            project_id,
            client: client.clone(),
        }
    }

    /// Downgrade to the v1 [`Issue`] type so v1-only operations can be used.
    ///
    /// This is lossy: only the key (as the v1 ID), type, ignored flag and
    /// the org/project context carry over. Every other v1 field is left at
    /// its default. An issue without both an org and a project stays
    /// unbound, so its v1 operations return [`SnykError::Unsupported`].
    ///
    /// [`SnykError::Unsupported`]: crate::SnykError::Unsupported
    pub fn to_issue_v1(&self) -> Issue {
        let issue = Issue {
            id: self.key.clone(),
            issue_type: self.issue_type.clone(),
            is_ignored: self.ignored,
            ..Default::default()
        };
        if self.org_id.is_empty() || self.project_id.is_empty() {
            return issue;
        }
        issue.bind(IssueBinding {
            client: self.client.clone(),
            org_id: self.org_id.clone(),
            project_id: self.project_id.clone(),
            project_origin: String::new(),
        })
    }
}

async fn list_issues_v2(
    client: &SnykClient,
    org_id: &str,
    project_id: Option<&str>,
) -> Result<Vec<IssueV2>> {
    let path = format!("/rest/orgs/{org_id}/issues");
    let mut params = QueryParams::new().with("version", ISSUES_API_VERSION);
    if let Some(project_id) = project_id {
        params.set("scan_item.type", "project");
        params.set("scan_item.id", project_id);
    }

    let resources = fetch_all::<IssueV2Attributes>(client, &path, Some(&params)).await?;
    Ok(resources
        .into_iter()
        .map(|r| IssueV2::from_resource(r, client))
        .collect())
}

/// Service handle for the issues of one org (REST API).
#[derive(Debug, Clone)]
pub struct OrgIssuesService {
    client: SnykClient,
    org_id: String,
}

impl OrgIssuesService {
    pub(crate) fn new(client: SnykClient, org_id: &str) -> Self {
        Self {
            client,
            org_id: org_id.to_string(),
        }
    }
}

#[async_trait]
impl List for OrgIssuesService {
    type Output = IssueV2;

    #[tracing::instrument(skip(self), fields(org = %self.org_id))]
    async fn list_all(&self) -> Result<Vec<IssueV2>> {
        list_issues_v2(&self.client, &self.org_id, None).await
    }
}

impl ProjectIssuesService {
    /// List the project's issues through the REST API.
    #[tracing::instrument(skip(self), fields(project = %self.project_id))]
    pub async fn list_all_v2(&self) -> Result<Vec<IssueV2>> {
        list_issues_v2(&self.client, &self.org_id, Some(&self.project_id)).await
    }
}
