//! Issue model for the v1 aggregated issues API.
//!
//! Issues represent vulnerabilities and license problems found in a
//! project's dependencies. The v1 API returns them as plain JSON rather
//! than resource records; see [`IssueV2`](crate::IssueV2) for the REST
//! representation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::SnykClient;
use crate::error::{Result, SnykError};
use crate::models::ignore::IgnoredBy;
use crate::params::QueryParams;
use crate::traits::List;

/// An issue in a Snyk project (v1 API).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Issue {
    /// Issue identifier, e.g. `SNYK-JS-LODASH-567746`.
    pub id: String,
    /// `"vuln"`, `"license"`, ...
    pub issue_type: String,
    pub pkg_name: String,
    pub pkg_versions: Vec<String>,
    pub priority_score: i64,
    pub priority: Priority,
    pub issue_data: IssueData,
    pub is_patched: bool,
    pub is_ignored: bool,
    pub ignore_reasons: Vec<IgnoreReason>,
    pub fix_info: FixInfo,
    pub links: IssueLinks,
    #[serde(skip)]
    pub(crate) binding: Option<IssueBinding>,
}

/// The project an issue was listed from, and the client to reach it.
#[derive(Debug, Clone)]
pub(crate) struct IssueBinding {
    pub(crate) client: SnykClient,
    pub(crate) org_id: String,
    pub(crate) project_id: String,
    pub(crate) project_origin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Priority {
    pub score: i64,
    pub factors: Vec<PriorityFactor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityFactor {
    pub name: String,
    pub description: String,
}

/// Vulnerability or license details of an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueData {
    pub id: String,
    pub title: String,
    pub severity: String,
    pub url: String,
    pub description: String,
    pub identifiers: IssueIdentifiers,
    pub credit: Vec<String>,
    pub exploit_maturity: String,
    /// Vulnerable version ranges; the shape varies by ecosystem.
    pub semver: serde_json::Value,
    pub publication_time: Option<DateTime<Utc>>,
    pub disclosure_time: Option<DateTime<Utc>>,
    #[serde(rename = "CVSSv3")]
    pub cvss_v3: String,
    pub cvss_score: Option<f64>,
    pub language: String,
    pub patches: Vec<Patch>,
    pub nearest_fixed_in_version: String,
    pub is_malicious_package: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueIdentifiers {
    #[serde(rename = "CVE")]
    pub cve: Vec<String>,
    #[serde(rename = "CWE")]
    pub cwe: Vec<String>,
    #[serde(rename = "GHSA")]
    pub ghsa: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Patch {
    pub id: String,
    pub urls: Vec<String>,
    pub version: String,
    pub comments: Vec<String>,
    pub modification_time: Option<DateTime<Utc>>,
}

/// Why (and by whom) an issue was ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IgnoreReason {
    pub path: Vec<String>,
    pub reason: String,
    pub source: String,
    pub ignored_by: IgnoredBy,
    pub reason_type: String,
    pub disregard_if_fixable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixInfo {
    pub is_upgradable: bool,
    pub is_pinnable: bool,
    pub is_patchable: bool,
    pub is_fixable: bool,
    pub is_partially_fixable: bool,
    pub nearest_fixed_in_version: String,
    pub fixed_in: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueLinks {
    pub paths: String,
}

impl Issue {
    /// Bind a decoded issue to the project it was listed from.
    pub(crate) fn bind(mut self, binding: IssueBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub(crate) fn binding(&self) -> Result<&IssueBinding> {
        self.binding.as_ref().ok_or_else(|| {
            SnykError::Unsupported(format!("issue '{}' is not bound to a project", self.id))
        })
    }

    /// ID of the org the issue was listed from.
    pub fn org_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.org_id.as_str())
    }

    /// ID of the project the issue was listed from.
    pub fn project_id(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.project_id.as_str())
    }

    /// Origin of the project the issue was listed from.
    pub fn project_origin(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.project_origin.as_str())
    }
}

/// Service handle for the issues of one project.
#[derive(Debug, Clone)]
pub struct ProjectIssuesService {
    pub(crate) client: SnykClient,
    pub(crate) org_id: String,
    pub(crate) project_id: String,
    project_origin: String,
}

impl ProjectIssuesService {
    pub(crate) fn new(client: SnykClient, org_id: &str, project_id: &str, origin: &str) -> Self {
        Self {
            client,
            org_id: org_id.to_string(),
            project_id: project_id.to_string(),
            project_origin: origin.to_string(),
        }
    }

    fn binding(&self) -> IssueBinding {
        IssueBinding {
            client: self.client.clone(),
            org_id: self.org_id.clone(),
            project_id: self.project_id.clone(),
            project_origin: self.project_origin.clone(),
        }
    }
}

#[async_trait]
impl List for ProjectIssuesService {
    type Output = Issue;

    /// List the project's aggregated issues (v1 API).
    #[tracing::instrument(skip(self), fields(project = %self.project_id))]
    async fn list_all(&self) -> Result<Vec<Issue>> {
        #[derive(Deserialize)]
        struct IssuesResponse {
            #[serde(default)]
            issues: Vec<Issue>,
        }

        let path = format!(
            "/v1/org/{}/project/{}/aggregated-issues",
            self.org_id, self.project_id
        );
        let params = QueryParams::new()
            .with("includeIntroducedThrough", "true")
            .with("includeDescription", "true");

        let response = self.client.post::<()>(&path, Some(&params), None).await?;
        let body: IssuesResponse = SnykClient::json(response).await?;

        Ok(body
            .issues
            .into_iter()
            .map(|issue| issue.bind(self.binding()))
            .collect())
    }
}
