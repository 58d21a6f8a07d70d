//! Issue ignores (v1 API).
//!
//! The ignores endpoint returns one of two shapes depending on the
//! project:
//!
//! - keyed by path: `{"ISSUE-ID": [{"<path>": {ignore}}]}`
//! - flat: `{"ISSUE-ID": [{ignore}]}`
//!
//! Both are decoded into [`IgnoredIssues`]; for the path-keyed shape the
//! path is appended to each ignore's [`Ignore::path`].

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::SnykClient;
use crate::error::{Result, SnykError};
use crate::models::issue::{Issue, ProjectIssuesService};
use crate::models::issue_v2::IssueV2;

/// An ignore rule on an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ignore {
    pub reason: String,
    pub created: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub ignored_by: IgnoredBy,
    pub reason_type: String,
    pub disregard_if_fixable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<IgnorePath>,
}

/// The user who created an ignore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoredBy {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// One dependency path an ignore applies to (`"*"` for all paths).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnorePath {
    pub module: String,
}

/// Ignores grouped by issue ID.
pub type IgnoredIssues = BTreeMap<String, Vec<Ignore>>;

type IgnoredIssuesByPath = BTreeMap<String, Vec<BTreeMap<String, Ignore>>>;

fn flatten_by_path(by_path: IgnoredIssuesByPath) -> IgnoredIssues {
    by_path
        .into_iter()
        .map(|(issue_id, entries)| {
            let ignores = entries
                .into_iter()
                .flat_map(BTreeMap::into_iter)
                .map(|(module, mut ignore)| {
                    ignore.path.push(IgnorePath { module });
                    ignore
                })
                .collect();
            (issue_id, ignores)
        })
        .collect()
}

/// Decode an ignores response in either known shape.
///
/// # Errors
///
/// Returns [`SnykError::IgnoreParseError`] carrying both decode errors when
/// neither shape matches.
pub fn decode_ignored_issues(body: &[u8]) -> Result<IgnoredIssues> {
    let by_path_err = match serde_json::from_slice::<IgnoredIssuesByPath>(body) {
        Ok(by_path) => return Ok(flatten_by_path(by_path)),
        Err(e) => e,
    };

    serde_json::from_slice::<IgnoredIssues>(body).map_err(|flat_err| SnykError::IgnoreParseError {
        by_path: by_path_err,
        flat: flat_err,
    })
}

/// Classification of an ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IgnoreReasonType {
    NotVulnerable,
    WontFix,
    TemporaryIgnore,
}

impl IgnoreReasonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotVulnerable => "not-vulnerable",
            Self::WontFix => "wont-fix",
            Self::TemporaryIgnore => "temporary-ignore",
        }
    }
}

impl std::fmt::Display for IgnoreReasonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IgnoreReasonType {
    type Err = SnykError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "not-vulnerable" => Ok(Self::NotVulnerable),
            "wont-fix" => Ok(Self::WontFix),
            "temporary-ignore" => Ok(Self::TemporaryIgnore),
            other => Err(SnykError::ValidationError(format!(
                "reason type must be one of \"not-vulnerable\", \"wont-fix\", \"temporary-ignore\", got \"{other}\""
            ))),
        }
    }
}

/// How an issue should be ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreOptions {
    /// The path to ignore. The server treats an empty path as `*` (all paths).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ignore_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
    pub reason_type: IgnoreReasonType,
    /// Only ignore the issue while no upgrade or patch is available.
    pub disregard_if_fixable: bool,
    /// When the ignore stops applying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl IgnoreOptions {
    /// Options for the given reason type, applying to all paths.
    ///
    /// # Errors
    ///
    /// Returns [`SnykError::ValidationError`] if `reason_type` is not one of
    /// `not-vulnerable`, `wont-fix` or `temporary-ignore`.
    pub fn new(reason_type: &str) -> Result<Self> {
        Ok(Self {
            ignore_path: String::new(),
            reason: String::new(),
            reason_type: reason_type.parse()?,
            disregard_if_fixable: false,
            expires: None,
        })
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    #[must_use]
    pub fn ignore_path(mut self, path: impl Into<String>) -> Self {
        self.ignore_path = path.into();
        self
    }

    #[must_use]
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    #[must_use]
    pub fn disregard_if_fixable(mut self, disregard: bool) -> Self {
        self.disregard_if_fixable = disregard;
        self
    }
}

impl ProjectIssuesService {
    /// All ignored issues of the project.
    #[tracing::instrument(skip(self), fields(project = %self.project_id))]
    pub async fn ignored(&self) -> Result<IgnoredIssues> {
        let path = format!("/v1/org/{}/project/{}/ignores", self.org_id, self.project_id);
        let response = self.client.get(&path, None).await?;
        let body = response.bytes().await?;
        decode_ignored_issues(&body)
    }
}

impl Issue {
    fn ignore_path(&self) -> Result<(&SnykClient, String)> {
        let binding = self.binding()?;
        let path = format!(
            "/v1/org/{}/project/{}/ignore/{}",
            binding.org_id,
            binding.project_id,
            urlencoding::encode(&self.id)
        );
        Ok((&binding.client, path))
    }

    /// The ignore currently applied to this issue.
    #[tracing::instrument(skip(self), fields(issue = %self.id))]
    pub async fn ignore(&self) -> Result<Ignore> {
        let (client, path) = self.ignore_path()?;
        let response = client.get(&path, None).await?;
        SnykClient::json(response).await
    }

    /// Ignore this issue.
    #[tracing::instrument(skip(self, options), fields(issue = %self.id))]
    pub async fn add_ignore(&self, options: &IgnoreOptions) -> Result<()> {
        let (client, path) = self.ignore_path()?;
        client.post(&path, None, Some(options)).await?;
        Ok(())
    }

    /// Replace the existing ignore with a new one.
    #[tracing::instrument(skip(self, options), fields(issue = %self.id))]
    pub async fn replace_ignore(&self, options: &IgnoreOptions) -> Result<()> {
        let (client, path) = self.ignore_path()?;
        client.put(&path, options).await?;
        Ok(())
    }

    /// Remove every ignore on this issue.
    #[tracing::instrument(skip(self), fields(issue = %self.id))]
    pub async fn delete_ignore(&self) -> Result<()> {
        let (client, path) = self.ignore_path()?;
        client.delete(&path, None).await?;
        Ok(())
    }
}

impl IssueV2 {
    /// The ignore currently applied to this issue.
    pub async fn ignore(&self) -> Result<Ignore> {
        self.to_issue_v1().ignore().await
    }

    pub async fn add_ignore(&self, options: &IgnoreOptions) -> Result<()> {
        self.to_issue_v1().add_ignore(options).await
    }

    pub async fn replace_ignore(&self, options: &IgnoreOptions) -> Result<()> {
        self.to_issue_v1().replace_ignore(options).await
    }

    pub async fn delete_ignore(&self) -> Result<()> {
        self.to_issue_v1().delete_ignore().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BY_PATH: &str = r#"{
        "SNYK-JS-LODASH-567746": [
            {"*": {
                "reason": "not reachable",
                "created": "2024-02-01T10:00:00Z",
                "ignoredBy": {"id": "u1", "name": "Ada", "email": "ada@example.com"},
                "reasonType": "wont-fix",
                "disregardIfFixable": false
            }}
        ],
        "SNYK-JS-MINIMIST-559764": [
            {"express > minimist": {"reason": "dev only", "reasonType": "not-vulnerable",
                "disregardIfFixable": true}},
            {"*": {"reason": "temporary", "reasonType": "temporary-ignore",
                "expires": "2025-01-01T00:00:00Z"}}
        ]
    }"#;

    const FLAT: &str = r#"{
        "SNYK-JS-LODASH-567746": [
            {
                "reason": "not reachable",
                "created": "2024-02-01T10:00:00Z",
                "ignoredBy": {"id": "u1", "name": "Ada", "email": "ada@example.com"},
                "reasonType": "wont-fix",
                "disregardIfFixable": false,
                "path": [{"module": "*"}]
            }
        ],
        "SNYK-JS-MINIMIST-559764": [
            {"reason": "dev only", "reasonType": "not-vulnerable", "disregardIfFixable": true,
                "path": [{"module": "express > minimist"}]},
            {"reason": "temporary", "reasonType": "temporary-ignore",
                "expires": "2025-01-01T00:00:00Z", "path": [{"module": "*"}]}
        ]
    }"#;

    #[test]
    fn test_by_path_and_flat_shapes_agree() {
        let by_path = decode_ignored_issues(BY_PATH.as_bytes()).unwrap();
        let flat = decode_ignored_issues(FLAT.as_bytes()).unwrap();
        assert_eq!(by_path, flat);
        assert_eq!(by_path["SNYK-JS-MINIMIST-559764"].len(), 2);
        assert_eq!(by_path["SNYK-JS-LODASH-567746"][0].ignored_by.name, "Ada");
    }

    #[test]
    fn test_flat_shape_without_paths() {
        let json = r#"{"SNYK-1": [{"reason": "x", "reasonType": "wont-fix", "expires": null}]}"#;
        let ignored = decode_ignored_issues(json.as_bytes()).unwrap();
        assert!(ignored["SNYK-1"][0].path.is_empty());
        assert!(ignored["SNYK-1"][0].expires.is_none());
    }

    #[test]
    fn test_unknown_shape_reports_both_errors() {
        let err = decode_ignored_issues(br#"["not", "a", "map"]"#).unwrap_err();
        assert!(matches!(err, SnykError::IgnoreParseError { .. }));
    }

    #[test]
    fn test_reason_type_validation() {
        assert_eq!("wont-fix".parse::<IgnoreReasonType>().unwrap(), IgnoreReasonType::WontFix);
        let err = "because".parse::<IgnoreReasonType>().unwrap_err();
        assert!(matches!(err, SnykError::ValidationError(_)));
        assert!(IgnoreOptions::new("ignore-forever").is_err());
    }

    #[test]
    fn test_ignore_options_serialization() {
        let options = IgnoreOptions::new("temporary-ignore")
            .unwrap()
            .reason("waiting on upstream")
            .disregard_if_fixable(true);

        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            serde_json::json!({
                "reason": "waiting on upstream",
                "reasonType": "temporary-ignore",
                "disregardIfFixable": true
            })
        );
    }
}
