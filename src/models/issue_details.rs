//! Extended details for code issues.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnykError};
use crate::models::issue_v2::IssueV2;
use crate::params::QueryParams;
use crate::resource::{fetch_one, null_as_default, Resource};

const CODE_DETAILS_API_VERSION: &str = "2024-01-24~experimental";

/// Additional information about an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueDetails {
    pub id: String,
    /// The record type, e.g. `"code_issue"`.
    #[serde(rename = "type")]
    pub resource_type: String,
    pub issue_type: String,
    pub title: String,
    pub severity: String,
    pub cwe: Vec<String>,
    pub ignored: bool,
    pub fingerprint: String,
    pub fingerprint_version: String,
    pub primary_region: PrimaryRegion,
    pub priority_score: i64,
    pub priority_score_factors: Vec<String>,
    pub primary_file_path: String,
}

/// Source location of a code issue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrimaryRegion {
    #[serde(deserialize_with = "null_as_default")]
    pub start_line: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub end_line: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub start_column: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub end_column: u32,
}

/// Attributes of a `code_issue` record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueDetailsAttributes {
    #[serde(deserialize_with = "null_as_default")]
    pub issue_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cwe: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub ignored: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub fingerprint: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fingerprint_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub primary_region: PrimaryRegion,
    #[serde(deserialize_with = "null_as_default")]
    pub priority_score: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub priority_score_factors: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub primary_file_path: String,
}

impl IssueDetails {
    pub fn from_resource(resource: Resource<IssueDetailsAttributes>) -> Self {
        let attrs = resource.attributes;
        Self {
            id: resource.id,
            resource_type: resource.resource_type,
            issue_type: attrs.issue_type,
            title: attrs.title,
            severity: attrs.severity,
            cwe: attrs.cwe,
            ignored: attrs.ignored,
            fingerprint: attrs.fingerprint,
            fingerprint_version: attrs.fingerprint_version,
            primary_region: attrs.primary_region,
            priority_score: attrs.priority_score,
            priority_score_factors: attrs.priority_score_factors,
            primary_file_path: attrs.primary_file_path,
        }
    }
}

impl IssueV2 {
    /// Fetch extended details for this issue.
    ///
    /// # Errors
    ///
    /// Only code issues have details; other issue types return
    /// [`SnykError::Unsupported`] without making a request.
    #[tracing::instrument(skip(self), fields(issue = %self.key))]
    pub async fn details(&self) -> Result<IssueDetails> {
        if self.issue_type != "code" {
            return Err(SnykError::Unsupported(format!(
                "issue details are not available for issues of type '{}'",
                self.issue_type
            )));
        }

        let path = format!(
            "/rest/orgs/{}/issues/detail/code/{}",
            self.org_id,
            urlencoding::encode(&self.key)
        );
        let params = QueryParams::new()
            .with("version", CODE_DETAILS_API_VERSION)
            .with("project_id", self.project_id.as_str());

        let resource = fetch_one::<IssueDetailsAttributes>(&self.client, &path, Some(&params)).await?;
        Ok(IssueDetails::from_resource(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::SingleEnvelope;

    #[test]
    fn test_issue_details_from_resource() {
        let json = r#"{
            "data": {
                "type": "code_issue",
                "id": "6f1b1914-d1b7-4047-841d-84519e8e3edf",
                "attributes": {
                    "issueType": "code",
                    "title": "Use after free.",
                    "severity": "medium",
                    "cwe": ["CWE-416"],
                    "ignored": false,
                    "fingerprint": "57664a44.277c621c",
                    "fingerprintVersion": "1",
                    "primaryRegion": {"endLine": 3886, "endColumn": 36, "startLine": 3886, "startColumn": 31},
                    "priorityScore": 557,
                    "priorityScoreFactors": ["Found in multiple sources"],
                    "primaryFilePath": "ptload/src/ptldcli.c"
                }
            }
        }"#;

        let envelope: SingleEnvelope<IssueDetailsAttributes> = serde_json::from_str(json).unwrap();
        let details = IssueDetails::from_resource(envelope.data);

        assert_eq!(details.resource_type, "code_issue");
        assert_eq!(details.issue_type, "code");
        assert_eq!(details.cwe, vec!["CWE-416"]);
        assert_eq!(details.primary_region.start_column, 31);
        assert_eq!(details.primary_region.end_line, 3886);
        assert_eq!(details.priority_score, 557);
        assert_eq!(details.primary_file_path, "ptload/src/ptldcli.c");
    }
}
