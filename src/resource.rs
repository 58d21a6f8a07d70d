//! Generic JSON:API resource records returned by the REST API.
//!
//! Every REST response wraps its payload in an envelope of the form
//! `{"data": ..., "links": {...}}`. A record carries a type tag, an id, an
//! attribute object whose shape depends on the type, and optional `meta`
//! and `relationships` objects.
//!
//! [`Resource`] is generic over its attribute type so each entity can
//! decode only the attributes it needs. Attribute structs mark every field
//! `#[serde(default)]`: missing fields take their zero value and unknown
//! fields are ignored.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::client::SnykClient;
use crate::error::Result;
use crate::params::QueryParams;

/// One decoded JSON:API record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct Resource<A = serde_json::Value> {
    /// The resource type tag (e.g. `"org"`, `"project"`).
    #[serde(rename = "type")]
    pub resource_type: String,

    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: A,

    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: ResourceMeta,

    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: HashMap<String, Relationship>,
}

impl<A> Resource<A> {
    /// Id of the resource related through `name`, if present.
    pub fn related_id(&self, name: &str) -> Option<&str> {
        self.relationships
            .get(name)
            .map(|r| r.data.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Envelope around a single record.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct SingleEnvelope<A = serde_json::Value> {
    pub data: Resource<A>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Links,
}

/// Pagination and navigation links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub related: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl Links {
    /// The `next` link, treating an empty string as absent.
    pub fn next(&self) -> Option<&str> {
        self.next.as_deref().filter(|n| !n.is_empty())
    }
}

/// A link from one record to another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: ResourceRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Links,
}

/// A reference to another resource.
///
/// Also used for issue classes and problems, which share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The `meta` object attached to records.
///
/// Only projects populate it today, when the matching `meta.*` query
/// flags are requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_monitored_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_dependency_total: Option<DependencyTotal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_issue_counts: Option<IssueCounts>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyTotal {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Issue counts by severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueCounts {
    #[serde(default)]
    pub critical: u64,
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub medium: u64,
    #[serde(default)]
    pub low: u64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> core::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fetch a single REST resource.
///
/// The client's default API version is added unless `params` already
/// carries one.
///
/// # Errors
///
/// Returns an error if the request fails or the envelope does not decode.
#[tracing::instrument(skip(client, params))]
pub async fn fetch_one<A>(
    client: &SnykClient,
    path: &str,
    params: Option<&QueryParams>,
) -> Result<Resource<A>>
where
    A: DeserializeOwned + Default,
{
    let mut request_params = QueryParams::new();
    if !params.is_some_and(|p| p.has("version")) {
        request_params.set("version", client.api_version());
    }
    if let Some(params) = params {
        request_params.merge(params);
    }

    let response = client.get(path, Some(&request_params)).await?;
    let envelope: SingleEnvelope<A> = SnykClient::json(response).await?;
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct NameOnly {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn test_resource_decodes_sparse_attributes() {
        let json = r#"{
            "data": {
                "type": "org",
                "id": "abc",
                "attributes": {"name": "org1", "slug": "org1-abc", "is_personal": false}
            },
            "links": {"self": "/orgs/abc"}
        }"#;

        let envelope: SingleEnvelope<NameOnly> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.resource_type, "org");
        assert_eq!(envelope.data.id, "abc");
        assert_eq!(envelope.data.attributes.name, "org1");
        assert!(envelope.data.relationships.is_empty());
        assert_eq!(envelope.data.meta, ResourceMeta::default());
        assert_eq!(envelope.links.next(), None);
    }

    #[test]
    fn test_missing_attributes_take_defaults() {
        let json = r#"{"type": "org", "id": "abc", "attributes": null}"#;
        let resource: Resource<NameOnly> = serde_json::from_str(json).unwrap();
        assert_eq!(resource.attributes, NameOnly::default());

        let json = r#"{"type": "org", "id": "abc"}"#;
        let resource: Resource<NameOnly> = serde_json::from_str(json).unwrap();
        assert_eq!(resource.attributes.name, "");
    }

    #[test]
    fn test_raw_attribute_bag() {
        let json = r#"{"type": "thing", "id": "1", "attributes": {"anything": [1, 2]}}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.attributes["anything"][1], 2);
    }

    #[test]
    fn test_related_id() {
        let json = r#"{
            "type": "issue",
            "id": "i-1",
            "attributes": {},
            "relationships": {
                "organization": {"data": {"id": "org-1", "type": "organization"}},
                "scan_item": {"data": {"id": "", "type": "project"}}
            }
        }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.related_id("organization"), Some("org-1"));
        assert_eq!(resource.related_id("scan_item"), None);
        assert_eq!(resource.related_id("missing"), None);
    }

    #[test]
    fn test_meta_decodes_issue_counts() {
        let json = r#"{
            "type": "project",
            "id": "p",
            "attributes": {},
            "meta": {
                "latest_issue_counts": {"critical": 1, "high": 2, "medium": 3, "low": 4,
                    "updated_at": "2024-01-01T00:00:00Z"}
            }
        }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        let counts = resource.meta.latest_issue_counts.unwrap();
        assert_eq!((counts.critical, counts.high, counts.medium, counts.low), (1, 2, 3, 4));
        assert!(resource.meta.latest_dependency_total.is_none());
    }

    #[test]
    fn test_envelope_missing_data_is_error() {
        let result: core::result::Result<SingleEnvelope, _> =
            serde_json::from_str(r#"{"links": {}}"#);
        assert!(result.is_err());
    }
}
