//! Container image model and service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::SnykClient;
use crate::error::Result;
use crate::pagination::fetch_all;
use crate::params::QueryParams;
use crate::resource::{null_as_default, Resource};
use crate::traits::List;

const CONTAINER_IMAGES_API_VERSION: &str = "2024-01-23~beta";

/// A scanned container image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerImage {
    /// Image ID (usually the image digest).
    pub id: String,
    /// Layer digests.
    pub layers: Vec<String>,
    /// Image names and tags that resolve to this image.
    pub names: Vec<String>,
    pub platform: String,
}

/// Attributes of a `container_image` record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContainerImageAttributes {
    #[serde(deserialize_with = "null_as_default")]
    pub layers: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub names: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub platform: String,
}

impl ContainerImage {
    pub fn from_resource(resource: Resource<ContainerImageAttributes>) -> Self {
        Self {
            id: resource.id,
            layers: resource.attributes.layers,
            names: resource.attributes.names,
            platform: resource.attributes.platform,
        }
    }
}

/// Service handle for the container images of one org.
#[derive(Debug, Clone)]
pub struct ContainerImagesService {
    client: SnykClient,
    org_id: String,
}

impl ContainerImagesService {
    pub(crate) fn new(client: SnykClient, org_id: &str) -> Self {
        Self {
            client,
            org_id: org_id.to_string(),
        }
    }
}

#[async_trait]
impl List for ContainerImagesService {
    type Output = ContainerImage;

    #[tracing::instrument(skip(self), fields(org = %self.org_id))]
    async fn list_all(&self) -> Result<Vec<ContainerImage>> {
        let path = format!("/rest/orgs/{}/container_images", self.org_id);
        let params = QueryParams::new().with("version", CONTAINER_IMAGES_API_VERSION);
        let resources =
            fetch_all::<ContainerImageAttributes>(&self.client, &path, Some(&params)).await?;
        Ok(resources.into_iter().map(ContainerImage::from_resource).collect())
    }
}
