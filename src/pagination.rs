//! Cursor pagination over REST API collections.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::client::SnykClient;
use crate::error::Result;
use crate::params::QueryParams;
use crate::resource::{null_as_default, Links, Resource};

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// One page of a REST collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Default"))]
pub struct Page<A = serde_json::Value> {
    /// The records on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Resource<A>>,
    /// Navigation links; `next` is the cursor for the following page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Links,
}

impl<A> Page<A> {
    /// Returns true if this page has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of records on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns an iterator over the records in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, Resource<A>> {
        self.data.iter()
    }
}

impl<A> IntoIterator for Page<A> {
    type Item = Resource<A>;
    type IntoIter = std::vec::IntoIter<Resource<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

/// The request that fetches the page a `next` link points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextRequest {
    /// Path, including the link's own query string when `params` is `None`.
    pub path: String,
    /// Replacement query parameters, set when the version had to be added.
    pub params: Option<QueryParams>,
}

/// Turn a `next` link into a fetchable request.
///
/// Depending on the API version the link may or may not start with
/// `/rest`, and may or may not repeat the `version` parameter. Both are
/// restored here. When the link carries its own version it is used as-is.
///
/// # Errors
///
/// Returns an error if the link is not a valid URL reference.
pub fn normalize_next_link(next: &str, version: &str) -> Result<NextRequest> {
    let root = Url::parse("http://next.invalid/")?;
    let link = root.join(next)?;

    let path = if link.path() == "/rest" || link.path().starts_with("/rest/") {
        link.path().to_string()
    } else {
        format!("/rest{}", link.path())
    };

    let mut params = QueryParams::from_query(link.query().unwrap_or_default());
    if params.get("version").is_some_and(|v| !v.is_empty()) {
        let path = match link.query() {
            Some(query) => format!("{path}?{query}"),
            None => path,
        };
        return Ok(NextRequest { path, params: None });
    }

    params.set("version", version);
    Ok(NextRequest {
        path,
        params: Some(params),
    })
}

/// Fetch every record of a REST collection, following `next` links.
///
/// The first request sends the client's default API version (unless
/// `params` sets one) and a page size of [`DEFAULT_PAGE_SIZE`]; caller
/// parameters win on conflicts. Later pages are requested exactly as the
/// server's `next` link describes them, with the version carried forward
/// when the link omits it.
///
/// Iteration stops at the first page without a `next` link or without
/// records. All pages are fetched before returning.
///
/// # Errors
///
/// Any failed page aborts the whole listing; records gathered so far are
/// dropped.
#[tracing::instrument(skip(client, params))]
pub async fn fetch_all<A>(
    client: &SnykClient,
    path: &str,
    params: Option<&QueryParams>,
) -> Result<Vec<Resource<A>>>
where
    A: DeserializeOwned + Default + Send,
{
    let mut request_params = QueryParams::new();
    if !params.is_some_and(|p| p.has("version")) {
        request_params.set("version", client.api_version());
    }
    request_params.set("limit", DEFAULT_PAGE_SIZE.to_string());
    if let Some(params) = params {
        request_params.merge(params);
    }

    let version = request_params
        .get("version")
        .unwrap_or(client.api_version())
        .to_string();

    let mut resources = Vec::new();
    let mut request = NextRequest {
        path: path.to_string(),
        params: Some(request_params),
    };
    let mut page_number = 1u32;

    loop {
        let response = client.get(&request.path, request.params.as_ref()).await?;
        let page: Page<A> = SnykClient::json(response).await?;
        tracing::debug!(page = page_number, records = page.len(), "Fetched page");

        let next = page.links.next().map(str::to_owned);
        let was_empty = page.is_empty();
        resources.extend(page);

        let Some(next) = next else { break };
        if was_empty {
            break;
        }

        request = normalize_next_link(&next, &version)?;
        page_number += 1;
    }

    Ok(resources)
}
