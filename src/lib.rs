//! Snyk API client library.
//!
//! A Rust library for the Snyk REST and v1 APIs. A single [`SnykClient`]
//! handles authentication, URL composition and retries; entities are
//! reached through small service handles that carry their ancestors'
//! identifiers, and implement [`Get`] and [`List`] where the API allows.
//!
//! # Quick Start
//!
//! ```no_run
//! use snykapi::{Get, List, SnykClient};
//!
//! #[tokio::main]
//! async fn main() -> snykapi::Result<()> {
//!     // Create client from environment variables
//!     let client = SnykClient::from_env()?;
//!
//!     // Every org the token can see
//!     let orgs = client.orgs().list_all().await?;
//!
//!     for org in &orgs {
//!         // Projects of one org
//!         for project in org.projects().list_all().await? {
//!             let issues = project.issues().list_all().await?;
//!             println!("{}: {} issues", project.name, issues.len());
//!         }
//!     }
//!
//!     // Lookup by UUID or slug
//!     let org = client.orgs().get("my-org".to_string()).await?;
//!     println!("Org: {}", org.name);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`client`](SnykClient) issues requests and applies the retry policy
//! - [`Resource`] is the generic resource record, decoded with narrow
//!   attribute structs and materialized into entities
//! - [`fetch_all`] walks cursor-paginated collections
//! - [`Get`] / [`List`] are implemented by service handles such as
//!   [`OrgsService`] and [`ProjectsService`]
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `SNYK_TOKEN` (required) - Authorization header value, e.g. `token <key>`
//! - `SNYK_API_URL` (optional) - Base URL (defaults to `https://api.snyk.io/`)
//! - `SNYK_API_VERSION` (optional) - Default REST API version

mod client;
mod error;
mod models;
mod pagination;
mod params;
mod resource;
mod retry;
mod traits;

pub mod cli;
pub mod output;

// Re-export core types
pub use client::{compose_url, SnykClient, SnykClientBuilder, DEFAULT_API_URL, DEFAULT_API_VERSION};
pub use error::{Result, SnykError};
pub use pagination::{fetch_all, normalize_next_link, NextRequest, Page, DEFAULT_PAGE_SIZE};
pub use params::QueryParams;
pub use resource::{
    fetch_one, DependencyTotal, IssueCounts, Links, Relationship, Resource, ResourceMeta,
    ResourceRef, SingleEnvelope,
};
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES};

// Re-export traits
pub use traits::{Get, List};

// Re-export models
pub use models::{
    decode_ignored_issues,
    // Container image types
    ContainerImage,
    ContainerImageAttributes,
    ContainerImagesService,
    FixInfo,
    // Group types
    Group,
    GroupAttributes,
    GroupsService,
    // Ignore types
    Ignore,
    IgnoreOptions,
    IgnorePath,
    IgnoreReason,
    IgnoreReasonType,
    IgnoredBy,
    IgnoredIssues,
    ImportFile,
    ImportRepository,
    ImportTarget,
    // Issue types
    Issue,
    IssueData,
    IssueDetails,
    IssueDetailsAttributes,
    IssueIdentifiers,
    IssueLinks,
    IssueV2,
    IssueV2Attributes,
    // Org types
    Org,
    OrgAttributes,
    OrgIssuesService,
    OrgSettings,
    OrgsService,
    Patch,
    PrimaryRegion,
    Priority,
    PriorityFactor,
    // Project types
    Project,
    ProjectAttributes,
    ProjectIssuesService,
    ProjectsService,
    RequestAccess,
    Resolution,
    ScanType,
    Tag,
    // Target types
    Target,
    TargetAttributes,
    TargetsService,
    // User types
    User,
    UserOrg,
    UsersService,
};
