//! Snyk API model types and service handles.

mod container_image;
mod group;
mod ignore;
mod issue;
mod issue_details;
mod issue_v2;
mod org;
mod project;
mod target;
mod user;

pub use container_image::*;
pub use group::*;
pub use ignore::*;
pub use issue::*;
pub use issue_details::*;
pub use issue_v2::*;
pub use org::*;
pub use project::*;
pub use target::*;
pub use user::*;
