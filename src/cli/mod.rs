//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the snykapi binary.

use clap::{Parser, Subcommand, ValueEnum};

/// Snyk API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "snykapi", about = "Snyk API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single entity by ID.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// The entity ID (orgs also accept a slug).
        id: String,

        /// Org ID or slug (required for projects and targets).
        #[arg(long)]
        org: Option<String>,
    },

    /// List every entity of a type, following all pages.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// Org ID or slug (required for projects, targets, container images and issues).
        #[arg(long)]
        org: Option<String>,

        /// Project ID (limits issues to one project).
        #[arg(long)]
        project: Option<String>,

        /// Group ID (required for users).
        #[arg(long)]
        group: Option<String>,
    },
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A Snyk organization.
    #[value(alias = "orgs")]
    Org,
    /// A scanned project.
    #[value(alias = "projects")]
    Project,
    /// A scan target (repository, image, ...).
    #[value(alias = "targets")]
    Target,
    /// A group of orgs.
    #[value(alias = "groups")]
    Group,
    /// A group member.
    #[value(alias = "users")]
    User,
    /// A container image.
    #[value(name = "container-image", alias = "container-images")]
    ContainerImage,
    /// A vulnerability, license or code issue.
    #[value(alias = "issues")]
    Issue,
}
