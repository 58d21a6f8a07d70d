//! Snyk API CLI binary.
//!
//! A command-line interface for browsing the Snyk API.

use clap::Parser;
use serde::Serialize;
use snykapi::cli::{Cli, Command, Entity};
use snykapi::output::PrettyPrint;
use snykapi::{ContainerImage, Get, Group, IssueV2, List, Org, Project, SnykClient, SnykError, Target, User};
use std::process::ExitCode;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match SnykClient::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set SNYK_TOKEN environment variable (e.g. \"token <api-key>\")");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &SnykClient, cli: Cli) -> snykapi::Result<()> {
    match cli.command {
        Command::Get { entity, id, org } => handle_get(client, entity, id, org, cli.json).await,
        Command::List {
            entity,
            org,
            project,
            group,
        } => handle_list(client, entity, org, project, group, cli.json).await,
    }
}

async fn require_org(client: &SnykClient, org: Option<String>, entity: Entity) -> snykapi::Result<Org> {
    let org = org.ok_or_else(|| {
        SnykError::ValidationError(format!("--org is required for {entity:?} commands"))
    })?;
    client.orgs().get(org).await
}

async fn handle_get(
    client: &SnykClient,
    entity: Entity,
    id: String,
    org: Option<String>,
    json: bool,
) -> snykapi::Result<()> {
    match entity {
        Entity::Org => {
            let org = client.orgs().get(id).await?;
            output_single(&org, json)?;
        }
        Entity::Group => {
            let group = client.groups().get(id).await?;
            output_single(&group, json)?;
        }
        Entity::Project => {
            let org = require_org(client, org, entity).await?;
            let project = org.projects().get(id).await?;
            output_single(&project, json)?;
        }
        Entity::Target => {
            let org = require_org(client, org, entity).await?;
            let target = org.targets().get(id).await?;
            output_single(&target, json)?;
        }
        Entity::User | Entity::ContainerImage | Entity::Issue => {
            eprintln!("Hint: Use 'snykapi list {}' instead", entity_name(entity));
            return Err(SnykError::Unsupported(format!(
                "{} entities can only be listed",
                entity_name(entity)
            )));
        }
    }
    Ok(())
}

async fn handle_list(
    client: &SnykClient,
    entity: Entity,
    org: Option<String>,
    project: Option<String>,
    group: Option<String>,
    json: bool,
) -> snykapi::Result<()> {
    match entity {
        Entity::Org => {
            let orgs = client.orgs().list_all().await?;
            output_list(&orgs, json, |item| OrgRow::from(item))?;
        }
        Entity::Group => {
            let groups = client.groups().list_all().await?;
            output_list(&groups, json, |item| GroupRow::from(item))?;
        }
        Entity::User => {
            let group = group.ok_or_else(|| {
                SnykError::ValidationError("--group is required for listing users".to_string())
            })?;
            let users = client.users(&group).list_all().await?;
            output_list(&users, json, |item| UserRow::from(item))?;
        }
        Entity::Project => {
            let org = require_org(client, org, entity).await?;
            let projects = org.projects().list_all().await?;
            output_list(&projects, json, |item| ProjectRow::from(item))?;
        }
        Entity::Target => {
            let org = require_org(client, org, entity).await?;
            let targets = org.targets().list_all().await?;
            output_list(&targets, json, |item| TargetRow::from(item))?;
        }
        Entity::ContainerImage => {
            let org = require_org(client, org, entity).await?;
            let images = org.container_images().list_all().await?;
            output_list(&images, json, |item| ContainerImageRow::from(item))?;
        }
        Entity::Issue => {
            let org = require_org(client, org, entity).await?;
            let issues = match project {
                Some(project_id) => {
                    let project = org.projects().get(project_id).await?;
                    project.issues().list_all_v2().await?
                }
                None => org.issues().list_all().await?,
            };
            output_list(&issues, json, |item| IssueRow::from(item))?;
        }
    }
    Ok(())
}

fn entity_name(entity: Entity) -> &'static str {
    match entity {
        Entity::Org => "orgs",
        Entity::Project => "projects",
        Entity::Target => "targets",
        Entity::Group => "groups",
        Entity::User => "users",
        Entity::ContainerImage => "container-images",
        Entity::Issue => "issues",
    }
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> snykapi::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> snykapi::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total", items.len());
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct OrgRow {
    id: String,
    name: String,
    slug: String,
}

impl From<&Org> for OrgRow {
    fn from(o: &Org) -> Self {
        Self {
            id: o.id.clone(),
            name: o.name.clone(),
            slug: o.slug.clone(),
        }
    }
}

#[derive(Tabled)]
struct GroupRow {
    id: String,
    name: String,
}

impl From<&Group> for GroupRow {
    fn from(g: &Group) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.group_role.clone(),
        }
    }
}

#[derive(Tabled)]
struct ProjectRow {
    id: String,
    name: String,
    #[tabled(rename = "type")]
    project_type: String,
    origin: String,
    issues: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            project_type: p.project_type.clone(),
            origin: p.origin.clone(),
            issues: p
                .meta
                .latest_issue_counts
                .as_ref()
                .map(|c| (c.critical + c.high + c.medium + c.low).to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct TargetRow {
    id: String,
    name: String,
    origin: String,
    url: String,
}

impl From<&Target> for TargetRow {
    fn from(t: &Target) -> Self {
        Self {
            id: t.id.clone(),
            name: t.display_name.clone(),
            origin: t.origin.clone(),
            url: t.remote_url.clone(),
        }
    }
}

#[derive(Tabled)]
struct ContainerImageRow {
    id: String,
    names: String,
    platform: String,
}

impl From<&ContainerImage> for ContainerImageRow {
    fn from(c: &ContainerImage) -> Self {
        Self {
            id: c.id.clone(),
            names: c.names.join(", "),
            platform: c.platform.clone(),
        }
    }
}

#[derive(Tabled)]
struct IssueRow {
    key: String,
    #[tabled(rename = "type")]
    issue_type: String,
    severity: String,
    status: String,
    title: String,
}

impl From<&IssueV2> for IssueRow {
    fn from(i: &IssueV2) -> Self {
        Self {
            key: i.key.clone(),
            issue_type: i.issue_type.clone(),
            severity: i.effective_severity_level.clone(),
            status: i.status.clone(),
            title: i.title.clone(),
        }
    }
}
