//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::{Group, IssueV2, Org, Project, Target};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn divider(header: &str) -> String {
    "─".repeat(header.chars().count().max(30))
}

impl PrettyPrint for Org {
    fn pretty_print(&self) -> String {
        let header = format!("Org: {}", self.name);
        let mut lines = vec![
            header.clone(),
            divider(&header),
            format!("ID:             {}", self.id),
            format!("Slug:           {}", self.slug),
        ];

        if let Some(ref group_id) = self.group_id {
            lines.push(format!("Group:          {}", group_id));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Group {
    fn pretty_print(&self) -> String {
        let header = format!("Group: {}", self.name);
        [header.clone(), divider(&header), format!("ID:             {}", self.id)].join("\n")
    }
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let header = format!("Project: {}", self.name);

        let mut lines = vec![
            header.clone(),
            divider(&header),
            format!("ID:             {}", self.id),
            format!("Type:           {} ({})", self.project_type, self.scan_type()),
            format!("Origin:         {}", self.origin),
            format!("Status:         {}", self.status),
        ];

        if !self.target_file.is_empty() {
            lines.push(format!("Target File:    {}", self.target_file));
        }

        if let Some(ref counts) = self.meta.latest_issue_counts {
            lines.push(format!(
                "Issues:         {} critical, {} high, {} medium, {} low",
                counts.critical, counts.high, counts.medium, counts.low
            ));
        }

        if let Some(ref created) = self.created {
            lines.push(format!("Created:        {}", created.format(TIME_FORMAT)));
        }

        if !self.tags.is_empty() {
            let tags: Vec<String> = self.tags.iter().map(|t| format!("{}={}", t.key, t.value)).collect();
            lines.push(format!("Tags:           {}", tags.join(", ")));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Target {
    fn pretty_print(&self) -> String {
        let header = format!("Target: {}", self.display_name);

        let mut lines = vec![
            header.clone(),
            divider(&header),
            format!("ID:             {}", self.id),
            format!("Origin:         {}", self.origin),
        ];

        if !self.remote_url.is_empty() {
            lines.push(format!("Remote URL:     {}", self.remote_url));
        }

        if self.is_private {
            lines.push("Visibility:     private".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for IssueV2 {
    fn pretty_print(&self) -> String {
        let header = format!("Issue {}", self.key);

        let mut lines = vec![
            header.clone(),
            divider(&header),
            format!("Title:          {}", self.title),
            format!("Type:           {}", self.issue_type),
            format!("Severity:       {}", self.effective_severity_level),
            format!("Status:         {}", self.status),
        ];

        if self.ignored {
            lines.push("Ignored:        yes".to_string());
        }

        if !self.problems.is_empty() {
            let ids: Vec<&str> = self.problems.iter().map(|p| p.id.as_str()).collect();
            lines.push(format!("Problems:       {}", ids.join(", ")));
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", created.format(TIME_FORMAT)));
        }

        lines.join("\n")
    }
}
