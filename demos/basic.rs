//! Basic example demonstrating the Snyk API client.
//!
//! Run with:
//! ```
//! SNYK_TOKEN="token your-key" cargo run --example basic
//! ```

use snykapi::{List, ScanType, SnykClient};

#[tokio::main]
async fn main() -> snykapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Snyk client...");
    let client = SnykClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    println!("\n--- Listing Orgs ---");
    let orgs = client.orgs().list_all().await?;
    println!("Found {} orgs", orgs.len());

    for org in &orgs {
        println!("  - {} ({})", org.name, org.slug);
    }

    // Walk the projects of the first org
    if let Some(org) = orgs.first() {
        println!("\n--- Projects in {} ---", org.name);
        let projects = org.projects().list_all().await?;

        for project in &projects {
            println!("  - {} [{}]", project.name, project.scan_type());
        }

        // Issues of the first open source project
        if let Some(project) = projects.iter().find(|p| p.scan_type() == ScanType::OpenSource) {
            println!("\n--- Issues in {} ---", project.name);
            let issues = project.issues().list_all().await?;
            println!("Found {} issues", issues.len());

            for issue in issues.iter().take(10) {
                println!(
                    "  - {} {} ({})",
                    issue.issue_data.severity, issue.id, issue.pkg_name
                );
            }

            let ignored = project.issues().ignored().await?;
            println!("{} issues have ignores", ignored.len());
        }

        println!("\n--- Targets in {} ---", org.name);
        for target in org.targets().list_all().await? {
            println!("  - {} ({})", target.display_name, target.origin);
        }
    }

    println!("\nDone!");
    Ok(())
}
