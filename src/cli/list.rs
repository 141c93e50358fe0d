//! List the entities declared in the deployment descriptor.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::cli::common::CommandContext;
use crate::descriptor::{Deployment, Descriptor};

#[derive(Debug, Args)]
#[command(about = "List the packages, deployments and projects of the descriptor")]
pub struct ListCommand {
    /// Output format (table or json)
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,
}

/// One package row of the listing.
#[derive(Debug, Serialize)]
struct PackageEntry<'a> {
    name: &'a str,
    kind: &'a str,
}

/// One deployment row of the listing.
#[derive(Debug, Serialize)]
struct DeploymentEntry<'a> {
    name: &'a str,
    kind: &'a str,
    package: &'a str,
    location: &'a str,
}

/// The full listing, also the JSON document for `--format json`.
#[derive(Debug, Serialize)]
struct Listing<'a> {
    name: &'a str,
    version: &'a str,
    packages: Vec<PackageEntry<'a>>,
    deployments: Vec<DeploymentEntry<'a>>,
    projects: &'a [String],
    resources: &'a [String],
}

impl<'a> From<&'a Descriptor> for Listing<'a> {
    fn from(descriptor: &'a Descriptor) -> Self {
        let packages = descriptor
            .packages
            .iter()
            .map(|package| PackageEntry {
                name: package.name(),
                kind: package.kind(),
            })
            .collect();
        let deployments = descriptor
            .deployments
            .iter()
            .map(|deployment| {
                let Deployment::Copy(copy) = deployment;
                DeploymentEntry {
                    name: &copy.name,
                    kind: deployment.kind(),
                    package: &copy.package,
                    location: &copy.location,
                }
            })
            .collect();

        Self {
            name: &descriptor.name,
            version: &descriptor.version,
            packages,
            deployments,
            projects: &descriptor.projects,
            resources: &descriptor.resources,
        }
    }
}

impl ListCommand {
    pub fn execute(self, context: &CommandContext) -> Result<()> {
        let listing = Listing::from(&context.descriptor);
        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            print_table(&listing);
        }
        Ok(())
    }
}

fn print_table(listing: &Listing<'_>) {
    let identity = if listing.version.is_empty() {
        listing.name.to_string()
    } else {
        format!("{} {}", listing.name, listing.version)
    };
    println!("{}", identity.bold());

    println!();
    println!("{}", "Packages:".bold());
    for package in &listing.packages {
        println!("  {:<24} {}", package.name, package.kind);
    }

    if !listing.deployments.is_empty() {
        println!();
        println!("{}", "Deployments:".bold());
        for deployment in &listing.deployments {
            println!(
                "  {:<24} {:<8} {} -> {}",
                deployment.name, deployment.kind, deployment.package, deployment.location
            );
        }
    }

    println!();
    println!("{}", "Projects:".bold());
    for project in listing.projects {
        println!("  {project}");
    }
    for resource in listing.resources {
        println!("  {resource} (resource)");
    }
}
