//! Package and deployment lifecycle driver.
//!
//! The driver executes lifecycle steps (build, test, shell, pack, deploy)
//! over the packages and deployments of one loaded descriptor. Each package
//! kind has its own lifecycle implementation ([`dist::DistLifecycle`],
//! [`jar::JarLifecycle`]); the driver selects the entities, prints the step
//! banners and isolates failures so one broken entity does not stop the
//! others. Re-running a step simply re-executes it, there are no state
//! markers on disk.

pub mod context;
mod copy;
pub mod dist;
pub mod jar;
pub mod namespace;
pub mod runner;

pub use context::BuildContext;
pub use dist::DistLifecycle;
pub use jar::JarLifecycle;
pub use namespace::NamespaceFile;
pub use runner::JavaRunner;

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use tracing::error;

use crate::constants::default_java_timeout;
use crate::core::FlowpackError;
use crate::descriptor::{Deployment, Descriptor, Package};
use crate::remotefs::FileSystemRegistry;
use crate::repo::Repository;

/// Executes lifecycle steps for the entities of one descriptor.
///
/// The driver is cheap to construct; all state lives in the descriptor and
/// on disk. Failures are isolated per entity: every selected entity runs,
/// the first error is reported after the loop.
pub struct Driver<'a> {
    descriptor: &'a Descriptor,
    repository: &'a Repository,
    registry: FileSystemRegistry,
    timeout: Option<Duration>,
}

impl<'a> Driver<'a> {
    pub fn new(descriptor: &'a Descriptor, repository: &'a Repository) -> Self {
        Self {
            descriptor,
            repository,
            registry: FileSystemRegistry::new(),
            timeout: Some(default_java_timeout()),
        }
    }

    /// Set the test timeout. `None` disables it.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the named package, or all of them.
    pub fn build(&self, package: Option<&str>) -> Result<(), FlowpackError> {
        let mut first_error = None;
        for package in self.select_packages(package)? {
            println!();
            println!("{}", format!("-- Building package '{}'", package.name()).bold());
            remember(self.build_package(package), package.name(), &mut first_error);
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Test the named package, or all of them.
    ///
    /// `skip_tests` skips the whole command; packages with `skipTests` set
    /// are skipped individually.
    pub async fn test(
        &self,
        package: Option<&str>,
        project: Option<&str>,
        skip_tests: bool,
    ) -> Result<(), FlowpackError> {
        if skip_tests {
            return Ok(());
        }

        let mut first_error = None;
        for package in self.select_packages(package)? {
            println!();
            if package.skip_tests() {
                println!(
                    "{}",
                    format!("-- Skipping tests for package '{}'", package.name()).bold()
                );
                continue;
            }
            println!("{}", format!("-- Testing package '{}'", package.name()).bold());
            remember(
                self.test_package(package, project).await,
                package.name(),
                &mut first_error,
            );
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Launch an interactive shell for one package, named or first.
    pub async fn shell(
        &self,
        package: Option<&str>,
        project: Option<&str>,
    ) -> Result<(), FlowpackError> {
        let package = self.descriptor.find_package(package.unwrap_or_default())?;
        println!();
        println!(
            "{}",
            format!("-- Running shell for package '{}'", package.name()).bold()
        );
        match package {
            Package::Dist(dist) => {
                DistLifecycle::new(self.descriptor, package, dist, self.repository)
                    .shell(project)
                    .await
            }
            Package::Fatjar(jar) => {
                JarLifecycle::new(self.descriptor, package, jar, self.repository)
                    .shell(project)
                    .await
            }
        }
    }

    /// Build and pack the named package, or all of them.
    pub fn pack(&self, package: Option<&str>) -> Result<(), FlowpackError> {
        let mut first_error = None;
        for package in self.select_packages(package)? {
            println!();
            println!("{}", format!("-- Building package '{}'", package.name()).bold());
            let result = self.build_package(package).and_then(|()| {
                println!();
                println!("{}", format!("-- Packing package '{}'", package.name()).bold());
                self.pack_package(package).map(|_| ())
            });
            remember(result, package.name(), &mut first_error);
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Execute the named deployment, or all of them.
    pub fn deploy(&self, deployment: Option<&str>) -> Result<(), FlowpackError> {
        let mut first_error = None;
        for deployment in self.select_deployments(deployment)? {
            println!();
            println!("{}", format!("-- Deploying '{}'", deployment.name()).bold());
            remember(self.deploy_one(deployment), deployment.name(), &mut first_error);
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Path of a package's packed artifact inside its build directory.
    pub fn package_artifact(&self, package: &Package) -> PathBuf {
        match package {
            Package::Dist(dist) => {
                DistLifecycle::new(self.descriptor, package, dist, self.repository).artifact_file()
            }
            Package::Fatjar(jar) => {
                JarLifecycle::new(self.descriptor, package, jar, self.repository).artifact_file()
            }
        }
    }

    fn build_package(&self, package: &Package) -> Result<(), FlowpackError> {
        match package {
            Package::Dist(dist) => {
                DistLifecycle::new(self.descriptor, package, dist, self.repository).build()
            }
            Package::Fatjar(jar) => {
                JarLifecycle::new(self.descriptor, package, jar, self.repository).build()
            }
        }
    }

    async fn test_package(
        &self,
        package: &Package,
        project: Option<&str>,
    ) -> Result<(), FlowpackError> {
        match package {
            Package::Dist(dist) => {
                DistLifecycle::new(self.descriptor, package, dist, self.repository)
                    .test(project, self.timeout)
                    .await
            }
            Package::Fatjar(jar) => {
                JarLifecycle::new(self.descriptor, package, jar, self.repository)
                    .test(project, self.timeout)
                    .await
            }
        }
    }

    fn pack_package(&self, package: &Package) -> Result<PathBuf, FlowpackError> {
        match package {
            Package::Dist(dist) => {
                DistLifecycle::new(self.descriptor, package, dist, self.repository).pack()
            }
            Package::Fatjar(jar) => {
                JarLifecycle::new(self.descriptor, package, jar, self.repository).pack()
            }
        }
    }

    /// Copy deployments pack their source package first when its artifact
    /// is missing.
    fn deploy_one(&self, deployment: &Deployment) -> Result<(), FlowpackError> {
        match deployment {
            Deployment::Copy(copy) => {
                let package = self.descriptor.find_package(&copy.package)?;
                let artifact = self.package_artifact(package);
                if !artifact.is_file() {
                    self.build_package(package)?;
                    self.pack_package(package)?;
                }
                copy::deploy(copy, &artifact, &self.registry)
            }
        }
    }

    fn select_packages(&self, name: Option<&str>) -> Result<Vec<&'a Package>, FlowpackError> {
        match name {
            Some(name) => Ok(vec![self.descriptor.find_package(name)?]),
            None => {
                if self.descriptor.packages.is_empty() {
                    return Err(FlowpackError::MissingField {
                        entity: "deployment descriptor".to_string(),
                        field: "packages".to_string(),
                    });
                }
                Ok(self.descriptor.packages.iter().collect())
            }
        }
    }

    fn select_deployments(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<&'a Deployment>, FlowpackError> {
        match name {
            Some(name) => Ok(vec![self.descriptor.find_deployment(name)?]),
            None => {
                if self.descriptor.deployments.is_empty() {
                    return Err(FlowpackError::MissingField {
                        entity: "deployment descriptor".to_string(),
                        field: "deployments".to_string(),
                    });
                }
                Ok(self.descriptor.deployments.iter().collect())
            }
        }
    }
}

/// Keep the first failure for the exit status, log the rest as they occur.
fn remember(
    result: Result<(), FlowpackError>,
    entity: &str,
    first_error: &mut Option<FlowpackError>,
) {
    if let Err(err) = result {
        if first_error.is_none() {
            *first_error = Some(err);
        } else {
            error!("'{entity}' failed: {err}");
        }
    }
}
