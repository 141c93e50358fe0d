//! Lifecycle of a binary distribution package.
//!
//! A dist package bundles a complete Flowman installation: the unpacked
//! distribution archive, the requested plugins, the rendered default
//! namespace and the staged project sources, assembled into a single
//! installable tarball.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::artifact::Artifact;
use crate::constants::{FLOWS_DIR, NAMESPACE_FILE};
use crate::core::FlowpackError;
use crate::descriptor::{Descriptor, DistPackage, ExecutionSettings, FlowmanSettings, Package};
use crate::driver::context::{BuildContext, select_projects, stage_sources};
use crate::driver::namespace::NamespaceFile;
use crate::driver::runner::JavaRunner;
use crate::repo::Repository;
use crate::utils::archive::{FileSet, pack_tar_gz, unpack_tar_gz};
use crate::utils::fs::ensure_dir;

/// Drives one dist package through build, test, shell and pack.
pub struct DistLifecycle<'a> {
    descriptor: &'a Descriptor,
    dist: &'a DistPackage,
    repository: &'a Repository,
    context: BuildContext,
    flowman: FlowmanSettings,
    execution: ExecutionSettings,
}

impl<'a> DistLifecycle<'a> {
    pub fn new(
        descriptor: &'a Descriptor,
        package: &'a Package,
        dist: &'a DistPackage,
        repository: &'a Repository,
    ) -> Self {
        Self {
            descriptor,
            dist,
            repository,
            context: BuildContext::new(descriptor, &dist.name),
            flowman: descriptor.effective_flowman_settings(package),
            execution: descriptor.effective_execution_settings(package),
        }
    }

    /// Unpack the Flowman distribution and plugins into the build directory,
    /// stage the sources and render the default namespace.
    pub fn build(&self) -> Result<(), FlowpackError> {
        let dist = self.flowman.resolve_dist();
        let archive = self.repository.artifact_file(&dist)?;
        info!("unpacking {} into {}", dist, self.context.build_dir.display());
        unpack_tar_gz(&archive, &self.context.build_dir)?;

        let home = self.context.home_dir(&self.flowman.version);
        for plugin in self.flowman.resolve_plugin_dists()? {
            let archive = self.repository.artifact_file(&plugin)?;
            info!("unpacking plugin {}", plugin);
            unpack_tar_gz(&archive, &home)?;
        }

        stage_sources(self.descriptor, &self.context.output_dir)?;
        self.render_namespace()
    }

    /// Run the Flowman test driver for the selected projects, or all of
    /// them.
    pub async fn test(
        &self,
        project: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<(), FlowpackError> {
        let classpath = self.repository.classpath(&self.dependencies())?;
        let runner = JavaRunner::new(classpath, self.execution.clone())
            .with_home_dir(self.context.home_dir(&self.flowman.version))
            .with_conf_dir(self.context.output_dir.join("conf"))
            .with_timeout(timeout);

        for project in select_projects(self.descriptor, project)? {
            runner.run_tests(&self.context.output_dir.join(&project)).await?;
        }
        Ok(())
    }

    /// Launch an interactive Flowman shell for one project.
    pub async fn shell(&self, project: Option<&str>) -> Result<(), FlowpackError> {
        let project = self
            .descriptor
            .find_project(project.unwrap_or_default())?
            .to_string();
        let classpath = self.repository.classpath(&self.dependencies())?;
        let runner = JavaRunner::new(classpath, self.execution.clone())
            .with_home_dir(self.context.home_dir(&self.flowman.version))
            .with_conf_dir(self.context.output_dir.join("conf"));
        runner.run_shell(&self.context.output_dir.join(&project)).await
    }

    /// Assemble the distribution tarball from the build directory.
    ///
    /// The tarball mirrors the Flowman installation layout below
    /// [`Self::base_directory`]: launcher scripts keep their executable
    /// mode, the staged configuration replaces the distribution's `conf/`,
    /// plugins are restricted to the configured set and project sources land
    /// under `flows/`.
    pub fn pack(&self) -> Result<PathBuf, FlowpackError> {
        let home = self.context.home_dir(&self.flowman.version);
        let conf = self.context.output_dir.join("conf");

        // Plugins from the settings plus any listed in the rendered
        // namespace. Entries with full coordinates have no directory below
        // plugins/ and are skipped.
        let mut plugins: BTreeSet<String> =
            self.flowman.short_plugin_names().into_iter().collect();
        if let Some(namespace) = NamespaceFile::read(&conf.join(NAMESPACE_FILE))? {
            plugins.extend(
                namespace
                    .string_values("plugins")
                    .into_iter()
                    .filter(|plugin| !plugin.contains(':')),
            );
        }
        debug!("packing plugins {:?}", plugins);

        let mut filesets = vec![
            FileSet::new(&home, "")
                .with_excludes(&["bin/*", "conf/*", "plugins/**", "examples/**"]),
            FileSet::new(&home, "").with_file_mode(0o755).with_includes(&["bin/*"]),
            FileSet::new(&conf, "conf"),
        ];
        for plugin in &plugins {
            filesets.push(FileSet::new(
                home.join("plugins").join(plugin),
                format!("plugins/{plugin}"),
            ));
        }
        for source in self.descriptor.projects.iter().chain(&self.descriptor.resources) {
            filesets.push(FileSet::new(
                self.context.output_dir.join(source),
                format!("{FLOWS_DIR}/{source}"),
            ));
        }

        ensure_dir(&self.context.build_dir)?;
        let artifact = self.artifact_file();
        info!("assembling {}", artifact.display());
        pack_tar_gz(&artifact, &self.base_directory(), &filesets)?;
        Ok(artifact)
    }

    /// Path of the packed tarball inside the build directory.
    pub fn artifact_file(&self) -> PathBuf {
        self.context
            .build_dir
            .join(format!("{}.tar.gz", self.descriptor.identity()))
    }

    /// Top-level directory inside the tarball.
    fn base_directory(&self) -> String {
        if self.dist.base_directory.is_empty() {
            self.descriptor.identity()
        } else {
            self.dist.base_directory.clone()
        }
    }

    /// Artifacts put on the Java classpath for tests and the shell.
    fn dependencies(&self) -> Vec<Artifact> {
        vec![
            self.flowman.resolve_tools(),
            self.flowman.resolve_spark_dependencies(),
        ]
    }
}
