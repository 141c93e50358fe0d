//! Lifecycle of a self-contained fatjar package.
//!
//! A fatjar package embeds the project sources and configuration under
//! `META-INF/flowman/` and shades the Flowman tools plus all declared
//! dependencies into a single jar runnable via `spark-submit`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::artifact::Artifact;
use crate::constants::{
    FLOWMAN_DRIVER_CLASS, FLOWMAN_GROUP_ID, FLOWMAN_SHELL_CLASS,
    FLOWMAN_SPARK_DEPENDENCIES_ARTIFACT, JAR_RESOURCE_ROOT, NAMESPACE_FILE,
};
use crate::core::FlowpackError;
use crate::descriptor::{
    BuildSettings, Descriptor, ExecutionSettings, FlowmanSettings, JarPackage, Package,
};
use crate::driver::context::{BuildContext, select_projects, stage_sources};
use crate::driver::namespace::NamespaceFile;
use crate::driver::runner::JavaRunner;
use crate::repo::Repository;
use crate::utils::archive::{build_jar, shade_jar};
use crate::utils::fs::{ensure_dir, recreate_dir};

/// Drives one fatjar package through build, test, shell and pack.
pub struct JarLifecycle<'a> {
    descriptor: &'a Descriptor,
    jar: &'a JarPackage,
    repository: &'a Repository,
    context: BuildContext,
    flowman: FlowmanSettings,
    build: BuildSettings,
    execution: ExecutionSettings,
}

impl<'a> JarLifecycle<'a> {
    pub fn new(
        descriptor: &'a Descriptor,
        package: &'a Package,
        jar: &'a JarPackage,
        repository: &'a Repository,
    ) -> Self {
        Self {
            descriptor,
            jar,
            repository,
            context: BuildContext::new(descriptor, &jar.name),
            flowman: descriptor.effective_flowman_settings(package),
            build: descriptor.effective_build_settings(package),
            execution: descriptor.effective_execution_settings(package),
        }
    }

    /// Stage the sources below `META-INF/flowman` and render the default
    /// namespace.
    ///
    /// The staging directory is rebuilt from scratch; everything in it ends
    /// up inside the jar.
    pub fn build(&self) -> Result<(), FlowpackError> {
        recreate_dir(&self.context.output_dir)?;
        stage_sources(self.descriptor, &self.resource_root())?;
        self.render_namespace()
    }

    /// Run the Flowman test driver for the selected projects, or all of
    /// them.
    pub async fn test(
        &self,
        project: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<(), FlowpackError> {
        let root = self.resource_root();
        let classpath = self.repository.classpath(&self.dependencies()?)?;
        let runner = JavaRunner::new(classpath, self.execution.clone())
            .with_conf_dir(root.join("conf"))
            .with_timeout(timeout);

        for project in select_projects(self.descriptor, project)? {
            runner.run_tests(&root.join(&project)).await?;
        }
        Ok(())
    }

    /// Launch an interactive Flowman shell for one project.
    pub async fn shell(&self, project: Option<&str>) -> Result<(), FlowpackError> {
        let project = self
            .descriptor
            .find_project(project.unwrap_or_default())?
            .to_string();
        let root = self.resource_root();
        let classpath = self.repository.classpath(&self.dependencies()?)?;
        let runner =
            JavaRunner::new(classpath, self.execution.clone()).with_conf_dir(root.join("conf"));
        runner.run_shell(&root.join(&project)).await
    }

    /// Build the staged resources into a jar and shade all dependencies
    /// into the final artifact.
    pub fn pack(&self) -> Result<PathBuf, FlowpackError> {
        let excludes: Vec<PathBuf> = if self.jar.include_projects {
            Vec::new()
        } else {
            self.descriptor
                .projects
                .iter()
                .chain(&self.descriptor.resources)
                .map(|source| Path::new(JAR_RESOURCE_ROOT).join(source))
                .collect()
        };

        ensure_dir(&self.context.build_dir)?;
        let base_jar = self
            .context
            .build_dir
            .join(format!("original-{}.jar", self.artifact_name()));
        build_jar(&base_jar, &self.context.output_dir, &excludes)?;

        let exclusions = self.shade_exclusions();
        let dependencies: Vec<Artifact> = self
            .dependencies()?
            .into_iter()
            .filter(|artifact| {
                !exclusions.iter().any(|pattern| artifact.matches_pattern(pattern))
            })
            .collect();
        let jars = self.repository.artifact_files(&dependencies)?;

        let artifact = self.artifact_file();
        info!("shading {}", artifact.display());
        shade_jar(&artifact, &base_jar, &jars, FLOWMAN_DRIVER_CLASS)?;

        let name = format!("{}.jar", self.artifact_name());
        println!();
        println!(
            " > Run 'flowexec' via 'spark-submit {name} -f <project-directory> <flowman-command>'"
        );
        println!(
            " > Run 'flowshell' via 'spark-submit --class {FLOWMAN_SHELL_CLASS} {name} -f <project-directory>'"
        );
        Ok(artifact)
    }

    /// Path of the shaded jar inside the build directory.
    pub fn artifact_file(&self) -> PathBuf {
        self.context.build_dir.join(format!("{}.jar", self.artifact_name()))
    }

    fn artifact_name(&self) -> String {
        self.descriptor.artifact_name(&self.jar.name)
    }

    fn resource_root(&self) -> PathBuf {
        self.context.output_dir.join(JAR_RESOURCE_ROOT)
    }

    /// Render `conf/default-namespace.yml` below the resource root.
    ///
    /// An existing file from the staged configuration is kept as the base,
    /// minus its `plugins` entry; plugin jars are shaded into the artifact
    /// instead of loaded from a plugin directory.
    fn render_namespace(&self) -> Result<(), FlowpackError> {
        let path = self.resource_root().join("conf").join(NAMESPACE_FILE);
        let mut namespace = NamespaceFile::read(&path)?.unwrap_or_else(NamespaceFile::empty);
        namespace.remove("plugins");
        namespace.merge_distinct("config", &self.flowman.config);
        namespace.merge_distinct("environment", &self.flowman.environment);
        namespace.store(&path)
    }

    /// Exclusion patterns applied to the shaded dependencies.
    fn shade_exclusions(&self) -> Vec<String> {
        let mut exclusions = vec![format!(
            "{FLOWMAN_GROUP_ID}:{FLOWMAN_SPARK_DEPENDENCIES_ARTIFACT}:*"
        )];
        exclusions.extend(self.build.exclusions.iter().cloned());
        exclusions
    }

    /// Artifacts put on the Java classpath for tests and the shell, and
    /// shaded into the packed jar.
    fn dependencies(&self) -> Result<Vec<Artifact>, FlowpackError> {
        let mut dependencies = vec![
            self.flowman.resolve_tools(),
            self.flowman.resolve_spark_dependencies(),
        ];
        dependencies.extend(self.build.resolve_dependencies()?);
        dependencies.extend(self.flowman.resolve_plugin_jars()?);
        Ok(dependencies)
    }
}
