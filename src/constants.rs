//! Global constants used throughout the flowpack codebase.
//!
//! This module contains the well-known Flowman coordinates, file names,
//! directory layout and process parameters that are used across multiple
//! modules. Defining them centrally improves maintainability and makes
//! magic strings more discoverable.

use std::time::Duration;

/// Maven group id of all Flowman framework artifacts.
pub const FLOWMAN_GROUP_ID: &str = "com.dimajix.flowman";

/// Artifact id of the Flowman binary distribution (`tar.gz`, classifier `bin`).
pub const FLOWMAN_DIST_ARTIFACT: &str = "flowman-dist";

/// Artifact id of the Flowman command line tools jar.
pub const FLOWMAN_TOOLS_ARTIFACT: &str = "flowman-tools";

/// Artifact id of the Spark dependencies aggregator pom.
pub const FLOWMAN_SPARK_DEPENDENCIES_ARTIFACT: &str = "flowman-spark-dependencies";

/// Artifact id of the parent pom of a Flowman release.
pub const FLOWMAN_PARENT_ARTIFACT: &str = "flowman-parent";

/// Prefix that marks a bare plugin name as a built-in Flowman plugin.
///
/// A plugin entry like `flowman-kafka` (no colon anywhere) is expanded to
/// `com.dimajix.flowman:flowman-plugin-kafka` before coordinate parsing.
/// Entries containing a `:` bypass the expansion.
pub const PLUGIN_SHORTHAND_PREFIX: &str = "flowman-";

/// Artifact id prefix that built-in plugin shorthands expand to.
pub const PLUGIN_ARTIFACT_PREFIX: &str = "flowman-plugin-";

/// Main class of the Flowman batch execution driver.
pub const FLOWMAN_DRIVER_CLASS: &str = "com.dimajix.flowman.tools.exec.Driver";

/// Main class of the interactive Flowman shell.
pub const FLOWMAN_SHELL_CLASS: &str = "com.dimajix.flowman.tools.shell.Shell";

/// Default file name of the deployment descriptor.
pub const DEPLOYMENT_DESCRIPTOR: &str = "deployment.yml";

/// File name of the namespace configuration rendered into `conf/`.
pub const NAMESPACE_FILE: &str = "default-namespace.yml";

/// Environment variable pointing spawned tools at the unpacked distribution.
pub const ENV_FLOWMAN_HOME: &str = "FLOWMAN_HOME";

/// Environment variable pointing spawned tools at the configuration directory.
pub const ENV_FLOWMAN_CONF_DIR: &str = "FLOWMAN_CONF_DIR";

/// Environment variable overriding the local artifact repository location.
pub const ENV_LOCAL_REPOSITORY: &str = "FLOWPACK_LOCAL_REPOSITORY";

/// Directory below the descriptor directory where entities are built.
///
/// Each package or deployment gets its own subdirectory named after the
/// entity, so several entities can be built from one descriptor without
/// clobbering each other.
pub const BUILD_DIR: &str = "target/flowman";

/// Subdirectory of an entity build directory receiving projects and configuration.
pub const OUTPUT_DIR: &str = "resources";

/// Payload root inside a fat jar.
///
/// Fat jars carry their projects and configuration below `META-INF/flowman`
/// so the Flowman runtime can find them on the classpath.
pub const JAR_RESOURCE_ROOT: &str = "META-INF/flowman";

/// Directory inside an assembled tarball that receives project directories.
pub const FLOWS_DIR: &str = "flows";

/// Default timeout for spawned Flowman test runs (1 hour).
///
/// Misconfigured pipelines tend to hang rather than fail, so test runs are
/// bounded by default. A `--timeout` of 0 disables the bound.
pub fn default_java_timeout() -> Duration {
    Duration::from_secs(3600)
}

/// JVM options passed to every spawned Flowman process.
///
/// Spark and Hadoop reach into JDK internals that are closed by default on
/// JDK 17+; this list matches the `--add-opens` set used by the Flowman
/// launcher scripts. `-XX:+IgnoreUnrecognizedVMOptions` keeps the same list
/// working on JDK 8 and 11, which reject `--add-opens`.
pub const EXTRA_JAVA_ARGS: &[&str] = &[
    "-XX:+IgnoreUnrecognizedVMOptions",
    "--add-opens=java.base/java.lang=ALL-UNNAMED",
    "--add-opens=java.base/java.lang.invoke=ALL-UNNAMED",
    "--add-opens=java.base/java.lang.reflect=ALL-UNNAMED",
    "--add-opens=java.base/java.io=ALL-UNNAMED",
    "--add-opens=java.base/java.net=ALL-UNNAMED",
    "--add-opens=java.base/java.nio=ALL-UNNAMED",
    "--add-opens=java.base/java.util=ALL-UNNAMED",
    "--add-opens=java.base/java.util.concurrent=ALL-UNNAMED",
    "--add-opens=java.base/java.util.concurrent.atomic=ALL-UNNAMED",
    "--add-opens=java.base/sun.nio.ch=ALL-UNNAMED",
    "--add-opens=java.base/sun.nio.cs=ALL-UNNAMED",
    "--add-opens=java.base/sun.security.action=ALL-UNNAMED",
    "--add-opens=java.base/sun.util.calendar=ALL-UNNAMED",
    "-Djdk.reflect.useDirectMethodHandle=false",
];
