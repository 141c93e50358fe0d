//! Spawning `java` against a packaged Flowman installation.
//!
//! A [`JavaRunner`] holds everything shared between invocations of one
//! package: the resolved classpath, the unpacked Flowman home, the rendered
//! configuration directory and the effective execution settings. Individual
//! runs then only differ in the main class, the project directory and the
//! trailing tool arguments.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::constants::{
    ENV_FLOWMAN_CONF_DIR, ENV_FLOWMAN_HOME, EXTRA_JAVA_ARGS, FLOWMAN_DRIVER_CLASS,
    FLOWMAN_SHELL_CLASS,
};
use crate::core::FlowpackError;
use crate::descriptor::ExecutionSettings;
use crate::utils::split_settings;

/// Runs Flowman tools in a `java` subprocess.
///
/// Stdio is inherited in all cases: test output streams to the terminal and
/// the shell is fully interactive.
pub struct JavaRunner {
    classpath: String,
    settings: ExecutionSettings,
    home_dir: Option<PathBuf>,
    conf_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl JavaRunner {
    /// A runner for the given classpath and effective execution settings.
    #[must_use]
    pub fn new(classpath: impl Into<String>, settings: ExecutionSettings) -> Self {
        Self {
            classpath: classpath.into(),
            settings,
            home_dir: None,
            conf_dir: None,
            timeout: None,
        }
    }

    /// Flowman home of the unpacked distribution, exported as
    /// `FLOWMAN_HOME`. Fatjar packages run without one.
    #[must_use]
    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    /// Rendered configuration directory, exported as `FLOWMAN_CONF_DIR`.
    #[must_use]
    pub fn with_conf_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.conf_dir = Some(dir.into());
        self
    }

    /// Bound the runtime of non-interactive runs. `None` means unbounded.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the project's tests via the Flowman driver.
    pub async fn run_tests(&self, project_dir: &Path) -> Result<(), FlowpackError> {
        self.run(FLOWMAN_DRIVER_CLASS, project_dir, &["test", "run"], "tests", self.timeout)
            .await
    }

    /// Open an interactive Flowman shell on the project. Never times out.
    pub async fn run_shell(&self, project_dir: &Path) -> Result<(), FlowpackError> {
        self.run(FLOWMAN_SHELL_CLASS, project_dir, &[], "shell", None).await
    }

    async fn run(
        &self,
        main_class: &str,
        project_dir: &Path,
        args: &[&str],
        operation: &str,
        timeout_duration: Option<Duration>,
    ) -> Result<(), FlowpackError> {
        let java = find_java()?;
        let full_args = self.build_args(main_class, project_dir, args);
        debug!("executing {} {}", java.display(), full_args.join(" "));

        let mut command = Command::new(&java);
        command.args(&full_args);
        for (key, value) in self.build_env() {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(FlowpackError::Io)?;

        let status = if let Some(duration) = timeout_duration {
            match timeout(duration, child.wait()).await {
                Ok(status) => status.map_err(FlowpackError::Io)?,
                Err(_) => {
                    let _ = child.kill().await;
                    return Err(FlowpackError::JavaCommandTimeout {
                        operation: operation.to_string(),
                        timeout_secs: duration.as_secs(),
                    });
                }
            }
        } else {
            child.wait().await.map_err(FlowpackError::Io)?
        };

        if !status.success() {
            return Err(FlowpackError::JavaCommandFailed {
                operation: operation.to_string(),
                code: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }

    /// Full java argument list for one invocation.
    ///
    /// Order matters: JVM opener flags, descriptor `javaOptions`, the
    /// classpath/main-class/project block, `flowmanOptions`, then `-P`,
    /// `-D` and `--conf` pairs, then the tool arguments.
    fn build_args(&self, main_class: &str, project_dir: &Path, args: &[&str]) -> Vec<String> {
        let mut all = Vec::new();
        all.extend(EXTRA_JAVA_ARGS.iter().map(ToString::to_string));
        all.extend(self.settings.java_options.iter().cloned());
        all.push("-classpath".to_string());
        all.push(self.classpath.clone());
        all.push(main_class.to_string());
        all.push("-f".to_string());
        all.push(project_dir.display().to_string());
        all.extend(self.settings.flowman_options.iter().cloned());
        for profile in &self.settings.profiles {
            all.push("-P".to_string());
            all.push(profile.clone());
        }
        for entry in &self.settings.environment {
            all.push("-D".to_string());
            all.push(entry.clone());
        }
        for entry in &self.settings.config {
            all.push("--conf".to_string());
            all.push(entry.clone());
        }
        all.extend(args.iter().map(ToString::to_string));
        all
    }

    /// Process environment for one invocation. `FLOWMAN_HOME` and
    /// `FLOWMAN_CONF_DIR` are always set, empty when not applicable.
    fn build_env(&self) -> Vec<(String, String)> {
        let mut env = vec![
            (
                ENV_FLOWMAN_HOME.to_string(),
                self.home_dir.as_ref().map(|dir| dir.display().to_string()).unwrap_or_default(),
            ),
            (
                ENV_FLOWMAN_CONF_DIR.to_string(),
                self.conf_dir.as_ref().map(|dir| dir.display().to_string()).unwrap_or_default(),
            ),
        ];
        env.extend(split_settings(&self.settings.system_environment));
        env
    }
}

/// Locate the `java` executable: `$JAVA_HOME/bin/java` when set, otherwise
/// `PATH` discovery.
fn find_java() -> Result<PathBuf, FlowpackError> {
    if let Ok(home) = std::env::var("JAVA_HOME") {
        if !home.is_empty() {
            let binary = if cfg!(windows) { "java.exe" } else { "java" };
            let candidate = Path::new(&home).join("bin").join(binary);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }
    which::which("java").map_err(|_| FlowpackError::JavaNotFound)
}
