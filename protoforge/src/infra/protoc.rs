//! Schema compiler subprocess boundary

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

use crate::domain::ProtocPlugin;
use crate::error::{Error, Result};

/// A fully constructed compiler invocation
#[derive(Debug, Clone)]
pub struct ProtocInvocation {
    /// Compiler executable path or name
    pub protoc: PathBuf,
    /// Complete argument vector, in compiler order
    pub args: Vec<OsString>,
}

impl ProtocInvocation {
    /// Human-readable command name for error messages
    pub fn command_display(&self) -> String {
        self.protoc.display().to_string()
    }
}

/// Build the compiler argument vector:
/// include paths (in order), then per-plugin output/plugin-executable
/// pairs (in plugin order), then the schema file paths.
///
/// Include paths are passed as given: the caller puts the local source
/// directory first so local schemas shadow vendored ones. Output
/// directories, plugin executables and schema paths are absolutized, since
/// the compiler resolves them independently of our working directory.
pub fn build_args(
    include_paths: &[PathBuf],
    plugins: &[ProtocPlugin],
    proto_files: &[PathBuf],
) -> Result<Vec<OsString>> {
    let mut args = Vec::new();

    for include in include_paths {
        let mut arg = OsString::from("-I");
        arg.push(include.as_os_str());
        args.push(arg);
    }

    for plugin in plugins {
        let mut out = OsString::from(format!("--{}_out=", plugin.name));
        out.push(absolute(&plugin.output_dir)?.as_os_str());
        args.push(out);

        if let Some(executable) = &plugin.executable {
            let mut exe = OsString::from(format!("--plugin=protoc-gen-{}=", plugin.name));
            exe.push(absolute(executable)?.as_os_str());
            args.push(exe);
        }
    }

    for proto in proto_files {
        args.push(absolute(proto)?.into_os_string());
    }

    Ok(args)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .map_err(|e| Error::Internal(format!("Failed to absolutize {}: {}", path.display(), e)))
}

/// Subprocess seam for the schema compiler
///
/// The production implementation shells out; tests substitute a mock so the
/// cached-generation policy can be exercised without a compiler binary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProtocRunner: Send + Sync {
    /// Run the compiler to completion and return its exit code
    async fn run(&self, invocation: ProtocInvocation) -> Result<i32>;
}

/// Runs the real compiler executable as a child process
pub struct SystemProtocRunner;

#[async_trait]
impl ProtocRunner for SystemProtocRunner {
    async fn run(&self, invocation: ProtocInvocation) -> Result<i32> {
        let mut child = Command::new(&invocation.protoc)
            .args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::CompilerInvocation {
                command: invocation.command_display(),
                source: e,
            })?;

        let stdout = child.stdout.take().expect("stdout not captured");
        let stderr = child.stderr.take().expect("stderr not captured");

        // Relay compiler diagnostics into our log
        let stdout_handle = tokio::spawn(async move {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!("protoc: {}", line);
            }
        });

        let stderr_handle = tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!("protoc: {}", line);
            }
        });

        let status = child.wait().await.map_err(|e| Error::CompilerInvocation {
            command: invocation.command_display(),
            source: e,
        })?;

        let _ = stdout_handle.await;
        let _ = stderr_handle.await;

        Ok(status.code().unwrap_or(-1))
    }
}

/// Ask the compiler for its version string (e.g. "libprotoc 3.21.12")
pub async fn probe_version(protoc: &Path) -> Result<String> {
    let output = Command::new(protoc)
        .arg("--version")
        .output()
        .await
        .map_err(|e| Error::CompilerInvocation {
            command: protoc.display().to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(Error::CompilerExit {
            code: output.status.code().unwrap_or(-1),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
