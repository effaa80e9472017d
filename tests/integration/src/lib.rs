//! Integration test helpers for protoforge
//!
//! Each test builds a disposable project: schema sources, dependency
//! archives, and a fake schema compiler: a shell script that records its
//! argument vector and emits one generated file per schema, standing in
//! for the real `protoc` binary.

use std::fs::File;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use protoforge::{Config, GeneratedFileFilter, ProtocPlugin};

/// A disposable project layout rooted in a temp directory
///
/// `config` is plain and mutable so tests can adjust plugins or archives
/// before wrapping it in an `Arc` for the services.
pub struct TestProject {
    pub dir: TempDir,
    pub config: Config,
}

impl TestProject {
    /// Create a project with a fake compiler and the standard directory
    /// layout
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.source_dir = dir.path().join("src/protobuf");
        config.extract_dir = dir.path().join("target/protobuf_external");
        config.generated_dir = dir.path().join("target/generated/protobuf");
        config.cache_dir = dir.path().join("target/protoforge-cache");
        config.plugins = vec![ProtocPlugin::new(
            "java",
            config.generated_dir.clone(),
            GeneratedFileFilter::extension("java"),
        )];
        config.protoc_path = write_fake_compiler(dir.path(), 0)
            .to_string_lossy()
            .to_string();

        std::fs::create_dir_all(&config.source_dir).expect("Failed to create source dir");

        Self { dir, config }
    }

    /// Write a schema file under the source directory
    pub fn write_proto(&self, name: &str, content: &str) -> PathBuf {
        let path = self.config.source_dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create proto subdir");
        }
        std::fs::write(&path, content).expect("Failed to write proto");
        path
    }

    /// Write a dependency archive with the given entries
    pub fn write_archive(&self, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = self.dir.path().join(name);
        let file = File::create(&path).expect("Failed to create archive file");
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        for (entry_name, content) in entries {
            writer
                .start_file(*entry_name, options)
                .expect("Failed to start archive entry");
            writer.write_all(content).expect("Failed to write entry");
        }
        writer.finish().expect("Failed to finish archive");
        path
    }

    /// Replace the fake compiler with one that exits with the given code
    pub fn break_compiler(&self, exit_code: i32) {
        write_fake_compiler(self.dir.path(), exit_code);
    }

    /// Argument vector recorded by the fake compiler's last run, one
    /// argument per line; `None` if it never ran
    pub fn recorded_args(&self) -> Option<Vec<String>> {
        let content = std::fs::read_to_string(self.args_file()).ok()?;
        Some(content.lines().map(|l| l.to_string()).collect())
    }

    /// Forget the recorded argument vector
    pub fn clear_recorded_args(&self) {
        let _ = std::fs::remove_file(self.args_file());
    }

    fn args_file(&self) -> PathBuf {
        self.dir.path().join("protoc-args.txt")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the fake compiler script. It records its argv, then emits
/// `<Schema>.java` into the `--java_out` directory for every schema
/// argument, and finally exits with `exit_code`.
fn write_fake_compiler(dir: &Path, exit_code: i32) -> PathBuf {
    let script_path = dir.join("fake-protoc");
    let args_file = dir.join("protoc-args.txt");

    let script = format!(
        r#"#!/bin/sh
printf '%s\n' "$@" > "{args}"
out=""
for arg in "$@"; do
  case "$arg" in
    --java_out=*) out="${{arg#--java_out=}}" ;;
  esac
done
for arg in "$@"; do
  case "$arg" in
    *.proto)
      name=$(basename "$arg" .proto)
      echo "class $name {{}}" > "$out/$name.java"
      ;;
  esac
done
exit {code}
"#,
        args = args_file.display(),
        code = exit_code
    );

    std::fs::write(&script_path, script).expect("Failed to write fake compiler");
    let mut perms = std::fs::metadata(&script_path)
        .expect("Failed to stat fake compiler")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script_path, perms).expect("Failed to chmod fake compiler");

    script_path
}
