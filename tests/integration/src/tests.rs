//! End-to-end tests for the protoforge pipeline
//!
//! Every test runs the real services against a fake schema compiler (a
//! shell script recording its argv and emitting one generated file per
//! schema), so no protoc installation is required.

use std::sync::Arc;

use integration_tests::TestProject;
use protoforge::{
    Error, GeneratedFileFilter, GenerationService, ProtocPlugin, SystemProtocRunner, UnpackService,
};

fn services(project: &TestProject) -> (UnpackService, GenerationService) {
    let config = Arc::new(project.config.clone());
    (
        UnpackService::new(config.clone()),
        GenerationService::new(config, Arc::new(SystemProtocRunner)),
    )
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_unpack_then_generate_end_to_end() {
    let mut project = TestProject::new();
    let archive = project.write_archive(
        "schemas.jar",
        &[
            ("vendor/common.proto", b"syntax = \"proto2\";".as_slice()),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0".as_slice()),
        ],
    );
    project.config.dependency_archives = vec![archive];
    project.write_proto("greeter.proto", "syntax = \"proto2\";");

    let (unpack, generation) = services(&project);

    let unpacked = unpack.unpack().await.expect("Failed to unpack");
    assert_eq!(unpacked.files.len(), 1);
    assert!(unpacked
        .extract_dir
        .join("vendor/common.proto")
        .is_file());

    let outcome = generation.generate().await.expect("Failed to generate");
    assert!(outcome.compiler_ran);
    assert_eq!(
        outcome.generated_files,
        vec![project.config.generated_dir.join("greeter.java")]
    );
    assert!(outcome.generated_files[0].is_file());
}

#[tokio::test]
async fn test_include_paths_local_source_shadows_vendored() {
    let project = TestProject::new();
    project.write_proto("greeter.proto", "syntax = \"proto2\";");

    let (_, generation) = services(&project);
    generation.generate().await.expect("Failed to generate");

    let args = project.recorded_args().expect("Compiler should have run");
    assert_eq!(
        args[0],
        format!("-I{}", project.config.source_dir.display())
    );
    assert_eq!(
        args[1],
        format!("-I{}", project.config.extract_dir.display())
    );
    assert!(args.iter().any(|a| a.starts_with("--java_out=")));
    assert!(args
        .last()
        .expect("Args should not be empty")
        .ends_with("greeter.proto"));
}

#[tokio::test]
async fn test_external_plugin_arguments_in_order() {
    let mut project = TestProject::new();
    let grpc_out = project.dir.path().join("target/generated/grpc");
    project.config.plugins.push(
        ProtocPlugin::new("grpc", &grpc_out, GeneratedFileFilter::extension("java"))
            .with_executable(project.dir.path().join("protoc-gen-grpc")),
    );
    project.write_proto("greeter.proto", "syntax = \"proto2\";");

    let (_, generation) = services(&project);
    generation.generate().await.expect("Failed to generate");

    let args = project.recorded_args().expect("Compiler should have run");
    let java_out = args
        .iter()
        .position(|a| a.starts_with("--java_out="))
        .expect("Missing --java_out");
    let grpc_out_pos = args
        .iter()
        .position(|a| a.starts_with("--grpc_out="))
        .expect("Missing --grpc_out");
    let plugin_pos = args
        .iter()
        .position(|a| a.starts_with("--plugin=protoc-gen-grpc="))
        .expect("Missing --plugin");

    assert!(java_out < grpc_out_pos);
    assert_eq!(plugin_pos, grpc_out_pos + 1);

    // Plugin output directories exist even when the plugin emitted nothing
    assert!(grpc_out.is_dir());
}

// ============================================================================
// Cache Tests
// ============================================================================

#[tokio::test]
async fn test_second_run_does_not_reinvoke_compiler() {
    let project = TestProject::new();
    project.write_proto("greeter.proto", "syntax = \"proto2\";");

    let (_, generation) = services(&project);

    let first = generation.generate().await.expect("First run failed");
    assert!(first.compiler_ran);

    project.clear_recorded_args();
    let second = generation.generate().await.expect("Second run failed");

    assert!(!second.compiler_ran);
    assert!(project.recorded_args().is_none());
    assert_eq!(second.generated_files, first.generated_files);
}

#[tokio::test]
async fn test_touched_schema_reinvokes_compiler() {
    let project = TestProject::new();
    project.write_proto("greeter.proto", "syntax = \"proto2\";");

    let (_, generation) = services(&project);
    generation.generate().await.expect("First run failed");

    project.clear_recorded_args();
    project.write_proto("greeter.proto", "syntax = \"proto2\"; // touched");

    let second = generation.generate().await.expect("Second run failed");
    assert!(second.compiler_ran);
    assert!(project.recorded_args().is_some());
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_compiler_exit_code_propagates_and_no_record_remains() {
    let project = TestProject::new();
    project.write_proto("greeter.proto", "syntax = \"proto2\";");
    project.break_compiler(7);

    let (_, generation) = services(&project);

    let err = generation.generate().await.expect_err("Run should fail");
    assert!(matches!(err, Error::CompilerExit { code: 7 }));
    assert!(err.to_string().contains('7'));

    let record = project
        .config
        .cache_dir
        .join(format!("{}.json", project.config.cache_namespace));
    assert!(!record.exists());
}

#[tokio::test]
async fn test_missing_compiler_is_invocation_failure() {
    let mut project = TestProject::new();
    project.config.protoc_path = "protoforge-no-such-compiler".to_string();
    project.write_proto("greeter.proto", "syntax = \"proto2\";");

    let (_, generation) = services(&project);

    let err = generation.generate().await.expect_err("Run should fail");
    assert!(matches!(err, Error::CompilerInvocation { .. }));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[tokio::test]
async fn test_runtime_dependency_follows_plugin_configuration() {
    let mut project = TestProject::new();

    // Default built-in target: dependency added
    let dep = project
        .config
        .runtime_dependency()
        .expect("Default config should add the runtime dependency");
    assert_eq!(dep.to_string(), "protobuf-java:2.4.1");

    // Only an executable-backed plugin: dependency suppressed
    project.config.plugins = vec![ProtocPlugin::new(
        "grpc",
        project.dir.path().join("target/generated/grpc"),
        GeneratedFileFilter::extension("java"),
    )
    .with_executable(project.dir.path().join("protoc-gen-grpc"))];
    assert!(project.config.runtime_dependency().is_none());
}
