// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

use super::*;

fn fake_binary() -> tempfile::NamedTempFile {
    tempfile::NamedTempFile::new().unwrap()
}

#[test]
fn registers_a_plugin_with_a_real_binary() {
    let bin = fake_binary();
    let mut registry = PluginRegistry::new();
    registry
        .register("my-plugin", bin.path().to_str().unwrap())
        .unwrap();
    assert!(registry.contains("my-plugin"));
}

#[test]
fn rejects_duplicate_names() {
    let bin = fake_binary();
    let mut registry = PluginRegistry::new();
    registry
        .register("my-plugin", bin.path().to_str().unwrap())
        .unwrap();
    let err = registry
        .register("my-plugin", bin.path().to_str().unwrap())
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestNotSupported);
}

#[test]
fn rejects_nonexistent_binary() {
    let mut registry = PluginRegistry::new();
    assert!(registry.register("ghost", "/no/such/binary --flag").is_err());
}

#[test]
fn rejects_directory_as_binary() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = PluginRegistry::new();
    assert!(registry.register("dirplugin", dir.path().to_str().unwrap()).is_err());
}

#[test]
fn with_default_preregisters_odc_rp_same() {
    let bin = fake_binary();
    let registry = PluginRegistry::with_default(bin.path().to_str().unwrap()).unwrap();
    assert!(registry.contains("odc-rp-same"));
}

#[tokio::test]
async fn exec_rejects_unregistered_plugin() {
    let registry = PluginRegistry::new();
    let err = registry
        .exec("missing", "{}", &PartitionId::from("p1"), RunNr::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestNotSupported);
}

#[tokio::test]
async fn exec_passes_res_and_id_flags_to_the_plugin() {
    let script = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(script.path(), "#!/bin/sh\necho \"$@\"\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(script.path()).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(script.path(), perms).unwrap();
    }

    let mut registry = PluginRegistry::new();
    registry.register("echo-plugin", script.path().to_str().unwrap()).unwrap();

    let out = registry
        .exec("echo-plugin", "{\"n\":4}", &PartitionId::from("part-1"), RunNr::default())
        .await
        .unwrap();
    assert!(out.stdout.contains("--res"));
    assert!(out.stdout.contains("part-1"));
}
