// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ODC Contributors

use super::*;

#[tokio::test]
async fn captures_stdout_of_a_successful_command() {
    let out = run("echo hello", &[], &HashMap::new(), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(out.stdout.trim(), "hello");
    assert_eq!(out.exit_code, Some(0));
}

#[tokio::test]
async fn non_zero_exit_is_resource_plugin_failed() {
    let err = run("exit 7", &[], &HashMap::new(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourcePluginFailed);
}

#[tokio::test]
async fn env_overlay_is_visible_to_the_child() {
    let mut env = HashMap::new();
    env.insert("ODC_TEST_VAR".to_string(), "plugin-value".to_string());
    let out = run("echo $ODC_TEST_VAR", &[], &env, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(out.stdout.trim(), "plugin-value");
}

#[tokio::test]
async fn timeout_is_enforced() {
    let err = run("sleep 5", &[], &HashMap::new(), Duration::from_millis(50))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourcePluginFailed);
    assert!(err.details.contains("timed out"));
}

#[tokio::test]
async fn args_are_shell_escaped() {
    let out = run(
        "echo",
        &["it's a test".to_string()],
        &HashMap::new(),
        Duration::from_secs(5),
    )
    .await
    .unwrap();
    assert_eq!(out.stdout.trim(), "it's a test");
}
