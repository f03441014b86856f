// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    empty_file = { "" },
    whitespace = { "  \n" },
    null       = { "null" },
    empty_list = { "[]" },
)]
fn blank_inbox_reads_empty(contents: &str) {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime");
    let result = rt.block_on(async {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("callbacks.json");
        std::fs::write(&path, contents)?;
        CallbackInbox::new(path).read().await
    });
    assert!(matches!(result.as_deref(), Ok([])), "got {result:?}");
}

#[tokio::test]
async fn missing_inbox_reads_empty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let inbox = CallbackInbox::new(dir.path().join("callbacks.json"));
    assert!(inbox.read().await?.is_empty());
    inbox.clear().await?;
    Ok(())
}

#[tokio::test]
async fn reads_records_in_order() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("callbacks.json");
    std::fs::write(&path, r#"[{"code":"c1","state":"s1"},{"code":"c2","state":"s2"}]"#)?;

    let records = CallbackInbox::new(path).read().await?;
    assert_eq!(
        records,
        vec![
            CallbackRecord { code: "c1".into(), state: "s1".into() },
            CallbackRecord { code: "c2".into(), state: "s2".into() },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn accepts_pascal_case_records() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("callbacks.json");
    std::fs::write(&path, r#"[{"Code":"c1","State":"s1","Username":null}]"#)?;

    let records = CallbackInbox::new(path).read().await?;
    assert_eq!(records, vec![CallbackRecord { code: "c1".into(), state: "s1".into() }]);
    Ok(())
}

#[tokio::test]
async fn malformed_inbox_is_an_error_and_left_in_place() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("callbacks.json");
    std::fs::write(&path, "{not json")?;

    let inbox = CallbackInbox::new(path.clone());
    assert!(inbox.read().await.is_err());
    assert!(path.exists());
    Ok(())
}

#[tokio::test]
async fn clear_removes_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("callbacks.json");
    std::fs::write(&path, r#"[{"code":"c","state":"s"}]"#)?;

    let inbox = CallbackInbox::new(path.clone());
    inbox.clear().await?;
    assert!(!path.exists());
    assert!(inbox.read().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn reject_moves_inbox_aside() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("callbacks.json");
    std::fs::write(&path, "{not json")?;

    let inbox = CallbackInbox::new(path.clone());
    let rejected = inbox.reject().await?;

    assert!(!path.exists());
    assert_eq!(std::fs::read_to_string(&rejected)?, "{not json");
    let name = rejected.file_name().unwrap_or_default().to_string_lossy().into_owned();
    assert!(name.starts_with("callbacks.json.") && name.ends_with(".rejected"), "{name}");
    assert!(inbox.read().await?.is_empty());
    Ok(())
}
