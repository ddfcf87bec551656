// tests/driver_lifecycle.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use onchange::cli::CliArgs;
use onchange::driver::Driver;
use onchange::errors::OnchangeError;
use onchange::fs::mock::MockFileSystem;
use onchange_test_utils::builders::canonical;
use onchange_test_utils::{
    ChannelRegistry, FakeRunner, TreeBuilder, eventually, init_tracing, with_timeout,
};

type TestResult = Result<(), Box<dyn Error>>;

fn project() -> TreeBuilder {
    TreeBuilder::new()
        .script(".onchange", "#!/bin/sh\n")
        .file("readme.md", "hello")
        .script("sub/.onchange", "#!/bin/sh\n")
        .file("plain/notes.txt", "nothing to see")
}

#[tokio::test]
async fn start_registers_every_reactive_directory() -> TestResult {
    with_timeout(async {
        init_tracing();
        let tree = project().build();

        let (registry, handle) = ChannelRegistry::new();
        let mut driver = Driver::new(registry, FakeRunner::new());

        assert!(driver.start(".onchange", tree.path())?);

        let mut registered = handle.registered();
        registered.sort();
        assert_eq!(
            registered,
            vec![canonical(tree.path(), ""), canonical(tree.path(), "sub")]
        );
        assert_eq!(driver.root(), Some(canonical(tree.path(), "").as_path()));
        let discovery = driver.discovery().expect("discovery recorded after start");
        assert_eq!(discovery.len(), 2);
        assert!(discovery.contains(&canonical(tree.path(), "sub")));

        driver.stop();
        let report = driver.join().await?;
        assert_eq!(report.started, 0);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn events_run_the_script_next_to_the_changed_file() -> TestResult {
    with_timeout(async {
        init_tracing();
        let tree = project().build();
        let root = canonical(tree.path(), "");

        let (registry, handle) = ChannelRegistry::new();
        let runner = FakeRunner::new();
        let mut driver = Driver::new(registry, runner.clone());
        driver.start(".onchange", tree.path())?;

        handle.create(root.join("x.txt"));
        eventually(|| runner.finished() == 1).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.modify(root.join("sub/y.txt"));
        eventually(|| runner.finished() == 2).await;

        driver.stop();
        let report = driver.join().await?;
        assert_eq!(report.started, 2);

        let runs: Vec<(PathBuf, PathBuf)> = runner
            .invocations()
            .into_iter()
            .map(|i| (i.script, i.target))
            .collect();
        assert_eq!(
            runs,
            vec![
                (root.join(".onchange"), root.join("x.txt")),
                (root.join("sub/.onchange"), root.join("sub/y.txt")),
            ]
        );
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn no_scripts_means_not_found_and_nothing_watched() -> TestResult {
    with_timeout(async {
        init_tracing();
        let tree = TreeBuilder::new().file("a/b/c.txt", "x").build();

        let (registry, handle) = ChannelRegistry::new();
        let mut driver = Driver::new(registry, FakeRunner::new());

        assert!(!driver.start(".onchange", tree.path())?);
        assert!(handle.registered().is_empty());

        driver.stop();
        assert_eq!(driver.join().await?.started, 0);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn unreadable_directory_aborts_startup() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/proj/.onchange");
    fs.deny_read("/proj/locked");

    let (registry, handle) = ChannelRegistry::new();
    let mut driver = Driver::new(registry, FakeRunner::new()).with_file_system(Arc::new(fs));

    match driver.start(".onchange", Path::new("/proj")) {
        Err(OnchangeError::Walk { path, .. }) => assert_eq!(path, PathBuf::from("/proj/locked")),
        other => panic!("expected walk error, got {other:?}"),
    }
    // Nothing is registered from a partial walk.
    assert!(handle.registered().is_empty());
    Ok(())
}

#[tokio::test]
async fn watch_failure_aborts_startup() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/proj/.onchange");
    fs.add_file("/proj/sub/.onchange");

    let (registry, _handle) = ChannelRegistry::new();
    let registry = registry.fail_on("/proj/sub");
    let mut driver = Driver::new(registry, FakeRunner::new()).with_file_system(Arc::new(fs));

    match driver.start(".onchange", Path::new("/proj")) {
        Err(OnchangeError::Watch { path, .. }) => assert_eq!(path, PathBuf::from("/proj/sub")),
        other => panic!("expected watch error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn starting_twice_is_rejected() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/proj/.onchange");

    let (registry, _handle) = ChannelRegistry::new();
    let mut driver = Driver::new(registry, FakeRunner::new()).with_file_system(Arc::new(fs));

    assert!(driver.start(".onchange", Path::new("/proj"))?);
    assert!(matches!(
        driver.start(".onchange", Path::new("/proj")),
        Err(OnchangeError::AlreadyStarted)
    ));
    Ok(())
}

#[tokio::test]
async fn run_returns_immediately_when_no_scripts_exist() -> TestResult {
    use clap::Parser;

    with_timeout(async {
        init_tracing();
        let tree = TreeBuilder::new().file("src/main.rs", "fn main() {}").build();
        let root = tree.path().to_string_lossy().into_owned();

        let args = CliArgs::try_parse_from(["onchange", "--root", root.as_str()])?;
        onchange::run(args).await?;
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn version_flag_skips_watching() -> TestResult {
    use clap::Parser;

    // A root that does not exist would be fatal if anything were walked.
    let args = CliArgs::try_parse_from(["onchange", "-v", "--root", "/definitely/not/here"])?;
    onchange::run(args).await?;
    Ok(())
}
