//! Runs in its own test binary because it installs the global subscriber.

#[test]
fn init_writes_into_the_requested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("nested").join("logs");

    let guard = bhavna::logging::init(&logs).expect("first init succeeds");
    assert_eq!(guard.log_dir(), logs.as_path());
    tracing::info!("hello from the test");

    assert!(bhavna::logging::init(&logs).is_none(), "second init is refused");
    drop(guard);

    let names: Vec<String> = std::fs::read_dir(&logs)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().any(|n| n.starts_with("bhavna.log")), "{names:?}");
}
