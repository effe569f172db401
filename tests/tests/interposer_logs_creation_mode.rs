use common::{audit_records, cleanup_tmp_dir, common_test_setup, find_interposer, run_worker};

// open() may be reached through its open64() alias depending on how the
// caller was compiled
fn open_record<'a>(records: &'a [String], arguments: &str) -> Option<&'a String> {
    records.iter().find(|r| {
        (r.contains(" open(") || r.contains(" open64(")) && r.ends_with(arguments)
    })
}

#[test]
fn interposer_logs_creation_mode() {
    common_test_setup();
    let interposer = find_interposer();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("created");
    let path_str = path.to_str().unwrap();

    let output = run_worker(&["create", path_str], Some(&interposer));
    assert_eq!(output.status.code(), Some(0), "{:?}", output);
    assert!(path.exists());
    let records = audit_records(&output);
    let with_mode = format!(
        "(\"{}\", {:#x}, 0o640)",
        path_str,
        libc::O_CREAT | libc::O_WRONLY
    );
    assert!(
        open_record(&records, &with_mode).is_some(),
        "{} not found in {:?}",
        with_mode,
        records
    );

    // Opening without O_CREAT: no mode is read, so none is recorded
    let output = run_worker(&["plain", path_str], Some(&interposer));
    assert_eq!(output.status.code(), Some(0), "{:?}", output);
    let records = audit_records(&output);
    let without_mode = format!("(\"{}\", {:#x})", path_str, libc::O_RDONLY);
    assert!(
        open_record(&records, &without_mode).is_some(),
        "{} not found in {:?}",
        without_mode,
        records
    );

    cleanup_tmp_dir(dir);
}
