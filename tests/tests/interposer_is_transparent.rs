use common::{
    audit_records, cleanup_tmp_dir, common_test_setup, find_interposer, libc_exports, run_worker,
};

fn scenario_is_transparent(args: &[&str], preloaded_args: &[&str], expected_symbols: &[&str]) {
    let interposer = find_interposer();
    let plain = run_worker(args, None);
    let preloaded = run_worker(preloaded_args, Some(&interposer));
    assert_eq!(plain.status.code(), Some(0), "{:?}", plain);
    assert_eq!(preloaded.status.code(), plain.status.code());
    assert_eq!(
        String::from_utf8_lossy(&preloaded.stdout),
        String::from_utf8_lossy(&plain.stdout),
        "results differ once the interposer is preloaded"
    );
    assert!(audit_records(&plain).is_empty());
    let records = audit_records(&preloaded);
    for symbol in expected_symbols {
        let call = format!(" {}(", symbol);
        assert!(
            records.iter().any(|r| r.contains(&call)),
            "no record of {}() in {:?}",
            symbol,
            records
        );
    }
}

#[test]
fn filesystem_calls_are_transparent() {
    common_test_setup();
    let plain_dir = tempfile::tempdir().unwrap();
    let preloaded_dir = tempfile::tempdir().unwrap();
    scenario_is_transparent(
        &["filesystem", plain_dir.path().to_str().unwrap()],
        &["filesystem", preloaded_dir.path().to_str().unwrap()],
        &[
            "mkdir", "access", "write", "fchmod", "chmod", "chown", "link", "symlink",
            "readlink", "rename", "readdir", "rmdir", "unlink", "unlinkat",
        ],
    );
    cleanup_tmp_dir(plain_dir);
    cleanup_tmp_dir(preloaded_dir);
}

#[test]
fn large_file_aliases_are_transparent() {
    common_test_setup();
    let plain_dir = tempfile::tempdir().unwrap();
    let preloaded_dir = tempfile::tempdir().unwrap();
    // stat64() and fstat64() are linked statically into programs built
    // against glibc before 2.33, and cannot be interposed there
    let mut expected = vec!["open64", "write", "readdir64", "statfs64", "openat64"];
    for symbol in ["stat64", "fstat64"] {
        if libc_exports(symbol) {
            expected.push(symbol);
        }
    }
    scenario_is_transparent(
        &["large-file", plain_dir.path().to_str().unwrap()],
        &["large-file", preloaded_dir.path().to_str().unwrap()],
        &expected,
    );
    cleanup_tmp_dir(plain_dir);
    cleanup_tmp_dir(preloaded_dir);
}

#[test]
fn identity_queries_are_transparent() {
    common_test_setup();
    scenario_is_transparent(
        &["identity"],
        &["identity"],
        &["getuid", "geteuid", "getgid", "getegid", "getgroups", "getresuid", "getresgid"],
    );
}

#[test]
fn failed_exec_is_transparent() {
    common_test_setup();
    scenario_is_transparent(&["exec"], &["exec"], &["execve"]);
}

#[test]
fn records_go_to_the_configured_descriptor() {
    common_test_setup();
    let interposer = find_interposer();
    let output = std::process::Command::new(common::get_worker_bin_path())
        .arg("identity")
        .env("LD_PRELOAD", &interposer)
        .env("INTEGRITY_AUDIT_FD", "1")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(audit_records(&output).is_empty());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.lines().any(|l| l.starts_with("integrity-audit[") && l.contains(" getuid()")),
        "{}",
        stdout
    );

    let silent = std::process::Command::new(common::get_worker_bin_path())
        .arg("identity")
        .env("LD_PRELOAD", &interposer)
        .env("INTEGRITY_AUDIT_LEVEL", "off")
        .output()
        .unwrap();
    assert_eq!(silent.status.code(), Some(0));
    assert!(audit_records(&silent).is_empty());
}
