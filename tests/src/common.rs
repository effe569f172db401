use log::info;
use simple_logger::SimpleLogger;
use std::ffi::{CString, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Common functions used by all tests for setup / check / teardown

/// Overrides where the interposer library is looked for
pub const INTERPOSER_PATH_ENV_NAME: &str = "INTEGRITY_AUDIT_LIBRARY";

pub fn common_test_setup() {
    // Tests run in parallel in the same process: only the first one gets to set the logger
    let _ = SimpleLogger::new().with_level(log::LevelFilter::Info).env().init();
}

// Don't implement this as a standard Drop trait on a struct, we want precise
// control over when the tmp dir is cleaned up between different assert/panic()s (which would trigger drop())
pub fn cleanup_tmp_dir(dir: tempfile::TempDir) {
    let path = dir.path().to_owned();
    dir.close().unwrap_or_else(|e| {
        panic!("Unable to remove temporary directory {}: {}", path.display(), e)
    });
}

/// Finds the worker binary built alongside the running test
/// (`tests/foo.rs` uses `src/bin/foo_worker.rs`).
pub fn get_worker_bin_path() -> PathBuf {
    let exe = std::env::current_exe().unwrap();
    let test_name = exe
        .file_stem()
        .unwrap()
        .to_str()
        .unwrap()
        .rsplitn(2, '-')
        .last()
        .unwrap();
    let file_name = format!("{}_worker", test_name);
    let ext = exe.extension().map(OsString::from);
    let mut dir = exe.clone();
    let mut worker_binary;
    loop {
        dir = dir
            .parent()
            .unwrap_or_else(|| {
                panic!(
                    "worker binary {} not found in any parent directory of {}",
                    &file_name,
                    exe.to_string_lossy()
                )
            })
            .to_path_buf();
        worker_binary = dir.with_file_name(&file_name);
        if let Some(ext) = &ext {
            worker_binary.set_extension(ext);
        }
        if worker_binary.exists() {
            break;
        }
    }
    info!("Worker binary: {}", worker_binary.display());
    worker_binary
}

/// Path of the interposer shared object, built by this crate's build script
/// unless overridden through `INTEGRITY_AUDIT_LIBRARY`.
pub fn find_interposer() -> PathBuf {
    let path = match std::env::var_os(INTERPOSER_PATH_ENV_NAME) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(env!("INTEGRITY_AUDIT_BUILT_LIBRARY")),
    };
    if !path.exists() {
        panic!("interposer library {} not found", path.display());
    }
    info!("Interposer library: {}", path.display());
    path
}

/// Whether the C library exports `symbol` dynamically, i.e. whether calls to
/// it can be interposed at all.
pub fn libc_exports(symbol: &str) -> bool {
    let name = CString::new(symbol).unwrap();
    !unsafe { libc::dlsym(libc::RTLD_DEFAULT, name.as_ptr()) }.is_null()
}

/// Runs the worker binary of the current test with `args`, optionally with
/// the interposer preloaded.
pub fn run_worker(args: &[&str], interposer: Option<&Path>) -> Output {
    let mut cmd = Command::new(get_worker_bin_path());
    cmd.args(args)
        .env_remove("LD_PRELOAD")
        .env_remove("INTEGRITY_AUDIT_FD")
        .env_remove("INTEGRITY_AUDIT_LEVEL");
    if let Some(path) = interposer {
        cmd.env("LD_PRELOAD", path);
    }
    cmd.output().expect("unable to run worker binary")
}

/// Audit records found in a worker's stderr.
pub fn audit_records(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter(|l| l.starts_with("integrity-audit["))
        .map(str::to_owned)
        .collect()
}
