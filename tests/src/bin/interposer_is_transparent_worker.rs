use libc::{c_char, c_int};
use std::ffi::{CStr, CString};

// Prints the outcome of each call on its own line, so that a run with the
// interposer preloaded can be compared with a run without it. Descriptor
// numbers and inode numbers are left out: only success and errno matter.

fn errno() -> c_int {
    unsafe { *(libc::__errno_location()) }
}

fn report(name: &str, res: i64) {
    if res < 0 {
        println!("{} -1 errno={}", name, errno());
    } else {
        println!("{} ok", name);
    }
}

fn report_value(name: &str, res: i64) {
    println!("{} {}", name, res);
}

fn path(dir: &str, name: &str) -> CString {
    CString::new(format!("{}/{}", dir, name)).unwrap()
}

fn filesystem(dir: &str) {
    let sub = path(dir, "sub");
    let file = path(dir, "sub/file");
    let hard = path(dir, "sub/hard");
    let soft = path(dir, "sub/soft");
    let renamed = path(dir, "sub/renamed");
    let absent = path(dir, "absent");
    let data = b"integrity";

    unsafe {
        report("mkdir", libc::mkdir(sub.as_ptr(), 0o755) as i64);
        report("mkdir_again", libc::mkdir(sub.as_ptr(), 0o755) as i64);
        report("access_absent", libc::access(absent.as_ptr(), libc::F_OK) as i64);
        let fd = libc::open(file.as_ptr(), libc::O_CREAT | libc::O_WRONLY, 0o600 as libc::c_uint);
        report("open_create", fd as i64);
        report(
            "write",
            libc::write(fd, data.as_ptr() as *const _, data.len()) as i64,
        );
        report("write_badfd", libc::write(-1, data.as_ptr() as *const _, data.len()) as i64);
        let mut st: libc::stat = std::mem::zeroed();
        report("fstat", libc::fstat(fd, &mut st) as i64);
        report_value("fstat_size", st.st_size as i64);
        report("fchmod", libc::fchmod(fd, 0o640) as i64);
        report("close", libc::close(fd) as i64);
        report("chmod", libc::chmod(file.as_ptr(), 0o644) as i64);
        report("chmod_absent", libc::chmod(absent.as_ptr(), 0o644) as i64);
        report("chown_unchanged", libc::chown(file.as_ptr(), u32::MAX, u32::MAX) as i64);
        report("link", libc::link(file.as_ptr(), hard.as_ptr()) as i64);
        report("link_again", libc::link(file.as_ptr(), hard.as_ptr()) as i64);
        report("symlink", libc::symlink(file.as_ptr(), soft.as_ptr()) as i64);
        let mut buf = [0 as c_char; 256];
        let n = libc::readlink(soft.as_ptr(), buf.as_mut_ptr(), buf.len());
        report("readlink", n as i64);
        report_value("readlink_len", n as i64 - dir.len() as i64);
        report("readlink_file", libc::readlink(file.as_ptr(), buf.as_mut_ptr(), buf.len()) as i64);
        report("rename", libc::rename(hard.as_ptr(), renamed.as_ptr()) as i64);
        report("rename_absent", libc::rename(hard.as_ptr(), renamed.as_ptr()) as i64);

        let dirp = libc::opendir(sub.as_ptr());
        let mut names = vec![];
        loop {
            *(libc::__errno_location()) = 0;
            let entry = libc::readdir(dirp);
            if entry.is_null() {
                report_value("readdir_end_errno", errno() as i64);
                break;
            }
            names.push(CStr::from_ptr((*entry).d_name.as_ptr()).to_string_lossy().into_owned());
        }
        libc::closedir(dirp);
        names.sort();
        println!("readdir {}", names.join(","));

        report("rmdir_not_empty", libc::rmdir(sub.as_ptr()) as i64);
        report("unlink_soft", libc::unlink(soft.as_ptr()) as i64);
        report("unlink_renamed", libc::unlink(renamed.as_ptr()) as i64);
        report("unlinkat", libc::unlinkat(libc::AT_FDCWD, file.as_ptr(), 0) as i64);
        report("unlink_absent", libc::unlink(absent.as_ptr()) as i64);
        report("rmdir", libc::rmdir(sub.as_ptr()) as i64);
    }
}

// What a program built against Rust's std ends up calling: the 64-bit file
// offset aliases of the open, stat and directory functions.
fn large_file_aliases(dir: &str) {
    let file = format!("{}/file", dir);
    report_value(
        "fs_write",
        std::fs::write(&file, b"integrity").map_or(-1, |()| 0),
    );
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            println!("read_dir {}", names.join(","));
        }
        Err(e) => println!("read_dir error={}", e.raw_os_error().unwrap_or(0)),
    }
    let cfile = CString::new(file.as_str()).unwrap();
    let absent = path(dir, "absent");
    unsafe {
        let mut st: libc::stat64 = std::mem::zeroed();
        report("stat64", libc::stat64(cfile.as_ptr(), &mut st) as i64);
        report_value("stat64_size", st.st_size as i64);
        report("stat64_absent", libc::stat64(absent.as_ptr(), &mut st) as i64);
        let mut fs: libc::statfs64 = std::mem::zeroed();
        report("statfs64", libc::statfs64(cfile.as_ptr(), &mut fs) as i64);
        let fd = libc::openat64(libc::AT_FDCWD, cfile.as_ptr(), libc::O_RDONLY);
        report("openat64", fd as i64);
        report("fstat64", libc::fstat64(fd, &mut st) as i64);
        libc::close(fd);
        report(
            "openat64_absent",
            libc::openat64(libc::AT_FDCWD, absent.as_ptr(), libc::O_RDONLY) as i64,
        );
    }
    report_value("remove_file", std::fs::remove_file(&file).map_or(-1, |()| 0));
}

fn identity() {
    unsafe {
        report_value("getuid", libc::getuid() as i64);
        report_value("geteuid", libc::geteuid() as i64);
        report_value("getgid", libc::getgid() as i64);
        report_value("getegid", libc::getegid() as i64);
        report_value("getgroups", libc::getgroups(0, std::ptr::null_mut()) as i64);
        let (mut r, mut e, mut s) = (0, 0, 0);
        report("getresuid", libc::getresuid(&mut r, &mut e, &mut s) as i64);
        println!("resuid {} {} {}", r, e, s);
        report("getresgid", libc::getresgid(&mut r, &mut e, &mut s) as i64);
        println!("resgid {} {} {}", r, e, s);
    }
}

fn exec_failure() {
    let program = CString::new("/nonexistent/integrity/program").unwrap();
    let argv = [program.as_ptr(), std::ptr::null()];
    let envp = [std::ptr::null()];
    report(
        "execve",
        unsafe { libc::execve(program.as_ptr(), argv.as_ptr(), envp.as_ptr()) } as i64,
    );
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("filesystem") if args.len() == 3 => filesystem(&args[2]),
        Some("large-file") if args.len() == 3 => large_file_aliases(&args[2]),
        Some("identity") => identity(),
        Some("exec") => exec_failure(),
        _ => {
            eprintln!("Usage: {} filesystem DIR | large-file DIR | identity | exec", args[0]);
            std::process::exit(2);
        }
    }
}
