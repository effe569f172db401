use std::ffi::CString;

// Opens the given path, creating it with mode 0640 if asked to. Exits with
// the errno of open() on failure.
fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 || (args[1] != "create" && args[1] != "plain") {
        eprintln!("Usage: {} create|plain PATH", args[0]);
        std::process::exit(2);
    }
    let path = CString::new(args[2].as_str()).unwrap();
    let fd = if args[1] == "create" {
        unsafe { libc::open(path.as_ptr(), libc::O_CREAT | libc::O_WRONLY, 0o640 as libc::c_uint) }
    } else {
        unsafe { libc::open(path.as_ptr(), libc::O_RDONLY) }
    };
    if fd < 0 {
        std::process::exit(std::io::Error::last_os_error().raw_os_error().unwrap_or(1));
    }
    unsafe { libc::close(fd) };
}
