// Identity and filesystem functions observed in untrusted programs. The open()
// family takes an optional variadic argument and lives in open.rs.

use crate::display::{Argv, CPath, DirFd};
use libc::{
    c_char, c_int, c_uint, c_void, dev_t, dirent, dirent64, gid_t, mode_t, size_t, ssize_t,
    timespec, timeval, uid_t, utimbuf, DIR,
};

interpose! {
    fn access(path: *const c_char, mode: c_int) -> c_int
        => "{}, {:#o}", CPath(path), mode;
    fn faccessat(dirfd: c_int, path: *const c_char, mode: c_int, flags: c_int) -> c_int
        => "{}, {}, {:#o}, {:#x}", DirFd(dirfd), CPath(path), mode, flags;

    fn chmod(path: *const c_char, mode: mode_t) -> c_int
        => "{}, {:#o}", CPath(path), mode;
    fn fchmod(fd: c_int, mode: mode_t) -> c_int
        => "{}, {:#o}", fd, mode;
    fn fchmodat(dirfd: c_int, path: *const c_char, mode: mode_t, flags: c_int) -> c_int
        => "{}, {}, {:#o}, {:#x}", DirFd(dirfd), CPath(path), mode, flags;

    fn chown(path: *const c_char, owner: uid_t, group: gid_t) -> c_int
        => "{}, {}, {}", CPath(path), owner as i32, group as i32;
    fn fchown(fd: c_int, owner: uid_t, group: gid_t) -> c_int
        => "{}, {}, {}", fd, owner as i32, group as i32;
    fn lchown(path: *const c_char, owner: uid_t, group: gid_t) -> c_int
        => "{}, {}, {}", CPath(path), owner as i32, group as i32;
    fn fchownat(dirfd: c_int, path: *const c_char, owner: uid_t, group: gid_t, flags: c_int) -> c_int
        => "{}, {}, {}, {}, {:#x}", DirFd(dirfd), CPath(path), owner as i32, group as i32, flags;

    fn execve(path: *const c_char, argv: *const *const c_char, envp: *const *const c_char) -> c_int
        => "{}, {}", CPath(path), Argv(argv);

    fn link(oldpath: *const c_char, newpath: *const c_char) -> c_int
        => "{}, {}", CPath(oldpath), CPath(newpath);
    fn linkat(olddirfd: c_int, oldpath: *const c_char, newdirfd: c_int, newpath: *const c_char, flags: c_int) -> c_int
        => "{}, {}, {}, {}, {:#x}", DirFd(olddirfd), CPath(oldpath), DirFd(newdirfd), CPath(newpath), flags;
    fn symlink(target: *const c_char, linkpath: *const c_char) -> c_int
        => "{}, {}", CPath(target), CPath(linkpath);
    fn symlinkat(target: *const c_char, newdirfd: c_int, linkpath: *const c_char) -> c_int
        => "{}, {}, {}", CPath(target), DirFd(newdirfd), CPath(linkpath);
    fn unlink(path: *const c_char) -> c_int
        => "{}", CPath(path);
    fn unlinkat(dirfd: c_int, path: *const c_char, flags: c_int) -> c_int
        => "{}, {}, {:#x}", DirFd(dirfd), CPath(path), flags;

    fn rename(oldpath: *const c_char, newpath: *const c_char) -> c_int
        => "{}, {}", CPath(oldpath), CPath(newpath);
    fn renameat(olddirfd: c_int, oldpath: *const c_char, newdirfd: c_int, newpath: *const c_char) -> c_int
        => "{}, {}, {}, {}", DirFd(olddirfd), CPath(oldpath), DirFd(newdirfd), CPath(newpath);
    fn renameat2(olddirfd: c_int, oldpath: *const c_char, newdirfd: c_int, newpath: *const c_char, flags: c_uint) -> c_int
        => "{}, {}, {}, {}, {:#x}", DirFd(olddirfd), CPath(oldpath), DirFd(newdirfd), CPath(newpath), flags;

    fn mkdir(path: *const c_char, mode: mode_t) -> c_int
        => "{}, {:#o}", CPath(path), mode;
    fn mkdirat(dirfd: c_int, path: *const c_char, mode: mode_t) -> c_int
        => "{}, {}, {:#o}", DirFd(dirfd), CPath(path), mode;
    fn mknod(path: *const c_char, mode: mode_t, dev: dev_t) -> c_int
        => "{}, {:#o}, {:#x}", CPath(path), mode, dev;
    fn mknodat(dirfd: c_int, path: *const c_char, mode: mode_t, dev: dev_t) -> c_int
        => "{}, {}, {:#o}, {:#x}", DirFd(dirfd), CPath(path), mode, dev;
    fn rmdir(path: *const c_char) -> c_int
        => "{}", CPath(path);

    fn stat(path: *const c_char, buf: *mut libc::stat) -> c_int
        => "{}", CPath(path);
    fn lstat(path: *const c_char, buf: *mut libc::stat) -> c_int
        => "{}", CPath(path);
    fn fstat(fd: c_int, buf: *mut libc::stat) -> c_int
        => "{}", fd;
    fn fstatat(dirfd: c_int, path: *const c_char, buf: *mut libc::stat, flags: c_int) -> c_int
        => "{}, {}, {:#x}", DirFd(dirfd), CPath(path), flags;
    fn statfs(path: *const c_char, buf: *mut libc::statfs) -> c_int
        => "{}", CPath(path);
    fn fstatfs(fd: c_int, buf: *mut libc::statfs) -> c_int
        => "{}", fd;

    // Large file variants, which programs built with 64-bit file offsets
    // (including everything using Rust's std) call instead
    fn stat64(path: *const c_char, buf: *mut libc::stat64) -> c_int
        => "{}", CPath(path);
    fn lstat64(path: *const c_char, buf: *mut libc::stat64) -> c_int
        => "{}", CPath(path);
    fn fstat64(fd: c_int, buf: *mut libc::stat64) -> c_int
        => "{}", fd;
    fn fstatat64(dirfd: c_int, path: *const c_char, buf: *mut libc::stat64, flags: c_int) -> c_int
        => "{}, {}, {:#x}", DirFd(dirfd), CPath(path), flags;
    fn statfs64(path: *const c_char, buf: *mut libc::statfs64) -> c_int
        => "{}", CPath(path);
    fn fstatfs64(fd: c_int, buf: *mut libc::statfs64) -> c_int
        => "{}", fd;

    fn readdir(dirp: *mut DIR) -> *mut dirent
        => "{:p}", dirp;
    fn readdir64(dirp: *mut DIR) -> *mut dirent64
        => "{:p}", dirp;
    fn readlink(path: *const c_char, buf: *mut c_char, size: size_t) -> ssize_t
        => "{}, {}", CPath(path), size;
    fn readlinkat(dirfd: c_int, path: *const c_char, buf: *mut c_char, size: size_t) -> ssize_t
        => "{}, {}, {}", DirFd(dirfd), CPath(path), size;

    fn utime(path: *const c_char, times: *const utimbuf) -> c_int
        => "{}, {:p}", CPath(path), times;
    fn utimes(path: *const c_char, times: *const timeval) -> c_int
        => "{}, {:p}", CPath(path), times;
    fn futimesat(dirfd: c_int, path: *const c_char, times: *const timeval) -> c_int
        => "{}, {}, {:p}", DirFd(dirfd), CPath(path), times;
    fn utimensat(dirfd: c_int, path: *const c_char, times: *const timespec, flags: c_int) -> c_int
        => "{}, {}, {:p}, {:#x}", DirFd(dirfd), CPath(path), times, flags;
    fn futimens(fd: c_int, times: *const timespec) -> c_int
        => "{}, {:p}", fd, times;

    fn write(fd: c_int, buf: *const c_void, count: size_t) -> ssize_t
        => "{}, {}", fd, count;

    fn getuid() -> uid_t => "";
    fn geteuid() -> uid_t => "";
    fn getgid() -> gid_t => "";
    fn getegid() -> gid_t => "";
    fn getgroups(size: c_int, list: *mut gid_t) -> c_int
        => "{}", size;
    fn getresuid(ruid: *mut uid_t, euid: *mut uid_t, suid: *mut uid_t) -> c_int => "";
    fn getresgid(rgid: *mut gid_t, egid: *mut gid_t, sgid: *mut gid_t) -> c_int => "";
}
