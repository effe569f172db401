use libc::c_int;

/// Integrity of a resource in a two-point lattice: `Low < High`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum IntegrityLevel {
    /// Belongs to, or has been ceded to, the untrusted principal
    Low,
    /// Belongs to the privileged principal's trust domain
    High,
}

/// What an oracle answered about a resource. `Unknown` covers every case where
/// no decision could be made (unreachable policy store, failed stat(), etc.)
/// and is always handled as `High`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Classification {
    High,
    Low,
    Unknown,
}

impl Classification {
    pub fn level(self) -> IntegrityLevel {
        match self {
            Self::Low => IntegrityLevel::Low,
            Self::High | Self::Unknown => IntegrityLevel::High,
        }
    }
}

impl From<IntegrityLevel> for Classification {
    fn from(level: IntegrityLevel) -> Self {
        match level {
            IntegrityLevel::Low => Self::Low,
            IntegrityLevel::High => Self::High,
        }
    }
}

impl<E> From<Result<IntegrityLevel, E>> for Classification {
    fn from(res: Result<IntegrityLevel, E>) -> Self {
        match res {
            Ok(level) => level.into(),
            Err(_) => Self::Unknown,
        }
    }
}

/// Access mode of an open file description, as reported by fcntl(F_GETFL).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
    /// fcntl() failed or returned an access mode we do not know of
    Unknown,
}

impl AccessMode {
    /// Decodes the return value of fcntl(fd, F_GETFL). Negative values are
    /// fcntl() failures.
    pub fn from_status_flags(flags: c_int) -> Self {
        if flags < 0 {
            return Self::Unknown;
        }
        match flags & libc::O_ACCMODE {
            libc::O_RDONLY => Self::ReadOnly,
            libc::O_WRONLY => Self::WriteOnly,
            libc::O_RDWR => Self::ReadWrite,
            _ => Self::Unknown,
        }
    }

    /// Whether the descriptor may be used to write. Unknown modes are assumed writable.
    pub fn may_write(self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}
