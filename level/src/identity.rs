use libc::{gid_t, uid_t};

/// The (UID, GID) pair every untrusted program runs as.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct UntrustedIdentity {
    uid: uid_t,
    gid: gid_t,
}

impl UntrustedIdentity {
    pub const fn new(uid: uid_t, gid: gid_t) -> Self {
        Self { uid, gid }
    }

    pub const fn uid(&self) -> uid_t {
        self.uid
    }

    pub const fn gid(&self) -> gid_t {
        self.gid
    }
}

/// Identity configured at build time through `INTEGRITY_UNTRUSTED_UID` and
/// `INTEGRITY_UNTRUSTED_GID` (validated by the build script).
pub const UNTRUSTED_IDENTITY: UntrustedIdentity = UntrustedIdentity::new(
    parse_id(env!("INTEGRITY_UNTRUSTED_UID")),
    parse_id(env!("INTEGRITY_UNTRUSTED_GID")),
);

const fn parse_id(digits: &str) -> u32 {
    let bytes = digits.as_bytes();
    assert!(!bytes.is_empty(), "empty identifier");
    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        assert!(bytes[i].is_ascii_digit(), "identifier is not numeric");
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}
