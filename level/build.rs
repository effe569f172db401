// Bakes the untrusted principal into the build. The identity is a
// compile-time constant: nothing at runtime can pick a different one.

const IDENTITY_VARIABLES: [(&str, u32); 2] = [
    ("INTEGRITY_UNTRUSTED_UID", 65534),
    ("INTEGRITY_UNTRUSTED_GID", 65534),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for (name, default) in IDENTITY_VARIABLES {
        println!("cargo:rerun-if-env-changed={}", name);
        let id = match std::env::var(name) {
            Ok(value) => match value.trim().parse::<u32>() {
                Ok(n) => n,
                Err(_) => panic!("{} must be a numeric identifier, got {:?}", name, value),
            },
            Err(_) => default,
        };
        // 0 would "drop" to root, and -1 means "leave unchanged" to setres*id()
        if id == 0 || id == u32::MAX {
            panic!("{}={} cannot be used as the untrusted principal", name, id);
        }
        println!("cargo:rustc-env={}={}", name, id);
    }
}
