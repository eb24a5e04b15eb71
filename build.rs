use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    // Snapshot builds carry the short commit hash (e.g., "1.3.0-SNAPSHOT+1a2b3c4")
    let version = if version.ends_with("-SNAPSHOT") {
        match last_commit_hash() {
            Some(hash) => format!("{}+{}", version, hash),
            None => version,
        }
    } else {
        version
    };

    println!("cargo:rustc-env=ANNOUNCER_VERSION={}", version);
}

fn last_commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if hash.is_empty() { None } else { Some(hash) }
}
