use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=GIT_VERSION");

    println!("cargo:rustc-env=GIT_VERSION={}", resolve_version());
}

/// Explicit `GIT_VERSION` (container builds) wins, then `git describe`, then "dev".
fn resolve_version() -> String {
    std::env::var("GIT_VERSION")
        .ok()
        .filter(|version| !version.is_empty() && version != "dev")
        .or_else(describe_head)
        .unwrap_or_else(|| "dev".to_string())
}

fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}
