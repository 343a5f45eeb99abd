/// Build script for kepler-sweep
/// Captures build metadata shown by `kepler-sweep version`

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=Cargo.lock");
    println!("cargo:rerun-if-changed=configs/equal_areas.yaml");

    // Capture git hash when building from a checkout
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(hash) = String::from_utf8(output.stdout) {
                println!("cargo:rustc-env=KEPLER_SWEEP_GIT_HASH={}", hash.trim());
            }
        }
    }

    println!(
        "cargo:rustc-env=KEPLER_SWEEP_BUILD_TIMESTAMP={}",
        unix_timestamp()
    );
}

/// Seconds since the Unix epoch, without an external crate
fn unix_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
