//! Build script: embeds the git hash and checks GPU toolkits.
//!
//! whisper-rs-sys fails late and noisily when a GPU toolkit is missing, so the
//! matching tool is probed up front and a warning is emitted if it is absent.

use std::process::Command;

fn main() {
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    let probes: &[(&str, &str, &[&str], &str)] = &[
        ("cuda", "nvcc", &["--version"], "install the CUDA toolkit (nvcc)"),
        ("vulkan", "glslc", &["--version"], "install the Vulkan SDK (glslc)"),
        ("hipblas", "hipconfig", &["--version"], "install ROCm (hipconfig)"),
        ("openblas", "pkg-config", &["--exists", "openblas"], "install the OpenBLAS development package"),
    ];

    for (feature, tool, args, hint) in probes {
        let enabled = std::env::var(format!("CARGO_FEATURE_{}", feature.to_uppercase())).is_ok();
        if enabled && !probe(tool, args) {
            println!(
                "cargo::warning=Feature '{}' is enabled but '{}' was not found: {}",
                feature, tool, hint
            );
        }
    }
}

fn probe(tool: &str, args: &[&str]) -> bool {
    Command::new(tool)
        .args(args)
        .output()
        .is_ok_and(|out| out.status.success())
}
