use std::{env, process::Command};

const SHA_VAR: &str = "GREEDYBEAR_GIT_SHA";

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|stdout| stdout.trim().to_string())
}

fn revision() -> Option<String> {
    let head = git(&["rev-parse", "--short=12", "HEAD"]).filter(|head| !head.is_empty())?;
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|status| !status.is_empty());

    Some(if dirty { format!("{head}-dirty") } else { head })
}

fn main() {
    println!("cargo:rerun-if-env-changed={SHA_VAR}");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    // Source tarballs carry no .git; packagers pass the revision in.
    let sha = env::var(SHA_VAR)
        .ok()
        .filter(|sha| !sha.trim().is_empty())
        .or_else(revision)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={SHA_VAR}={sha}");
}
