use std::env;

/// Release version injected by the image build; local builds report `dev`.
const IMAGE_VERSION_ENV: &str = "JOB_MONITOR_VERSION";

fn main() {
    // Outside a git checkout (e.g. a source tarball) the SHA is simply absent.
    if let Err(err) = emit_git_sha() {
        println!("cargo:warning=git metadata unavailable: {err}");
    }

    println!("cargo:rerun-if-env-changed={IMAGE_VERSION_ENV}");
    let image_version = env::var(IMAGE_VERSION_ENV).unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rustc-env=IMAGE_VERSION={image_version}");
}

fn emit_git_sha() -> anyhow::Result<()> {
    let git = vergen_git2::Git2Builder::default()
        .sha(true)
        .dirty(false)
        .build()?;

    vergen_git2::Emitter::default()
        .fail_on_error()
        .add_instructions(&git)?
        .emit()
}
