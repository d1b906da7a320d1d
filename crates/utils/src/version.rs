use std::sync::LazyLock;

const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");
const GIT_DIRTY: Option<&str> = option_env!("VERGEN_GIT_DIRTY");

/// Defines the application version.
pub static VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{}-{}{}",
        env!("IMAGE_VERSION"),
        GIT_SHA.unwrap_or("unknown"),
        if GIT_DIRTY == Some("true") { "-dirty" } else { "" }
    )
});
