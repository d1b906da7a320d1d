use serde::Deserialize;
use serde::Serialize;

/// Runtime schemes the kubelet prefixes container references with.
const RUNTIME_SCHEMES: [&str; 3] = ["docker://", "containerd://", "cri-o://"];

/// Runtime-agnostic container identifier.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct CanonicalContainerId(String);

impl CanonicalContainerId {
    /// Resolves a raw container reference into its canonical form.
    ///
    /// Absent or empty references, and references made of nothing but a
    /// runtime scheme, resolve to `None`. References without a known scheme
    /// are taken as already canonical.
    pub fn resolve(raw: Option<&str>) -> Option<Self> {
        let raw = raw.filter(|raw| !raw.is_empty())?;
        let id = RUNTIME_SCHEMES
            .iter()
            .find_map(|scheme| raw.strip_prefix(scheme))
            .unwrap_or(raw);

        if id.is_empty() {
            return None;
        }
        Some(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
