use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_JOB_ID_LABEL: &str = "job_id";
pub const DEFAULT_JOB_TYPE_LABEL: &str = "job-type";

fn default_job_id_label() -> String {
    DEFAULT_JOB_ID_LABEL.to_string()
}

fn default_job_type_label() -> String {
    DEFAULT_JOB_TYPE_LABEL.to_string()
}

/// Static metadata for one kind of job the monitor follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobType {
    /// Value of the job type label on pods of this kind, e.g. `train`.
    pub job_type: String,
    /// Container whose lifecycle is the job's lifecycle.
    pub main_container: String,
    #[serde(default = "default_job_id_label")]
    pub job_id_label: String,
    #[serde(default = "default_job_type_label")]
    pub job_type_label: String,
    /// Selector for the pod subscription. Defaults to
    /// `<job_type_label>=<job_type>`.
    #[serde(default)]
    pub label_selector: Option<String>,
}

impl JobType {
    pub fn new(job_type: impl Into<String>, main_container: impl Into<String>) -> Self {
        Self {
            job_type: job_type.into(),
            main_container: main_container.into(),
            job_id_label: default_job_id_label(),
            job_type_label: default_job_type_label(),
            label_selector: None,
        }
    }

    pub fn with_label_selector(mut self, label_selector: impl Into<String>) -> Self {
        self.label_selector = Some(label_selector.into());
        self
    }

    pub fn effective_label_selector(&self) -> String {
        self.label_selector
            .clone()
            .unwrap_or_else(|| format!("{}={}", self.job_type_label, self.job_type))
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn default_selector_matches_job_type_label() {
        let job_type = JobType::new("train", "main");
        assert_eq!(job_type.effective_label_selector(), "job-type=train");
    }

    #[test]
    fn explicit_selector_wins() {
        let job_type = JobType::new("train", "main").with_label_selector("team=ml,job-type=train");
        assert_eq!(
            job_type.effective_label_selector(),
            "team=ml,job-type=train"
        );
    }
}
