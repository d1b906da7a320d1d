//! Job type configuration: inline flags or a YAML file listing several types.
//!
//! ```yaml
//! jobTypes:
//!   - jobType: train
//!     mainContainer: main
//!   - jobType: notebook
//!     mainContainer: notebook
//!     jobIdLabel: notebook_id
//!     labelSelector: app=notebook
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use clap::Args;
use serde::Deserialize;

use crate::domain::job_type::DEFAULT_JOB_ID_LABEL;
use crate::domain::job_type::DEFAULT_JOB_TYPE_LABEL;
use crate::domain::JobType;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read job types file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse job types file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("--job-type {job_type} needs --main-container")]
    MissingMainContainer { job_type: String },

    #[error("job type `{0}` is configured more than once")]
    DuplicateJobType(String),

    #[error("job type `{field}` must not be empty")]
    EmptyField { field: &'static str },

    #[error("no job types configured; pass --job-type or --job-types-file")]
    NoJobTypes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobTypesFile {
    job_types: Vec<JobType>,
}

#[derive(Args, Clone, Debug)]
pub struct JobTypeArgs {
    #[arg(
        long,
        env = "JOB_MONITOR_JOB_TYPES_FILE",
        value_hint = clap::ValueHint::FilePath,
        help = "YAML file listing the job types to monitor"
    )]
    pub job_types_file: Option<PathBuf>,

    #[arg(
        long,
        env = "JOB_MONITOR_JOB_TYPE",
        help = "Value of the job type label for an inline job type, e.g. train"
    )]
    pub job_type: Option<String>,

    #[arg(
        long,
        env = "JOB_MONITOR_MAIN_CONTAINER",
        help = "Main container name for the inline job type"
    )]
    pub main_container: Option<String>,

    #[arg(long, default_value = DEFAULT_JOB_ID_LABEL, help = "Pod label holding the job id")]
    pub job_id_label: String,

    #[arg(long, default_value = DEFAULT_JOB_TYPE_LABEL, help = "Pod label holding the job type")]
    pub job_type_label: String,

    #[arg(
        long,
        help = "Label selector for the inline job type; defaults to <job-type-label>=<job-type>"
    )]
    pub label_selector: Option<String>,
}

impl JobTypeArgs {
    /// Every configured job type: file entries first, then the inline one.
    pub fn load(&self) -> Result<Vec<JobType>, ConfigError> {
        let mut job_types = match &self.job_types_file {
            Some(path) => load_job_types_file(path)?,
            None => Vec::new(),
        };

        if let Some(job_type) = &self.job_type {
            let main_container =
                self.main_container
                    .clone()
                    .ok_or_else(|| ConfigError::MissingMainContainer {
                        job_type: job_type.clone(),
                    })?;
            job_types.push(JobType {
                job_type: job_type.clone(),
                main_container,
                job_id_label: self.job_id_label.clone(),
                job_type_label: self.job_type_label.clone(),
                label_selector: self.label_selector.clone(),
            });
        }

        validate(&job_types)?;
        Ok(job_types)
    }
}

pub fn load_job_types_file(path: &Path) -> Result<Vec<JobType>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_job_types(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_job_types(content: &str) -> Result<Vec<JobType>, serde_yaml::Error> {
    serde_yaml::from_str::<JobTypesFile>(content).map(|file| file.job_types)
}

fn validate(job_types: &[JobType]) -> Result<(), ConfigError> {
    if job_types.is_empty() {
        return Err(ConfigError::NoJobTypes);
    }

    let mut seen = HashSet::new();
    for job_type in job_types {
        let fields = [
            ("jobType", &job_type.job_type),
            ("mainContainer", &job_type.main_container),
            ("jobIdLabel", &job_type.job_id_label),
            ("jobTypeLabel", &job_type.job_type_label),
        ];
        if let Some((field, _)) = fields.into_iter().find(|(_, value)| value.is_empty()) {
            return Err(ConfigError::EmptyField { field });
        }
        if !seen.insert(job_type.job_type.as_str()) {
            return Err(ConfigError::DuplicateJobType(job_type.job_type.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use similar_asserts::assert_eq;

    use super::*;

    fn args() -> JobTypeArgs {
        JobTypeArgs {
            job_types_file: None,
            job_type: None,
            main_container: None,
            job_id_label: DEFAULT_JOB_ID_LABEL.to_string(),
            job_type_label: DEFAULT_JOB_TYPE_LABEL.to_string(),
            label_selector: None,
        }
    }

    #[test]
    fn parses_file_with_defaults() {
        let job_types = parse_job_types(
            r#"
jobTypes:
  - jobType: train
    mainContainer: main
  - jobType: notebook
    mainContainer: notebook
    jobIdLabel: notebook_id
    labelSelector: app=notebook
"#,
        )
        .expect("file should parse");

        assert_eq!(
            job_types,
            vec![
                JobType::new("train", "main"),
                JobType {
                    job_id_label: "notebook_id".to_string(),
                    ..JobType::new("notebook", "notebook").with_label_selector("app=notebook")
                },
            ]
        );
    }

    #[test]
    fn loads_file_and_inline_job_type() {
        let mut file = tempfile::NamedTempFile::new().expect("should create temp file");
        writeln!(file, "jobTypes:\n  - jobType: train\n    mainContainer: main")
            .expect("should write config");

        let args = JobTypeArgs {
            job_types_file: Some(file.path().to_path_buf()),
            job_type: Some("eval".to_string()),
            main_container: Some("evaluator".to_string()),
            ..args()
        };

        let job_types = args.load().expect("config should load");
        assert_eq!(
            job_types,
            vec![
                JobType::new("train", "main"),
                JobType::new("eval", "evaluator")
            ]
        );
    }

    #[test]
    fn inline_job_type_needs_main_container() {
        let args = JobTypeArgs {
            job_type: Some("train".to_string()),
            ..args()
        };

        assert!(matches!(
            args.load(),
            Err(ConfigError::MissingMainContainer { job_type }) if job_type == "train"
        ));
    }

    #[test]
    fn rejects_empty_and_duplicate_configs() {
        assert!(matches!(args().load(), Err(ConfigError::NoJobTypes)));

        let duplicate = [JobType::new("train", "main"), JobType::new("train", "other")];
        assert!(matches!(
            validate(&duplicate),
            Err(ConfigError::DuplicateJobType(job_type)) if job_type == "train"
        ));

        let empty = [JobType::new("train", "")];
        assert!(matches!(
            validate(&empty),
            Err(ConfigError::EmptyField { field: "mainContainer" })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let args = JobTypeArgs {
            job_types_file: Some(PathBuf::from("/nonexistent/job-types.yaml")),
            ..args()
        };

        assert!(matches!(args.load(), Err(ConfigError::Read { .. })));
    }
}
