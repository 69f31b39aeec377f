use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::model::{CatalogConfig, JobType, RepairDefinition, ServiceDefinition, Workshop};
use crate::validator;

/// Environment variable naming the configuration document.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "./data/workshops.config.json";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read configuration '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration '{}' is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration is invalid: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Path of the configuration document: `$CONFIG_PATH`, or the default
/// relative to the working directory.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Read and parse a configuration document without validating it.
pub fn read_config(path: &Path) -> Result<CatalogConfig, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct JobEntry {
    job_type: JobType,
    duration: f64,
}

/// Read-only snapshot of the service/repair catalog and the workshops.
///
/// Built once and never mutated, so a shared reference (or `Arc`) can be
/// read from any number of threads.
#[derive(Debug, Clone)]
pub struct Catalog {
    config: CatalogConfig,
    jobs: HashMap<String, JobEntry>,
}

impl Catalog {
    /// Read, validate and index the document at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let config = read_config(path)?;
        let catalog = Self::from_config(config)?;
        tracing::info!(
            path = %path.display(),
            services = catalog.services().len(),
            repairs = catalog.repairs().len(),
            workshops = catalog.workshops().len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Validate an in-memory document. Validation errors reject the whole
    /// document; warnings are logged.
    pub fn from_config(config: CatalogConfig) -> Result<Self, CatalogError> {
        let report = validator::validate(&config);
        for warning in &report.warnings {
            tracing::warn!("{}", warning);
        }
        if !report.is_ok() {
            return Err(CatalogError::Invalid(report.errors));
        }

        let mut jobs = HashMap::with_capacity(config.services.len() + config.repairs.len());
        for s in &config.services {
            jobs.insert(
                s.name.clone(),
                JobEntry {
                    job_type: JobType::Service,
                    duration: s.duration,
                },
            );
        }
        for r in &config.repairs {
            jobs.insert(
                r.name.clone(),
                JobEntry {
                    job_type: JobType::Repair,
                    duration: r.duration,
                },
            );
        }

        Ok(Self { config, jobs })
    }

    /// Workshops in configuration order.
    pub fn workshops(&self) -> &[Workshop] {
        &self.config.workshops
    }

    pub fn services(&self) -> &[ServiceDefinition] {
        &self.config.services
    }

    pub fn repairs(&self) -> &[RepairDefinition] {
        &self.config.repairs
    }

    /// Fixed duration of a job in hours. Unknown names yield `0.0`; that is a
    /// lookup miss, not an instant job.
    pub fn job_duration(&self, name: &str) -> f64 {
        self.jobs.get(name).map(|j| j.duration).unwrap_or(0.0)
    }

    pub fn job_type(&self, name: &str) -> Option<JobType> {
        self.jobs.get(name).map(|j| j.job_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    pub fn repair_definition(&self, name: &str) -> Option<&RepairDefinition> {
        self.config.repairs.iter().find(|r| r.name == name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::test_support::{sample_catalog, sample_config};

    #[test]
    fn test_job_duration_known_and_unknown() {
        let catalog = sample_catalog();
        assert_eq!(catalog.job_duration("MOT"), 1.0);
        assert_eq!(catalog.job_duration("Brakes"), 2.0);
        assert_eq!(catalog.job_duration("Teleportation"), 0.0);
        assert_eq!(catalog.job_duration(""), 0.0);
    }

    #[test]
    fn test_job_type_and_repair_definition() {
        let catalog = sample_catalog();
        assert_eq!(catalog.job_type("MOT"), Some(JobType::Service));
        assert_eq!(catalog.job_type("Brakes"), Some(JobType::Repair));
        assert_eq!(catalog.job_type("Nope"), None);

        let brakes = catalog.repair_definition("Brakes").unwrap();
        assert_eq!(brakes.dependency.as_deref(), Some("MOT"));
        assert!(catalog.repair_definition("MOT").is_none());
    }

    #[test]
    fn test_workshops_keep_config_order() {
        let mut config = sample_config();
        let mut second = config.workshops[0].clone();
        second.id = "w2".to_string();
        second.name = "Second".to_string();
        config.workshops.push(second);

        let catalog = Catalog::from_config(config).unwrap();
        let ids: Vec<&str> = catalog.workshops().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["w1", "w2"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&sample_config()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.workshops().len(), 1);
        assert_eq!(catalog.job_duration("Oil Change"), 0.5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ \"services\": [ ").unwrap();
        let err = Catalog::load(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = sample_config();
        config.repairs[0].dependency = Some("Valeting".to_string());
        let err = Catalog::from_config(config).unwrap_err();
        match err {
            CatalogError::Invalid(errors) => {
                assert!(errors.iter().any(|e| e.contains("Valeting")), "{:?}", errors)
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }
}
