#![deny(clippy::all)]

use std::path::PathBuf;
use std::sync::Arc;

use napi_derive::napi;
use workshop_availability::availability as facade;
use workshop_availability::catalog::{self, Catalog};
use workshop_availability::model as engine;
use workshop_availability::validator;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[napi(string_enum)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobType {
    Service,
    Repair,
}

impl From<engine::JobType> for JobType {
    fn from(v: engine::JobType) -> Self {
        match v {
            engine::JobType::Service => JobType::Service,
            engine::JobType::Repair => JobType::Repair,
        }
    }
}

// ---------------------------------------------------------------------------
// Mirror types: output side
// ---------------------------------------------------------------------------

#[napi(object)]
#[derive(Debug, Clone)]
pub struct ScheduleItem {
    pub job_name: String,
    pub job_type: JobType,
    pub bay_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub start_hour: f64,
    pub end_hour: f64,
    pub duration: f64,
}

impl From<engine::ScheduleItem> for ScheduleItem {
    fn from(v: engine::ScheduleItem) -> Self {
        ScheduleItem {
            job_name: v.job_name,
            job_type: v.job_type.into(),
            bay_id: v.bay_id,
            date: v.date.format("%Y-%m-%d").to_string(),
            start_hour: v.start_hour,
            end_hour: v.end_hour,
            duration: v.duration,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct AvailableSlot {
    pub check_in: String,
    pub check_out: String,
    pub total_work_hours: f64,
    pub total_days: u32,
    pub schedule: Vec<ScheduleItem>,
}

impl From<engine::AvailableSlot> for AvailableSlot {
    fn from(v: engine::AvailableSlot) -> Self {
        AvailableSlot {
            check_in: v.check_in,
            check_out: v.check_out,
            total_work_hours: v.total_work_hours,
            total_days: v.total_days,
            schedule: v.schedule.into_iter().map(Into::into).collect(),
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct UnmetDependency {
    pub repair: String,
    pub dependency: String,
}

impl From<engine::UnmetDependency> for UnmetDependency {
    fn from(v: engine::UnmetDependency) -> Self {
        UnmetDependency {
            repair: v.repair,
            dependency: v.dependency,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct WorkshopAvailability {
    pub workshop_id: String,
    pub workshop_name: String,
    pub can_fulfill_request: bool,
    pub missing_jobs: Vec<String>,
    pub unmet_dependencies: Vec<UnmetDependency>,
    pub available_slots: Vec<AvailableSlot>,
}

impl From<engine::WorkshopAvailability> for WorkshopAvailability {
    fn from(v: engine::WorkshopAvailability) -> Self {
        WorkshopAvailability {
            workshop_id: v.workshop_id,
            workshop_name: v.workshop_name,
            can_fulfill_request: v.can_fulfill_request,
            missing_jobs: v.missing_jobs,
            unmet_dependencies: v.unmet_dependencies.into_iter().map(Into::into).collect(),
            available_slots: v.available_slots.into_iter().map(Into::into).collect(),
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct RequestSummary {
    pub services: Vec<String>,
    pub repairs: Vec<String>,
    pub total_requested_hours: f64,
    pub start_date: String,
    pub end_date: String,
}

impl From<facade::RequestSummary> for RequestSummary {
    fn from(v: facade::RequestSummary) -> Self {
        RequestSummary {
            services: v.services,
            repairs: v.repairs,
            total_requested_hours: v.total_requested_hours,
            start_date: v.start_date.format("%Y-%m-%d").to_string(),
            end_date: v.end_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct AvailabilityResponse {
    pub request: RequestSummary,
    pub results: Vec<WorkshopAvailability>,
}

impl From<facade::AvailabilityResponse> for AvailabilityResponse {
    fn from(v: facade::AvailabilityResponse) -> Self {
        AvailabilityResponse {
            request: v.request.into(),
            results: v.results.into_iter().map(Into::into).collect(),
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<validator::ValidationResult> for ValidationResult {
    fn from(v: validator::ValidationResult) -> Self {
        ValidationResult {
            errors: v.errors,
            warnings: v.warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Exported API
// ---------------------------------------------------------------------------

fn resolve_path(config_path: Option<String>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(catalog::config_path)
}

/// Availability queries over a catalog loaded once at construction.
#[napi]
pub struct AvailabilityService {
    inner: facade::AvailabilityService,
}

#[napi]
impl AvailabilityService {
    /// Load the catalog from `configPath`, or from `$CONFIG_PATH` / the
    /// default location when omitted.
    #[napi(constructor)]
    pub fn new(config_path: Option<String>) -> napi::Result<Self> {
        let catalog = Catalog::load(&resolve_path(config_path))
            .map_err(|e| napi::Error::from_reason(e.to_string()))?;
        Ok(AvailabilityService {
            inner: facade::AvailabilityService::new(Arc::new(catalog)),
        })
    }

    #[napi]
    pub fn find_slots(&self, services: Vec<String>, repairs: Vec<String>) -> AvailabilityResponse {
        self.inner.find_slots(services, repairs).into()
    }
}

#[napi]
pub fn validate_catalog(config_path: Option<String>) -> napi::Result<ValidationResult> {
    let config = catalog::read_config(&resolve_path(config_path))
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    Ok(validator::validate(&config).into())
}
