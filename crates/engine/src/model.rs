use std::collections::BTreeMap;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::time::{self, TimeFormatError};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Day of the week, serialized with its English name ("Monday", ...).
/// The names are stable identifiers used by configuration documents, not
/// display strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which catalog a job comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Service,
    Repair,
}

// ---------------------------------------------------------------------------
// Catalog definitions
// ---------------------------------------------------------------------------

/// A routine job with a fixed, catalog-wide duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    /// Duration in hours.
    pub duration: f64,
}

/// A repair job. `dependency` names a service that must be requested
/// alongside this repair (e.g. "Brakes" depends on "MOT").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairDefinition {
    pub name: String,
    /// Duration in hours.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
}

/// Opening window for one weekday, as `HH:MM` clock strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkingHours {
    pub open: String,
    pub close: String,
}

impl WorkingHours {
    /// The window as fractional hours `(open, close)`.
    pub fn window(&self) -> Result<(f64, f64), TimeFormatError> {
        Ok((
            time::time_to_number(&self.open)?,
            time::time_to_number(&self.close)?,
        ))
    }
}

/// One capability entry: job name → weekdays on which it can be performed.
pub type Capability = BTreeMap<String, Vec<DayOfWeek>>;

/// A physical work slot within a workshop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bay {
    pub id: String,
    #[serde(default)]
    pub services: Vec<Capability>,
    #[serde(default)]
    pub repairs: Vec<Capability>,
}

impl Bay {
    /// All capability entries, services first. A job listed more than once
    /// is supported on the union of its weekday sets.
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.services.iter().chain(self.repairs.iter())
    }

    /// Whether this bay declares `job` on `day`.
    pub fn supports(&self, job: &str, day: DayOfWeek) -> bool {
        self.capabilities()
            .any(|cap| cap.get(job).is_some_and(|days| days.contains(&day)))
    }

    /// Whether this bay declares `job` on any weekday at all.
    pub fn lists(&self, job: &str) -> bool {
        self.capabilities().any(|cap| cap.contains_key(job))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workshop {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bays: Vec<Bay>,
    /// Missing or `null` entries mean the workshop is closed that day.
    #[serde(default)]
    pub working_hours: BTreeMap<DayOfWeek, Option<WorkingHours>>,
}

impl Workshop {
    pub fn hours(&self, day: DayOfWeek) -> Option<&WorkingHours> {
        self.working_hours.get(&day).and_then(Option::as_ref)
    }

    /// Opening window in fractional hours, or `None` when closed. A window
    /// that fails to parse counts as closed.
    pub fn window(&self, day: DayOfWeek) -> Option<(f64, f64)> {
        self.hours(day).and_then(|h| h.window().ok())
    }

    pub fn is_open(&self, day: DayOfWeek) -> bool {
        self.window(day).is_some()
    }
}

/// The configuration document: three top-level collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
    #[serde(default)]
    pub repairs: Vec<RepairDefinition>,
    #[serde(default)]
    pub workshops: Vec<Workshop>,
}

// ---------------------------------------------------------------------------
// Scheduling output
// ---------------------------------------------------------------------------

/// One placed job instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub job_name: String,
    pub job_type: JobType,
    pub bay_id: String,
    pub date: NaiveDate,
    /// Fractional hours since midnight.
    pub start_hour: f64,
    pub end_hour: f64,
    pub duration: f64,
}

/// A complete, sequenced placement of every job in the plan at one workshop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlot {
    /// `YYYY-MM-DDTHH:MM` start of the first item.
    pub check_in: String,
    /// `YYYY-MM-DDTHH:MM` end of the last item.
    pub check_out: String,
    pub total_work_hours: f64,
    /// Inclusive calendar-day span between the first and last item.
    pub total_days: u32,
    pub schedule: Vec<ScheduleItem>,
}

/// A requested repair whose prerequisite service was not requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnmetDependency {
    pub repair: String,
    pub dependency: String,
}

/// Outcome of evaluating one workshop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopAvailability {
    pub workshop_id: String,
    pub workshop_name: String,
    pub can_fulfill_request: bool,
    pub missing_jobs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmet_dependencies: Vec<UnmetDependency>,
    pub available_slots: Vec<AvailableSlot>,
}
