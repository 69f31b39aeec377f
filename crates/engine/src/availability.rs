use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::Catalog;
use crate::model::WorkshopAvailability;
use crate::solver;
use crate::time;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A request that is rejected before it reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid request: \"{field}\" must be an array of job names")]
    NotAnArray { field: String },
    #[error("Invalid request: \"{field}\"[{index}] must be a string")]
    NotAString { field: String, index: usize },
    #[error("Invalid request: \"now\" is not a datetime: '{0}'")]
    InvalidNow(String),
}

// ---------------------------------------------------------------------------
// Request validation
// ---------------------------------------------------------------------------

/// Interpret a request field as a list of job names. An absent (or `null`)
/// field is an empty list.
pub fn parse_job_names(field: &str, value: Option<&Value>) -> Result<Vec<String>, RequestError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(RequestError::NotAnArray {
                field: field.to_string(),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| RequestError::NotAString {
                    field: field.to_string(),
                    index,
                })
        })
        .collect()
}

/// Parse a request's `now`, truncated to the minute. A datetime so close to
/// the end of the calendar that its booking window can't be represented is
/// rejected.
pub fn parse_now(s: &str) -> Result<NaiveDateTime, RequestError> {
    let now = time::parse_datetime(s)
        .map(time::truncate_to_minute)
        .ok_or_else(|| RequestError::InvalidNow(s.to_string()))?;
    if solver::horizon_end(now.date()).is_none() {
        return Err(RequestError::InvalidNow(s.to_string()));
    }
    Ok(now)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Echo of the request plus the aggregates computed for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub services: Vec<String>,
    pub repairs: Vec<String>,
    /// Catalog hours of every requested name, duplicates included.
    pub total_requested_hours: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityResponse {
    pub request: RequestSummary,
    pub results: Vec<WorkshopAvailability>,
}

// ---------------------------------------------------------------------------
// Façade
// ---------------------------------------------------------------------------

/// Entry point for transports: runs the engine over every workshop of an
/// injected catalog and shapes the response.
#[derive(Debug, Clone)]
pub struct AvailabilityService {
    catalog: Arc<Catalog>,
}

impl AvailabilityService {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Sum of catalog durations over every requested name. Duplicates count
    /// each time; unknown names count zero.
    pub fn total_requested_hours(&self, services: &[String], repairs: &[String]) -> f64 {
        services
            .iter()
            .chain(repairs)
            .map(|job| self.catalog.job_duration(job))
            .sum()
    }

    /// Evaluate the request against the local wall clock.
    pub fn find_slots(&self, services: Vec<String>, repairs: Vec<String>) -> AvailabilityResponse {
        self.find_slots_at(services, repairs, Local::now().naive_local())
    }

    /// Evaluate the request as of `now`, truncated to the minute.
    pub fn find_slots_at(
        &self,
        services: Vec<String>,
        repairs: Vec<String>,
        now: NaiveDateTime,
    ) -> AvailabilityResponse {
        let now = time::truncate_to_minute(now);
        tracing::info!(
            services = ?services,
            repairs = ?repairs,
            now = %now,
            "finding availability"
        );

        let results = solver::find_slots(&self.catalog, &services, &repairs, now);
        let fulfilled = results.iter().filter(|r| r.can_fulfill_request).count();
        tracing::info!(workshops = results.len(), fulfilled, "availability computed");

        let start_date = now.date();
        let request = RequestSummary {
            total_requested_hours: self.total_requested_hours(&services, &repairs),
            services,
            repairs,
            start_date,
            end_date: solver::horizon_end(start_date).unwrap_or(NaiveDate::MAX),
        };

        AvailabilityResponse { request, results }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::{dt, sample_catalog, strings};

    fn service() -> AvailabilityService {
        AvailabilityService::new(Arc::new(sample_catalog()))
    }

    #[test]
    fn test_total_requested_hours_counts_duplicates() {
        let svc = service();
        let total = svc.total_requested_hours(
            &strings(&["MOT", "MOT", "Oil Change"]),
            &strings(&["Brakes", "Unknown"]),
        );
        assert_eq!(total, 4.5);
    }

    #[test]
    fn test_request_window_is_fixed() {
        let svc = service();
        let resp = svc.find_slots_at(strings(&["Oil Change"]), vec![], dt("2025-06-02T08:00"));
        assert_eq!(resp.request.start_date, dt("2025-06-02T00:00").date());
        assert_eq!(resp.request.end_date, dt("2025-08-01T00:00").date());
        assert_eq!(resp.request.services, strings(&["Oil Change"]));
        assert_eq!(resp.request.total_requested_hours, 0.5);
    }

    #[test]
    fn test_response_shape() {
        let svc = service();
        let resp = svc.find_slots_at(strings(&["MOT"]), strings(&["Brakes"]), dt("2025-06-02T08:00"));
        let value = serde_json::to_value(&resp).unwrap();

        assert_eq!(value["request"]["totalRequestedHours"], 3.0);
        assert_eq!(value["request"]["startDate"], "2025-06-02");
        let result = &value["results"][0];
        assert_eq!(result["workshopId"], "w1");
        assert_eq!(result["canFulfillRequest"], true);
        assert!(result.get("unmetDependencies").is_none());
        let slot = &result["availableSlots"][0];
        assert_eq!(slot["checkIn"], "2025-06-02T09:00");
        assert_eq!(slot["totalWorkHours"], 3.0);
        assert_eq!(slot["schedule"][1]["jobType"], "repair");
        assert_eq!(slot["schedule"][1]["date"], "2025-06-02");
    }

    #[test]
    fn test_parse_job_names() {
        let body = json!({ "services": ["MOT"], "repairs": "Brakes", "extra": [1] });
        assert_eq!(parse_job_names("services", body.get("services")).unwrap(), strings(&["MOT"]));
        assert_eq!(parse_job_names("missing", body.get("missing")).unwrap(), Vec::<String>::new());
        assert_eq!(
            parse_job_names("repairs", body.get("repairs")).unwrap_err(),
            RequestError::NotAnArray {
                field: "repairs".to_string()
            }
        );
        assert_eq!(
            parse_job_names("extra", body.get("extra")).unwrap_err(),
            RequestError::NotAString {
                field: "extra".to_string(),
                index: 0
            }
        );
    }

    #[test]
    fn test_parse_now() {
        assert_eq!(parse_now("2025-06-02T08:00").unwrap(), dt("2025-06-02T08:00"));
        assert!(matches!(parse_now("soon"), Err(RequestError::InvalidNow(_))));
    }

    #[test]
    fn test_parse_now_drops_seconds() {
        assert_eq!(parse_now("2025-06-02T09:00:30").unwrap(), dt("2025-06-02T09:00"));
    }

    #[test]
    fn test_parse_now_rejects_end_of_calendar() {
        assert_eq!(
            parse_now("+262142-12-20T08:00").unwrap_err(),
            RequestError::InvalidNow("+262142-12-20T08:00".to_string())
        );
    }

    #[test]
    fn test_now_is_truncated_to_the_minute() {
        let svc = service();
        let now = time::parse_datetime("2025-06-02T10:15:45").unwrap();
        let resp = svc.find_slots_at(strings(&["MOT"]), vec![], now);
        let slot = &resp.results[0].available_slots[0];
        assert_eq!(slot.check_in, "2025-06-02T10:15");
        assert_eq!(slot.schedule[0].start_hour, 10.25);
    }

    #[test]
    fn test_end_of_calendar_does_not_panic() {
        let svc = service();
        let now = time::parse_datetime("+262142-12-20T08:00").unwrap();
        let resp = svc.find_slots_at(strings(&["MOT"]), vec![], now);
        assert_eq!(resp.request.end_date, NaiveDate::MAX);
        assert!(!resp.results[0].can_fulfill_request);
    }
}
