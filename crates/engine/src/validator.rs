use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::{CatalogConfig, DayOfWeek};

// ---------------------------------------------------------------------------
// Validation result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validate implementation
// ---------------------------------------------------------------------------

/// Validate a configuration document, returning errors (block loading) and
/// warnings (advisory). Errors are listed before warnings.
pub fn validate(config: &CatalogConfig) -> ValidationResult {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    // -----------------------------------------------------------------------
    // Error: duplicate job names across both catalogs
    // -----------------------------------------------------------------------
    let mut seen: HashSet<&str> = HashSet::new();
    let job_names = config
        .services
        .iter()
        .map(|s| s.name.as_str())
        .chain(config.repairs.iter().map(|r| r.name.as_str()));
    for name in job_names {
        if !seen.insert(name) {
            errors.push(format!(
                "Duplicate job name '{}' -- service and repair names must be unique",
                name
            ));
        }
    }

    let service_names: HashSet<&str> = config.services.iter().map(|s| s.name.as_str()).collect();

    // -----------------------------------------------------------------------
    // Error: durations
    // -----------------------------------------------------------------------
    let durations = config
        .services
        .iter()
        .map(|s| (s.name.as_str(), s.duration))
        .chain(config.repairs.iter().map(|r| (r.name.as_str(), r.duration)));
    for (name, duration) in durations {
        if !duration.is_finite() || duration <= 0.0 {
            errors.push(format!(
                "Job '{}' has duration {} -- every job needs a positive duration in hours",
                name, duration
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Error: repair dependency must name a known service
    // -----------------------------------------------------------------------
    for repair in &config.repairs {
        if let Some(dep) = &repair.dependency {
            if !service_names.contains(dep.as_str()) {
                errors.push(format!(
                    "Repair '{}' depends on '{}' which isn't a defined service",
                    repair.name, dep
                ));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Per-workshop checks
    // -----------------------------------------------------------------------
    let mut workshop_ids: HashSet<&str> = HashSet::new();
    for workshop in &config.workshops {
        if !workshop_ids.insert(workshop.id.as_str()) {
            errors.push(format!(
                "Duplicate workshop ID '{}' -- each workshop must have a unique ID",
                workshop.id
            ));
        }

        // Error: malformed or inverted opening hours
        for (day, hours) in &workshop.working_hours {
            let Some(hours) = hours else { continue };
            match hours.window() {
                Ok((open, close)) if open >= close => errors.push(format!(
                    "Workshop '{}' opens at {} and closes at {} on {} -- close must be after open",
                    workshop.name, hours.open, hours.close, day
                )),
                Ok(_) => {}
                Err(e) => errors.push(format!(
                    "Workshop '{}' has invalid hours on {}: {}",
                    workshop.name, day, e
                )),
            }
        }

        let open_days: HashSet<DayOfWeek> = DayOfWeek::ALL
            .into_iter()
            .filter(|d| workshop.is_open(*d))
            .collect();
        if open_days.is_empty() {
            warnings.push(format!(
                "Workshop '{}' is never open -- it can't fulfil any request",
                workshop.name
            ));
        }
        if workshop.bays.is_empty() {
            warnings.push(format!(
                "Workshop '{}' has no bays -- it can't fulfil any request",
                workshop.name
            ));
        }

        let mut bay_ids: HashMap<&str, usize> = HashMap::new();
        for bay in &workshop.bays {
            *bay_ids.entry(bay.id.as_str()).or_default() += 1;

            for cap in bay.capabilities() {
                for (job, days) in cap {
                    // Warning: capability for a job the catalog doesn't define
                    if !seen.contains(job.as_str()) {
                        warnings.push(format!(
                            "Bay '{}' in workshop '{}' lists '{}' which isn't in the catalog -- it will be treated as unsupported",
                            bay.id, workshop.name, job
                        ));
                    }
                    // Warning: capability on a day the workshop is shut
                    for day in days {
                        if !open_days.contains(day) {
                            warnings.push(format!(
                                "Bay '{}' in workshop '{}' lists '{}' on {} but the workshop is closed that day",
                                bay.id, workshop.name, job, day
                            ));
                        }
                    }
                }
            }
        }

        // Error: duplicate bay IDs within one workshop
        let mut dup_bays: Vec<&str> = bay_ids
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(id, _)| id)
            .collect();
        dup_bays.sort_unstable();
        for id in dup_bays {
            errors.push(format!(
                "Workshop '{}' has duplicate bay ID '{}'",
                workshop.name, id
            ));
        }
    }

    ValidationResult { errors, warnings }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RepairDefinition, WorkingHours};
    use crate::test_support::sample_config;

    #[test]
    fn test_sample_config_is_clean() {
        let result = validate(&sample_config());
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "unexpected warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_duplicate_job_name() {
        let mut config = sample_config();
        config.repairs.push(RepairDefinition {
            name: "MOT".to_string(),
            duration: 1.0,
            dependency: None,
        });
        let result = validate(&config);
        assert!(result.errors.iter().any(|e| e.contains("Duplicate job name 'MOT'")));
    }

    #[test]
    fn test_non_positive_duration() {
        let mut config = sample_config();
        config.services[0].duration = 0.0;
        let result = validate(&config);
        assert!(!result.is_ok());
        assert!(result.errors[0].contains("positive duration"));
    }

    #[test]
    fn test_dependency_on_repair_is_an_error() {
        let mut config = sample_config();
        config.repairs.push(RepairDefinition {
            name: "Clutch".to_string(),
            duration: 4.0,
            dependency: Some("Brakes".to_string()),
        });
        let result = validate(&config);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("'Clutch' depends on 'Brakes'")));
    }

    #[test]
    fn test_bad_working_hours() {
        let mut config = sample_config();
        let hours = &mut config.workshops[0].working_hours;
        hours.insert(
            DayOfWeek::Monday,
            Some(WorkingHours {
                open: "9".to_string(),
                close: "17:00".to_string(),
            }),
        );
        hours.insert(
            DayOfWeek::Tuesday,
            Some(WorkingHours {
                open: "17:00".to_string(),
                close: "09:00".to_string(),
            }),
        );
        let result = validate(&config);
        assert_eq!(result.errors.len(), 2, "{:?}", result.errors);
        assert!(result.errors.iter().any(|e| e.contains("invalid hours on Monday")));
        assert!(result.errors.iter().any(|e| e.contains("close must be after open")));
    }

    #[test]
    fn test_duplicate_workshop_and_bay_ids() {
        let mut config = sample_config();
        let mut copy = config.workshops[0].clone();
        let bay = copy.bays[0].clone();
        copy.bays.push(bay);
        config.workshops.push(copy);

        let result = validate(&config);
        assert!(result.errors.iter().any(|e| e.contains("Duplicate workshop ID 'w1'")));
        assert!(result.errors.iter().any(|e| e.contains("duplicate bay ID 'bay-1'")));
    }

    #[test]
    fn test_unknown_job_in_bay_is_a_warning() {
        let mut config = sample_config();
        config.workshops[0].bays[0].repairs[0]
            .insert("Paint".to_string(), vec![DayOfWeek::Monday]);
        let result = validate(&config);
        assert!(result.is_ok());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("'Paint' which isn't in the catalog")));
    }

    #[test]
    fn test_capability_on_closed_day_is_a_warning() {
        let mut config = sample_config();
        config.workshops[0].bays[0].services[0]
            .insert("Oil Change".to_string(), vec![DayOfWeek::Sunday]);
        let result = validate(&config);
        assert!(result.is_ok());
        assert!(result.warnings.iter().any(|w| w.contains("on Sunday")));
    }

    #[test]
    fn test_never_open_workshop_is_a_warning() {
        let mut config = sample_config();
        config.workshops[0].working_hours.clear();
        config.workshops[0].bays.clear();
        let result = validate(&config);
        assert!(result.is_ok());
        assert!(result.warnings.iter().any(|w| w.contains("never open")));
        assert!(result.warnings.iter().any(|w| w.contains("no bays")));
    }
}
