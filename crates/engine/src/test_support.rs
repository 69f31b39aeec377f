//! Fixtures shared by the unit tests.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::catalog::Catalog;
use crate::model::{
    Bay, Capability, CatalogConfig, DayOfWeek, RepairDefinition, ServiceDefinition, WorkingHours,
    Workshop,
};

pub const WEEKDAYS: [DayOfWeek; 5] = [
    DayOfWeek::Monday,
    DayOfWeek::Tuesday,
    DayOfWeek::Wednesday,
    DayOfWeek::Thursday,
    DayOfWeek::Friday,
];

pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

pub fn capability(jobs: &[&str], days: &[DayOfWeek]) -> Capability {
    jobs.iter().map(|j| (j.to_string(), days.to_vec())).collect()
}

pub fn hours(days: &[DayOfWeek], open: &str, close: &str) -> BTreeMap<DayOfWeek, Option<WorkingHours>> {
    days.iter()
        .map(|d| {
            (
                *d,
                Some(WorkingHours {
                    open: open.to_string(),
                    close: close.to_string(),
                }),
            )
        })
        .collect()
}

/// Open Monday to Friday 09:00-17:00 with one bay doing every job on
/// every weekday.
pub fn weekday_workshop() -> Workshop {
    Workshop {
        id: "w1".to_string(),
        name: "Central Garage".to_string(),
        bays: vec![Bay {
            id: "bay-1".to_string(),
            services: vec![capability(&["MOT", "Oil Change"], &WEEKDAYS)],
            repairs: vec![capability(&["Brakes", "Engine Rebuild"], &WEEKDAYS)],
        }],
        working_hours: hours(&WEEKDAYS, "09:00", "17:00"),
    }
}

/// MOT (1h), Oil Change (0.5h), Brakes (2h, needs MOT), Engine Rebuild (10h).
pub fn sample_config() -> CatalogConfig {
    CatalogConfig {
        services: vec![
            ServiceDefinition {
                name: "MOT".to_string(),
                duration: 1.0,
            },
            ServiceDefinition {
                name: "Oil Change".to_string(),
                duration: 0.5,
            },
        ],
        repairs: vec![
            RepairDefinition {
                name: "Brakes".to_string(),
                duration: 2.0,
                dependency: Some("MOT".to_string()),
            },
            RepairDefinition {
                name: "Engine Rebuild".to_string(),
                duration: 10.0,
                dependency: None,
            },
        ],
        workshops: vec![weekday_workshop()],
    }
}

pub fn sample_catalog() -> Catalog {
    Catalog::from_config(sample_config()).unwrap()
}

pub fn catalog_with(workshops: Vec<Workshop>) -> Catalog {
    let mut config = sample_config();
    config.workshops = workshops;
    Catalog::from_config(config).unwrap()
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
