use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::allocator;
use crate::catalog::Catalog;
use crate::model::{AvailableSlot, ScheduleItem, UnmetDependency, Workshop, WorkshopAvailability};
use crate::time;

/// Days after "now" within which every job of a plan must be placed.
pub const HORIZON_DAYS: i64 = 60;

/// Last date a job may be placed on for a request made on `start`, or
/// `None` when that date is past the end of the calendar.
pub fn horizon_end(start: NaiveDate) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::days(HORIZON_DAYS))
}

// ---------------------------------------------------------------------------
// Execution plan
// ---------------------------------------------------------------------------

/// Build the ordered, duplicate-free job queue for a request.
///
/// Dependencies of the requested repairs come first, then the requested
/// services in caller order, then the requested repairs in caller order.
/// A job that is already queued is skipped.
pub fn build_execution_plan(catalog: &Catalog, services: &[String], repairs: &[String]) -> Vec<String> {
    let mut plan: Vec<String> = Vec::with_capacity(services.len() + repairs.len());
    let mut added: HashSet<&str> = HashSet::new();

    let dependencies = repairs
        .iter()
        .filter_map(|r| catalog.repair_definition(r))
        .filter_map(|def| def.dependency.as_ref());

    for job in dependencies.chain(services).chain(repairs) {
        if added.insert(job.as_str()) {
            plan.push(job.clone());
        }
    }
    plan
}

/// Requested repairs whose dependency service wasn't requested alongside
/// them, in request order. Each repair is reported once.
pub fn unmet_dependencies(
    catalog: &Catalog,
    services: &[String],
    repairs: &[String],
) -> Vec<UnmetDependency> {
    let requested: HashSet<&str> = services.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unmet: Vec<UnmetDependency> = Vec::new();

    for repair in repairs {
        if !seen.insert(repair.as_str()) {
            continue;
        }
        let dependency = catalog
            .repair_definition(repair)
            .and_then(|def| def.dependency.as_ref());
        if let Some(dep) = dependency {
            if !requested.contains(dep.as_str()) {
                unmet.push(UnmetDependency {
                    repair: repair.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    unmet
}

// ---------------------------------------------------------------------------
// Capability check
// ---------------------------------------------------------------------------

/// Jobs from `jobs` that no bay of `workshop` lists on any weekday, or that
/// the catalog doesn't define. Independent of dates and opening hours.
pub fn unsupported_jobs(catalog: &Catalog, workshop: &Workshop, jobs: &[String]) -> Vec<String> {
    jobs.iter()
        .filter(|job| !catalog.contains(job) || !workshop.bays.iter().any(|bay| bay.lists(job)))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Per-workshop placement
// ---------------------------------------------------------------------------

/// Place every job of `plan` sequentially at `workshop`, starting from the
/// workshop's next opening at or after `now`.
///
/// Each job starts no earlier than the end of the job before it. Returns
/// `None` as soon as one job can't be placed within the horizon.
pub fn schedule_workshop(
    catalog: &Catalog,
    workshop: &Workshop,
    plan: &[String],
    now: NaiveDateTime,
) -> Option<AvailableSlot> {
    let horizon = horizon_end(now.date())?;
    let opening = time::next_opening(workshop, now)?;
    let (mut date, mut from_hour) = (opening.date(), time::hour_of(opening.time()));
    let mut schedule: Vec<ScheduleItem> = Vec::with_capacity(plan.len());

    for job in plan {
        let item = allocator::find_earliest_slot(catalog, workshop, job, date, from_hour, horizon)?;
        date = item.date;
        from_hour = item.end_hour;
        schedule.push(item);
    }

    build_slot(schedule)
}

fn build_slot(schedule: Vec<ScheduleItem>) -> Option<AvailableSlot> {
    let first = schedule.first()?;
    let last = schedule.last()?;

    let span = time::days_between(
        time::at_hour(first.date, 0.0),
        time::at_hour(last.date, 0.0),
    );

    Some(AvailableSlot {
        check_in: time::format_instant(first.date, first.start_hour),
        check_out: time::format_instant(last.date, last.end_hour),
        total_work_hours: schedule.iter().map(|item| item.duration).sum(),
        total_days: (span + 1) as u32,
        schedule,
    })
}

/// Evaluate one workshop against an execution plan.
pub fn evaluate_workshop(
    catalog: &Catalog,
    workshop: &Workshop,
    plan: &[String],
    now: NaiveDateTime,
) -> WorkshopAvailability {
    match schedule_workshop(catalog, workshop, plan, now) {
        Some(slot) => {
            tracing::debug!(
                workshop = %workshop.id,
                check_in = %slot.check_in,
                check_out = %slot.check_out,
                "workshop can fulfil request"
            );
            WorkshopAvailability {
                workshop_id: workshop.id.clone(),
                workshop_name: workshop.name.clone(),
                can_fulfill_request: true,
                missing_jobs: Vec::new(),
                unmet_dependencies: Vec::new(),
                available_slots: vec![slot],
            }
        }
        None => {
            let missing_jobs = unsupported_jobs(catalog, workshop, plan);
            tracing::debug!(
                workshop = %workshop.id,
                missing = ?missing_jobs,
                "workshop cannot fulfil request"
            );
            WorkshopAvailability {
                workshop_id: workshop.id.clone(),
                workshop_name: workshop.name.clone(),
                can_fulfill_request: false,
                missing_jobs,
                unmet_dependencies: Vec::new(),
                available_slots: Vec::new(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Find, for every workshop in catalog order, a complete placement of the
/// requested services and repairs as of `now`.
///
/// When a requested repair's dependency service wasn't requested, no
/// placement is attempted: every workshop reports the dependency in
/// `missing_jobs` (followed by any other unsupported jobs) together with the
/// `unmet_dependencies` detail.
pub fn find_slots(
    catalog: &Catalog,
    services: &[String],
    repairs: &[String],
    now: NaiveDateTime,
) -> Vec<WorkshopAvailability> {
    let plan = build_execution_plan(catalog, services, repairs);
    let unmet = unmet_dependencies(catalog, services, repairs);

    if !unmet.is_empty() {
        tracing::info!(unmet = ?unmet, "request has unmet repair dependencies");
        return catalog
            .workshops()
            .iter()
            .map(|workshop| dependency_failure(catalog, workshop, &plan, &unmet))
            .collect();
    }

    catalog
        .workshops()
        .iter()
        .map(|workshop| evaluate_workshop(catalog, workshop, &plan, now))
        .collect()
}

fn dependency_failure(
    catalog: &Catalog,
    workshop: &Workshop,
    plan: &[String],
    unmet: &[UnmetDependency],
) -> WorkshopAvailability {
    let mut missing_jobs: Vec<String> = Vec::new();
    let reported = unmet
        .iter()
        .map(|u| u.dependency.clone())
        .chain(unsupported_jobs(catalog, workshop, plan));
    for job in reported {
        if !missing_jobs.contains(&job) {
            missing_jobs.push(job);
        }
    }

    WorkshopAvailability {
        workshop_id: workshop.id.clone(),
        workshop_name: workshop.name.clone(),
        can_fulfill_request: false,
        missing_jobs,
        unmet_dependencies: unmet.to_vec(),
        available_slots: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
