use chrono::NaiveDate;

use crate::catalog::Catalog;
use crate::model::{Bay, DayOfWeek, ScheduleItem, Workshop};
use crate::time::{self, day_of_week, hour_of};

/// Tolerance when comparing fractional hours against a closing time.
const HOUR_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Bay selection
// ---------------------------------------------------------------------------

/// First bay, in declared order, that can perform `job` on `day`.
pub fn first_capable_bay<'a>(workshop: &'a Workshop, job: &str, day: DayOfWeek) -> Option<&'a Bay> {
    workshop.bays.iter().find(|bay| bay.supports(job, day))
}

// ---------------------------------------------------------------------------
// Earliest-slot search
// ---------------------------------------------------------------------------

/// Find the earliest placement of `job` on `date` at or after `from_hour`,
/// or on a later day no later than `horizon`.
///
/// Hours are kept as exact fractions so a job never starts before the one
/// placed ahead of it ends. On each open day the candidate start is the
/// opening time, or `from_hour` when that is later; the job must finish by
/// the closing time in some bay that declares it for that weekday. Jobs the
/// catalog doesn't know are never placed.
pub fn find_earliest_slot(
    catalog: &Catalog,
    workshop: &Workshop,
    job: &str,
    date: NaiveDate,
    from_hour: f64,
    horizon: NaiveDate,
) -> Option<ScheduleItem> {
    let job_type = catalog.job_type(job)?;
    let duration = catalog.job_duration(job);

    let (mut date, mut from_hour) = (date, from_hour);
    while date <= horizon {
        let day = day_of_week(date);

        if let Some((open, close)) = workshop.window(day) {
            let start = open.max(from_hour);
            let end = start + duration;

            if end <= close + HOUR_EPSILON {
                if let Some(bay) = first_capable_bay(workshop, job, day) {
                    return Some(ScheduleItem {
                        job_name: job.to_string(),
                        job_type,
                        bay_id: bay.id.clone(),
                        date,
                        start_hour: start,
                        // float noise within the tolerance never reports past close
                        end_hour: end.min(close),
                        duration,
                    });
                }
            }
        }

        // Closed, no capable bay, or the job runs past closing: next open day
        let next = time::next_day_start(workshop, date)?;
        date = next.date();
        from_hour = hour_of(next.time());
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
