use std::io::{self, Read, Write};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use workshop_availability::availability::{self, AvailabilityService, RequestError};
use workshop_availability::catalog::{self, Catalog};
use workshop_availability::{logging, validator};

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
enum Request {
    FindSlots {
        /// Kept loose so that non-array input is reported as a validation
        /// error instead of a JSON error.
        services: Option<Value>,
        repairs: Option<Value>,
        /// Evaluate as of this local datetime instead of the wall clock.
        now: Option<String>,
    },
    Validate,
}

#[derive(Debug, Serialize)]
struct OkResponse<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrResponse {
    success: bool,
    error: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_ok<T: Serialize>(data: T) {
    let resp = OkResponse {
        success: true,
        data,
    };
    let json = serde_json::to_string(&resp).unwrap_or_else(|e| {
        format!("{{\"success\":false,\"error\":\"serialization error: {}\"}}", e)
    });
    println!("{}", json);
    let _ = io::stdout().flush();
}

fn write_err(msg: impl std::fmt::Display) -> ! {
    let resp = ErrResponse {
        success: false,
        error: msg.to_string(),
    };
    let json = serde_json::to_string(&resp).unwrap_or_else(|_| {
        "{\"success\":false,\"error\":\"double serialization error\"}".to_string()
    });
    println!("{}", json);
    let _ = io::stdout().flush();
    std::process::exit(1);
}

fn parse_request(
    services: Option<Value>,
    repairs: Option<Value>,
    now: Option<String>,
) -> Result<(Vec<String>, Vec<String>, Option<NaiveDateTime>), RequestError> {
    let services = availability::parse_job_names("services", services.as_ref())?;
    let repairs = availability::parse_job_names("repairs", repairs.as_ref())?;
    let now = now.as_deref().map(availability::parse_now).transpose()?;
    Ok((services, repairs, now))
}

fn find_slots(services: Option<Value>, repairs: Option<Value>, now: Option<String>) {
    let (services, repairs, now) = match parse_request(services, repairs, now) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "rejected request");
            write_err(e)
        }
    };

    let path = catalog::config_path();
    let catalog = match Catalog::load(&path) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "failed to load catalog");
            write_err(e)
        }
    };

    let service = AvailabilityService::new(catalog);
    let response = match now {
        Some(now) => service.find_slots_at(services, repairs, now),
        None => service.find_slots(services, repairs),
    };
    write_ok(response);
}

fn validate() {
    let path = catalog::config_path();
    match catalog::read_config(&path) {
        Ok(config) => write_ok(validator::validate(&config)),
        Err(e) => {
            tracing::error!(error = %e, "failed to read configuration");
            write_err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    logging::init();

    // Read all of stdin
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        write_err(format!("Failed to read stdin: {}", e));
    }

    // Parse request
    let request: Request = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => write_err(format!("Invalid JSON input: {}", e)),
    };

    match request {
        Request::FindSlots {
            services,
            repairs,
            now,
        } => find_slots(services, repairs, now),
        Request::Validate => validate(),
    }
}
