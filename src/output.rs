//! Rendering of API responses for the command-line tool.

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info};

use crate::services::jobs::JobSummary;

/// Logs a response body using Rust's debug pretty-print format.
pub fn print_pretty(body: &Value) {
    debug!("{:#?}", body);
}

/// Logs a response body as pretty-printed JSON. Empty bodies log a marker
/// instead of `null`.
pub fn print_json(body: &Value) -> Result<()> {
    if body.is_null() {
        info!("Request succeeded with an empty response");
        return Ok(());
    }
    info!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

/// Logs one line per job followed by a per-status tally.
pub fn print_jobs(jobs: &[JobSummary]) {
    for job in jobs {
        info!(
            job_id = %job.id,
            title = %job.title,
            status = job.status.as_deref().unwrap_or("unknown"),
            "Job"
        );
    }

    let mut by_status: Vec<(&str, usize)> = Vec::new();
    for job in jobs {
        let status = job.status.as_deref().unwrap_or("unknown");
        match by_status.iter_mut().find(|(s, _)| *s == status) {
            Some((_, count)) => *count += 1,
            None => by_status.push((status, 1)),
        }
    }
    let tally = by_status
        .iter()
        .map(|(status, count)| format!("{status}={count}"))
        .collect::<Vec<_>>()
        .join(", ");

    info!(total = jobs.len(), statuses = %tally, "Job list summary");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&json!({"id": 1}));
    }

    #[test]
    fn test_print_json_handles_null_and_objects() {
        print_json(&Value::Null).unwrap();
        print_json(&json!({"id": 1, "status": "A"})).unwrap();
    }

    #[test]
    fn test_print_jobs_handles_empty_list() {
        print_jobs(&[]);
        print_jobs(&[JobSummary {
            id: "1".into(),
            title: "Wash".into(),
            status: None,
        }]);
    }
}
