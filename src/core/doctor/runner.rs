//! Check runner: folds named HTTP checks into a `DoctorReport`

use crate::core::doctor::client::HttpProbeClient;
use crate::core::doctor::http_check::{check_http_with, ProbeOptions};
use crate::core::doctor::types::{get_local_timestamp, CheckReport, DoctorReport, HttpCheck};
use futures::future::join_all;

/// Run every check concurrently; report order follows `checks`
pub async fn run_checks(
    checks: &[HttpCheck],
    options: &ProbeOptions,
    client: &dyn HttpProbeClient,
) -> DoctorReport {
    let checked_at = get_local_timestamp();

    let probes = checks.iter().map(|check| async move {
        CheckReport {
            name: check.name.clone(),
            result: check_http_with(&check.url, options, client).await,
        }
    });
    let reports = join_all(probes).await;

    DoctorReport {
        ok: reports.iter().all(|r| r.result.ok),
        checked_at,
        checks: reports,
    }
}
