//! Metric counters for authentication outcomes and cascade deletions.

use metrics::counter;

/// Record an authentication attempt outcome ("success",
/// "invalid_credentials", "not_confirmed", ...).
pub fn record_authentication(outcome: &'static str) {
    counter!("hirelane_authentication_total", "outcome" => outcome).increment(1);
}

/// Record a completed cascade deletion and how many dependent rows it swept.
pub fn record_cascade_delete(entity: &'static str, dependents: u64) {
    counter!("hirelane_cascade_deletes_total", "entity" => entity).increment(1);
    counter!("hirelane_cascade_dependents_total", "entity" => entity).increment(dependents);
}

/// Record an outbound mail dispatch outcome.
pub fn record_mail_dispatch(outcome: &'static str) {
    counter!("hirelane_mail_dispatch_total", "outcome" => outcome).increment(1);
}
