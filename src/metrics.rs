//! Counters emitted by the service.
//!
//! This crate only emits through the `metrics` facade and never installs a
//! recorder, and neither does the `shrtn` binary. Whoever embeds the service
//! must install one (for example a Prometheus exporter built with
//! `metrics-exporter-prometheus`) before [`register_metrics`] is called;
//! without a recorder every call below is a no-op.

use metrics::{counter, describe_counter};

/// Metric names.
pub mod names {
    pub const MAPPINGS_CREATED_TOTAL: &str = "shrtn_mappings_created_total";
    pub const CODE_COLLISIONS_TOTAL: &str = "shrtn_code_collisions_total";
    pub const REDIRECTS_TOTAL: &str = "shrtn_redirects_total";
    pub const REDIRECT_CACHE_HITS_TOTAL: &str = "shrtn_redirect_cache_hits_total";
    pub const REDIRECT_CACHE_MISSES_TOTAL: &str = "shrtn_redirect_cache_misses_total";
    pub const VISIT_INCREMENT_FAILURES_TOTAL: &str = "shrtn_visit_increment_failures_total";
}

/// Registers metric descriptions with the installed recorder.
pub fn register_metrics() {
    describe_counter!(names::MAPPINGS_CREATED_TOTAL, "Short links created");
    describe_counter!(
        names::CODE_COLLISIONS_TOTAL,
        "Generated codes rejected because they were already taken"
    );
    describe_counter!(names::REDIRECTS_TOTAL, "Successful redirects");
    describe_counter!(
        names::REDIRECT_CACHE_HITS_TOTAL,
        "Redirects served from the cache"
    );
    describe_counter!(
        names::REDIRECT_CACHE_MISSES_TOTAL,
        "Redirects that went to the mapping store"
    );
    describe_counter!(
        names::VISIT_INCREMENT_FAILURES_TOTAL,
        "Queued visit increments dropped after all retries"
    );
}

pub fn mapping_created() {
    counter!(names::MAPPINGS_CREATED_TOTAL).increment(1);
}

pub fn code_collision() {
    counter!(names::CODE_COLLISIONS_TOTAL).increment(1);
}

pub fn redirect(cache_hit: bool) {
    counter!(names::REDIRECTS_TOTAL).increment(1);
    if cache_hit {
        counter!(names::REDIRECT_CACHE_HITS_TOTAL).increment(1);
    } else {
        counter!(names::REDIRECT_CACHE_MISSES_TOTAL).increment(1);
    }
}

pub fn visit_increment_failed() {
    counter!(names::VISIT_INCREMENT_FAILURES_TOTAL).increment(1);
}
