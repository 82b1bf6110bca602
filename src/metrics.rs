use metrics::{counter, describe_counter};

/// Register metric descriptions with the installed recorder (can be called multiple times safely)
pub fn describe_metrics() {
    describe_counter!(
        "elastic_requests_total",
        "Total number of requests sent to the Elasticsearch backend"
    );
    describe_counter!(
        "elastic_dashboard_saves_total",
        "Total number of dashboards saved"
    );
}

/// Record a backend request and its outcome
pub fn record_backend_request(method: &str, outcome: &str) {
    counter!(
        "elastic_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}

/// Record a dashboard save (`permanent` or `temp`)
pub fn record_dashboard_save(kind: &str) {
    counter!(
        "elastic_dashboard_saves_total",
        "kind" => kind.to_string(),
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_metrics() {
        describe_metrics();

        record_backend_request("GET", "success");
        record_backend_request("PUT", "error");
        record_dashboard_save("temp");

        // No recorder is installed here, only verify the calls don't panic
    }
}
