use crate::client::ConsoleApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    Healthy { key_count: u64 },
    Unavailable(String),
}

impl StatusReport {
    /// One-line summary for the status area.
    pub fn headline(&self) -> String {
        match self {
            StatusReport::Healthy { .. } => "service healthy (running)".to_string(),
            StatusReport::Unavailable(reason) => format!("service unavailable: {reason}"),
        }
    }
}

/// Probe `GET /api/status` once. Every failure is reported the same way.
pub async fn probe(api: &dyn ConsoleApi) -> StatusReport {
    match api.status().await {
        Ok(status) => StatusReport::Healthy {
            key_count: status.key_count,
        },
        Err(err) => {
            tracing::warn!(error = %err, "status probe failed");
            StatusReport::Unavailable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fail, FakeApi};
    use crate::types::ServiceStatus;

    #[tokio::test]
    async fn healthy_reports_key_count() {
        let api = FakeApi::new();
        api.set_status(Ok(ServiceStatus {
            key_count: 7,
            status: Some("ok".into()),
            service: Some("baojimi-lite".into()),
        }));
        let report = probe(&api).await;
        assert_eq!(report, StatusReport::Healthy { key_count: 7 });
        assert_eq!(report.headline(), "service healthy (running)");
    }

    #[tokio::test]
    async fn any_failure_is_unavailable() {
        let api = FakeApi::new();
        api.set_status(Err(Fail::Status(503, None)));
        let report = probe(&api).await;
        assert!(matches!(report, StatusReport::Unavailable(_)));
        assert!(report.headline().starts_with("service unavailable"));
    }
}
