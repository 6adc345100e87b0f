use crate::dto::HealthRes;

/// Simple health service for the REST API and the CLI.
///
/// This service provides a standardised way to check that the Paeon service is up and reports
/// the running crate version alongside the status.
#[derive(Clone, Debug, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    ///
    /// # Returns
    /// A new `HealthService` instance.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// This is the preferred method for health checks as it doesn't require
    /// instantiating the service.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy, with the crate version.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Paeon is alive".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_alive() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert_eq!(res.message, "Paeon is alive");
        assert!(!res.version.is_empty());
    }
}
