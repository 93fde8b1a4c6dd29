//! Configuration for the trip planner.

use chrono::Duration;

use crate::domain::{DayClass, ServiceId};

/// Configuration parameters for trip planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Shortest allowed wait at a transfer stop (minutes, inclusive).
    pub min_transfer_mins: i64,

    /// Longest allowed wait at a transfer stop (minutes, inclusive).
    pub max_transfer_mins: i64,

    /// Maximum number of itineraries to return.
    pub max_results: usize,

    /// Service id assumed to run Monday to Friday.
    pub workday_service: ServiceId,

    /// Service id assumed to run on Saturdays.
    pub saturday_service: ServiceId,

    /// Service id assumed to run on Sundays.
    pub sunday_service: ServiceId,

    /// Whether the day-class service ids are added to every active set.
    /// Feeds that model all service through the calendar should turn this off.
    pub use_fallback_services: bool,
}

impl PlannerConfig {
    /// Set the transfer window bounds.
    pub fn with_transfer_window(mut self, min_mins: i64, max_mins: i64) -> Self {
        self.min_transfer_mins = min_mins;
        self.max_transfer_mins = max_mins;
        self
    }

    /// Set the maximum number of results.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the day-class service ids.
    pub fn with_fallback_services(
        mut self,
        workday: impl Into<ServiceId>,
        saturday: impl Into<ServiceId>,
        sunday: impl Into<ServiceId>,
    ) -> Self {
        self.workday_service = workday.into();
        self.saturday_service = saturday.into();
        self.sunday_service = sunday.into();
        self.use_fallback_services = true;
        self
    }

    /// Stop adding day-class service ids.
    pub fn without_fallback_services(mut self) -> Self {
        self.use_fallback_services = false;
        self
    }

    /// Returns the minimum transfer wait as a Duration.
    pub fn min_transfer(&self) -> Duration {
        Duration::minutes(self.min_transfer_mins)
    }

    /// Returns the maximum transfer wait as a Duration.
    pub fn max_transfer(&self) -> Duration {
        Duration::minutes(self.max_transfer_mins)
    }

    /// Returns true if a wait is inside the transfer window.
    pub fn accepts_wait(&self, wait: Duration) -> bool {
        self.min_transfer() <= wait && wait <= self.max_transfer()
    }

    /// The fallback service id for a day class, if fallbacks are enabled.
    pub fn fallback_service(&self, class: DayClass) -> Option<&ServiceId> {
        if !self.use_fallback_services {
            return None;
        }
        Some(match class {
            DayClass::Workday => &self.workday_service,
            DayClass::Saturday => &self.saturday_service,
            DayClass::Sunday => &self.sunday_service,
        })
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_transfer_mins: 3,
            max_transfer_mins: 20,
            max_results: 5,
            workday_service: ServiceId::new("HP"),
            saturday_service: ServiceId::new("SZ"),
            sunday_service: ServiceId::new("VV"),
            use_fallback_services: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.min_transfer_mins, 3);
        assert_eq!(config.max_transfer_mins, 20);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.workday_service.as_str(), "HP");
        assert_eq!(config.saturday_service.as_str(), "SZ");
        assert_eq!(config.sunday_service.as_str(), "VV");
        assert!(config.use_fallback_services);
    }

    #[test]
    fn duration_methods() {
        let config = PlannerConfig::default();

        assert_eq!(config.min_transfer(), Duration::minutes(3));
        assert_eq!(config.max_transfer(), Duration::minutes(20));
    }

    #[test]
    fn transfer_window_is_inclusive() {
        let config = PlannerConfig::default();

        assert!(!config.accepts_wait(Duration::minutes(2)));
        assert!(config.accepts_wait(Duration::minutes(3)));
        assert!(config.accepts_wait(Duration::minutes(20)));
        assert!(!config.accepts_wait(Duration::minutes(21)));
        assert!(!config.accepts_wait(Duration::minutes(-5)));
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::default()
            .with_transfer_window(5, 30)
            .with_max_results(3)
            .with_fallback_services("W", "SA", "SU");

        assert_eq!(config.min_transfer_mins, 5);
        assert_eq!(config.max_transfer_mins, 30);
        assert_eq!(config.max_results, 3);
        assert_eq!(
            config.fallback_service(DayClass::Saturday),
            Some(&ServiceId::new("SA"))
        );
    }

    #[test]
    fn fallbacks_can_be_disabled() {
        let config = PlannerConfig::default().without_fallback_services();

        assert_eq!(config.fallback_service(DayClass::Workday), None);
        assert_eq!(config.fallback_service(DayClass::Sunday), None);
    }
}
