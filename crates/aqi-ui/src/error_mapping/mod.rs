//! Maps UI service errors to aqi_core::AppError for consistent user-facing messages.

use aqi_core::{AppError, ConfigError};

use crate::services::ServiceError;

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Client(client_error) => client_error.into(),
            ServiceError::NotInitialized => {
                AppError::Config(ConfigError::MissingSetting("air-quality client".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqi_client::ClientError;
    use aqi_core::NetworkError;

    #[test]
    fn network_failures_stay_network() {
        let app: AppError = ServiceError::Client(ClientError::Network(NetworkError::Timeout)).into();
        assert!(matches!(app, AppError::Network(NetworkError::Timeout)));
    }

    #[test]
    fn uninitialized_is_a_config_problem() {
        let app: AppError = ServiceError::NotInitialized.into();
        assert!(matches!(app, AppError::Config(ConfigError::MissingSetting(_))));
    }
}
