use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::prioritization::{
    PrioritizationServiceError, RegistryError, RepositoryError, ScoringError,
};
use crate::workflows::tabular::CodecError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Registry(RegistryError),
    Scoring(ScoringError),
    Codec(CodecError),
    Service(PrioritizationServiceError),
}

impl AppError {
    /// Whether the fault lies in caller-supplied data rather than the host.
    pub fn is_input_fault(&self) -> bool {
        match self {
            AppError::Scoring(_) => true,
            AppError::Codec(err) => !matches!(err, CodecError::Io(_)),
            AppError::Service(err) => match err {
                PrioritizationServiceError::InvalidDraft(_)
                | PrioritizationServiceError::Scoring(_)
                | PrioritizationServiceError::Matrix(_) => true,
                PrioritizationServiceError::Codec(codec) => !matches!(codec, CodecError::Io(_)),
                PrioritizationServiceError::Repository(repository) => {
                    !matches!(repository, RepositoryError::Unavailable(_))
                }
            },
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Registry(_) => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Registry(err) => write!(f, "factor catalog error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Codec(err) => write!(f, "csv error: {}", err),
            AppError::Service(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Registry(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Codec(err) => Some(err),
            AppError::Service(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.is_input_fault() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RegistryError> for AppError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<ScoringError> for AppError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<CodecError> for AppError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<PrioritizationServiceError> for AppError {
    fn from(value: PrioritizationServiceError) -> Self {
        Self::Service(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::prioritization::TestId;

    #[test]
    fn caller_faults_map_to_bad_request() {
        let scoring = AppError::from(ScoringError::MissingFactorValue {
            test_id: TestId(4),
            factor: "repetitive".to_string(),
        });
        assert_eq!(scoring.into_response().status(), StatusCode::BAD_REQUEST);

        let codec = AppError::from(CodecError::MissingColumn {
            column: "Test ID".to_string(),
        });
        assert_eq!(codec.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn host_faults_map_to_server_error() {
        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(io.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let outage = AppError::from(PrioritizationServiceError::Repository(
            RepositoryError::Unavailable("offline".to_string()),
        ));
        assert!(!outage.is_input_fault());
        assert!(outage.to_string().contains("offline"));
    }
}
