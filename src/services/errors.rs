//! Service error types.

use thiserror::Error;

use crate::services::ServiceKind;

/// Failure raised by a representation's services.
///
/// These propagate to whoever called the service; the factory never sees
/// them unless a provider hits one while probing.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Nothing is bound for this kind of service.
    #[error("no {0} service is bound for this project")]
    Unbound(ServiceKind),

    /// A second implementation was offered for an already bound kind.
    #[error("a {0} service is already bound for this project")]
    AlreadyBound(ServiceKind),

    /// The service exists but has no implementation in the current state.
    #[error("operation not supported: {operation}")]
    Unsupported { operation: String },

    /// A mandatory collaborator could not be located.
    #[error("required service `{service}` is not available")]
    MissingService { service: String },

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn missing(service: impl Into<String>) -> Self {
        ServiceError::MissingService {
            service: service.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        ServiceError::Unsupported {
            operation: operation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ServiceError::Unbound(ServiceKind::ReferencesWriter).to_string(),
            "no references writer service is bound for this project"
        );
        assert_eq!(
            ServiceError::missing("deferred workspace").to_string(),
            "required service `deferred workspace` is not available"
        );
    }

    #[test]
    fn test_collaborator_is_transparent() {
        let err: ServiceError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.to_string(), "disk on fire");
    }
}
