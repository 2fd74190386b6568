use thiserror::Error;

pub type WcsResult<T> = Result<T, WcsError>;

#[derive(Debug, Error)]
pub enum WcsError {
    #[error("Missing required WCS keyword: {keyword}")]
    MissingKeyword { keyword: String },

    #[error("Invalid WCS keyword '{keyword}': {message}")]
    InvalidKeyword { keyword: String, message: String },

    #[error("Unsupported projection: {code}")]
    UnsupportedProjection { code: String },

    #[error("Singularity in transformation: {message}")]
    Singularity { message: String },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Convergence failure: {message}")]
    ConvergenceFailure { message: String },

    #[error("Non-invertible matrix (determinant = {determinant})")]
    NonInvertibleMatrix { determinant: f64 },

    #[error("WCS has no usable pixel extent: {message}")]
    MissingExtent { message: String },
}

impl WcsError {
    pub fn missing_keyword(keyword: impl Into<String>) -> Self {
        Self::MissingKeyword {
            keyword: keyword.into(),
        }
    }

    pub fn invalid_keyword(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKeyword {
            keyword: keyword.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_projection(code: impl Into<String>) -> Self {
        Self::UnsupportedProjection { code: code.into() }
    }

    pub fn singularity(message: impl Into<String>) -> Self {
        Self::Singularity {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn convergence_failure(message: impl Into<String>) -> Self {
        Self::ConvergenceFailure {
            message: message.into(),
        }
    }

    pub fn non_invertible_matrix(determinant: f64) -> Self {
        Self::NonInvertibleMatrix { determinant }
    }

    pub fn missing_extent(message: impl Into<String>) -> Self {
        Self::MissingExtent {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keyword() {
        let err = WcsError::missing_keyword("CRPIX1");
        assert!(err.to_string().contains("CRPIX1"));
    }

    #[test]
    fn test_invalid_keyword() {
        let err = WcsError::invalid_keyword("A_ORDER", "order must be non-negative");
        assert!(err.to_string().contains("A_ORDER"));
        assert!(err.to_string().contains("order must be non-negative"));
    }

    #[test]
    fn test_unsupported_projection() {
        let err = WcsError::unsupported_projection("HPX");
        assert!(err.to_string().contains("HPX"));
    }

    #[test]
    fn test_convergence_failure() {
        let err = WcsError::convergence_failure("SIP inverse distortion");
        assert!(err.to_string().contains("SIP inverse distortion"));
    }

    #[test]
    fn test_missing_extent() {
        let err = WcsError::missing_extent("NAXIS1 is zero");
        assert!(err.to_string().contains("NAXIS1 is zero"));
    }

    #[test]
    fn test_non_invertible_matrix() {
        let err = WcsError::non_invertible_matrix(0.0);
        assert!(err.to_string().contains("0"));
    }
}
