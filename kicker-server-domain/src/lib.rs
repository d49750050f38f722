use thiserror::Error;

pub mod app;
pub mod game;
pub mod memory;
pub mod player;
pub mod rating;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::NotFound(msg.into()))
    }

    pub fn bad_request<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::BadRequest(msg.into()))
    }

    pub fn internal<T, R>(msg: T) -> ServiceResult<R>
    where
        T: Into<String>,
    {
        Err(ServiceError::Internal(msg.into()))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Soft-failure channel for expected, user-caused rejections. A `Warning`
/// carries the message shown to the caller and must never abort the
/// surrounding request; `ServiceError` is reserved for actual faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Warning(String),
}

impl<T> Outcome<T> {
    pub fn warning<M>(msg: M) -> Self
    where
        M: Into<String>,
    {
        Outcome::Warning(msg.into())
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Outcome::Warning(_))
    }
}
