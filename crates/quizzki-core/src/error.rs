//! Error types.
//!
//! `ApiError` covers everything that can go wrong between sending a request
//! and holding a decoded payload. `ValidationError` covers the local form
//! checks that run before any request is built. `FlowError` is what the
//! console flows return and wraps both.

use thiserror::Error;

use crate::session::Role;

/// Message shown when a response cannot be understood.
pub const UNEXPECTED_FORMAT: &str = "Formato no esperado para la respuesta";

/// Failures talking to the Quizzki API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message} (HTTP {status})")]
    Http { status: u16, message: String },

    /// The envelope's `status` was `"ERROR"`.
    #[error("{message}")]
    Server { message: String },

    /// The envelope carried no `data` where a payload was required.
    #[error("{}", fallback(.message))]
    MissingData { message: String },

    /// The body was not a well-formed envelope, or `data` had the wrong shape.
    #[error("Formato no esperado para la respuesta: {detail}")]
    UnexpectedFormat { detail: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The server could not be reached. Shown like a malformed response,
    /// with the transport detail appended.
    #[error("Formato no esperado para la respuesta: {0}")]
    Network(String),
}

fn fallback(message: &str) -> &str {
    if message.trim().is_empty() {
        UNEXPECTED_FORMAT
    } else {
        message
    }
}

impl ApiError {
    /// The message a screen should display for this error.
    pub fn message(&self) -> String {
        match self {
            ApiError::Http { message, .. } | ApiError::Server { message } => message.clone(),
            ApiError::MissingData { message } => fallback(message).to_string(),
            other => other.to_string(),
        }
    }
}

/// Local form checks. The messages are the ones the portal shows users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("El email es requerido")]
    EmailRequired,
    #[error("El email debe ser válido")]
    EmailInvalid,
    #[error("La contraseña es requerida")]
    PasswordRequired,
    #[error("La contraseña debe tener al menos 3 caracteres")]
    PasswordTooShort,
    #[error("La pregunta no puede estar vacía")]
    EmptyQuestion,
    #[error("La respuesta no puede estar vacía")]
    EmptyAnswer,
    #[error("El nombre de la evaluación es requerido")]
    EvaluationNameRequired,
    #[error("Seleccione un tema")]
    TopicRequired,
    #[error("Seleccione un grupo")]
    GroupRequired,
    #[error("El porcentaje debe estar entre 0 y 100")]
    PercentageOutOfRange,
    #[error("La fecha de finalización debe ser posterior a la de inicio")]
    EndBeforeStart,
}

/// Errors returned by the auth, teacher and student flows.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// An operation was attempted from a state that does not allow it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// No stored session for the role the operation needs.
    #[error("no active {0} session; run `quizzki login`")]
    NoSession(Role),
}

impl FlowError {
    /// Whether this failure was caught before any request was sent.
    pub fn is_local(&self) -> bool {
        !matches!(self, FlowError::Api(_))
    }
}
