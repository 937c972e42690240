//! Login: exchange credentials for a [`Session`].

use tracing::instrument;

use crate::envelope::Reply;
use crate::error::FlowError;
use crate::model::LoginCredentials;
use crate::session::{Role, Session};
use crate::traits::QuizzkiApi;
use crate::validation::validate_login;

/// Validate the form, then authenticate against the role's endpoint.
///
/// Nothing is sent when validation fails. On success the session carries
/// the token and id from the response exactly as received; persisting it is
/// the caller's job.
#[instrument(skip_all, fields(role = %role))]
pub async fn login<A: QuizzkiApi + ?Sized>(
    api: &A,
    role: Role,
    email: &str,
    password: &str,
) -> Result<Reply<Session>, FlowError> {
    validate_login(email, password)?;

    let credentials = LoginCredentials {
        email: email.to_string(),
        password: password.to_string(),
    };
    let reply = api.login(role, &credentials).await?;
    tracing::info!(id = %reply.data.id, "login succeeded");

    Ok(reply.map(|grant| Session {
        role,
        token: grant.token,
        id: grant.id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ValidationError};
    use crate::mock::{Call, MockApi};

    #[tokio::test]
    async fn invalid_email_never_reaches_network() {
        let api = MockApi::new();
        for email in ["", "nope", "a@b", "a @b.com"] {
            let err = login(&api, Role::Student, email, "secret").await.unwrap_err();
            assert!(matches!(err, FlowError::Validation(_)), "{email}: {err}");
        }
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn short_password_never_reaches_network() {
        let api = MockApi::new();
        let err = login(&api, Role::Teacher, "a@b.com", "xy").await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::Validation(ValidationError::PasswordTooShort)
        ));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn teacher_login_session_matches_response() {
        let api = MockApi::new().with_grant("jwt-abc", "27");
        let reply = login(&api, Role::Teacher, "a@b.com", "xyz").await.unwrap();

        assert_eq!(reply.data, Session::new(Role::Teacher, "jwt-abc", "27"));
        assert_eq!(reply.message, "Login exitoso");
        assert_eq!(api.calls(), vec![Call::Login(Role::Teacher)]);
        assert_eq!(
            api.last_body("login").unwrap(),
            serde_json::json!({"email": "a@b.com", "password": "xyz"})
        );
    }

    #[tokio::test]
    async fn server_rejection_is_surfaced() {
        let api = MockApi::new().failing_endpoint(
            "login",
            ApiError::Server {
                message: "Usuario no encontrado".into(),
            },
        );
        let err = login(&api, Role::Student, "a@b.com", "xyz").await.unwrap_err();
        assert_eq!(err.to_string(), "Usuario no encontrado");
    }
}
