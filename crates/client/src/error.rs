use engenha_core::error::CoreError;
use engenha_core::error_messages::translate_error;
use engenha_core::validation::ValidationErrors;
use engenha_db::{GatewayError, RepoError};

use crate::config::ConfigError;

/// Errors returned by stores and flows.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// An auth failure, already translated for display.
    #[error("{0}")]
    Auth(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Translate an auth gateway failure into the user-facing message.
    pub fn auth(err: &GatewayError) -> Self {
        ClientError::Auth(translate_error(&err.to_string()))
    }

    pub fn no_workspace() -> Self {
        ClientError::Core(CoreError::Precondition(
            "Nenhum workspace selecionado.".to_string(),
        ))
    }

    /// The message to show the user. Backend messages go through the
    /// translator; everything else is shown as-is.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Auth(message) => message.clone(),
            ClientError::Repo(err) => match err.gateway_message() {
                Some(message) => translate_error(&message),
                None => err.to_string(),
            },
            ClientError::Validation(errors) => errors
                .violations
                .first()
                .map(|v| v.message.clone())
                .unwrap_or_else(|| errors.to_string()),
            ClientError::Core(CoreError::Precondition(message)) => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_are_translated() {
        let err = ClientError::auth(&GatewayError::api(400, "Invalid login credentials"));
        assert_eq!(err.to_string(), "E-mail ou senha incorretos.");
    }

    #[test]
    fn repo_errors_show_the_translated_backend_message() {
        let err = ClientError::from(RepoError::Gateway {
            context: "Erro ao excluir obra",
            source: GatewayError::api(500, "some totally unknown failure"),
        });
        assert_eq!(err.user_message(), "some totally unknown failure");
    }
}
