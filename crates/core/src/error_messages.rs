//! Translation of known backend error messages into user-facing Portuguese.

/// Returned when the backend produced no message at all.
pub const FALLBACK_MESSAGE: &str = "Ocorreu um erro inesperado.";

/// Known lowercase substrings and their replacements. Scanned in order;
/// the first match wins.
const KNOWN_ERRORS: &[(&str, &str)] = &[
    ("invalid login credentials", "E-mail ou senha incorretos."),
    (
        "email not confirmed",
        "E-mail não confirmado. Verifique sua caixa de entrada.",
    ),
    ("user already registered", "Este e-mail já está cadastrado."),
    (
        "password should be at least 6 characters",
        "A senha deve ter pelo menos 6 caracteres.",
    ),
    (
        "unable to validate email address: invalid format",
        "Formato de e-mail inválido.",
    ),
    (
        "email rate limit exceeded",
        "Muitas tentativas. Aguarde alguns minutos e tente novamente.",
    ),
    (
        "new password should be different from the old password",
        "A nova senha deve ser diferente da senha atual.",
    ),
    (
        "token has expired or is invalid",
        "O link expirou ou é inválido. Solicite um novo.",
    ),
    (
        "for security purposes, you can only request this after",
        "Por segurança, aguarde alguns segundos antes de tentar novamente.",
    ),
    (
        "signups not allowed for this instance",
        "Novos cadastros estão desativados no momento.",
    ),
    ("user not found", "Usuário não encontrado."),
    ("jwt expired", "Sua sessão expirou. Faça login novamente."),
    (
        "failed to fetch",
        "Não foi possível conectar ao servidor. Verifique sua conexão.",
    ),
];

/// Map a raw backend message to its localized form.
///
/// Unknown messages pass through unchanged; blank messages become
/// [`FALLBACK_MESSAGE`].
pub fn translate_error(message: &str) -> String {
    if message.trim().is_empty() {
        return FALLBACK_MESSAGE.to_string();
    }

    let lowered = message.to_lowercase();
    KNOWN_ERRORS
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, translated)| (*translated).to_string())
        .unwrap_or_else(|| message.to_string())
}
