//! Form schemas for the dashboard's create/update and auth forms.

use super::schema::{Field, Schema};

/// Accepted values for `contratante_tipo`.
pub const CONTRATANTE_TIPOS: &[&str] = &["pessoa_fisica", "pessoa_juridica", "orgao_publico"];

/// Accepted values for an acervo item's `tipo_documento`.
pub const TIPOS_DOCUMENTO: &[&str] = &[
    "art", "rrt", "cat", "contrato", "projeto", "laudo", "foto", "outro",
];

/// Minimum password length enforced by the auth provider.
pub const MIN_PASSWORD_LENGTH: usize = 6;

const CNPJ_PATTERN: &str = r"^\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}$";

pub fn obra_schema() -> Schema {
    Schema::new("obra")
        .field(
            Field::new("descricao_obra")
                .required("A descrição da obra é obrigatória.")
                .min_length(3, "A descrição deve ter pelo menos 3 caracteres.")
                .max_length(500, "A descrição deve ter no máximo 500 caracteres."),
        )
        .field(
            Field::new("cidade")
                .required("A cidade é obrigatória.")
                .min_length(2, "A cidade deve ter pelo menos 2 caracteres."),
        )
        .field(
            Field::new("estado")
                .required("O estado é obrigatório.")
                .exact_length(2, "Use a sigla do estado com 2 letras."),
        )
        .field(
            Field::new("data_inicio")
                .required("A data de início é obrigatória.")
                .date("Data de início inválida."),
        )
        .field(Field::new("data_conclusao").date("Data de conclusão inválida."))
        .field(
            Field::new("contratante_tipo")
                .one_of(CONTRATANTE_TIPOS, "Tipo de contratante inválido."),
        )
        .field(
            Field::new("contratante_documento")
                .min_length(11, "Documento do contratante inválido.")
                .max_length(18, "Documento do contratante inválido."),
        )
        .field(
            Field::new("numero_contrato")
                .max_length(50, "O número do contrato deve ter no máximo 50 caracteres."),
        )
        .field(Field::new("valor_total").min_value(0.0, "O valor total não pode ser negativo."))
}

pub fn empresa_schema() -> Schema {
    Schema::new("empresa")
        .field(
            Field::new("nome")
                .required("O nome da empresa é obrigatório.")
                .min_length(2, "O nome deve ter pelo menos 2 caracteres.")
                .max_length(200, "O nome deve ter no máximo 200 caracteres."),
        )
        .field(Field::new("cnpj").pattern(CNPJ_PATTERN, "CNPJ inválido."))
        .field(Field::new("email").email("E-mail inválido."))
        .field(
            Field::new("telefone")
                .min_length(8, "Telefone inválido.")
                .max_length(20, "Telefone inválido."),
        )
        .field(Field::new("cidade").min_length(2, "A cidade deve ter pelo menos 2 caracteres."))
        .field(Field::new("estado").exact_length(2, "Use a sigla do estado com 2 letras."))
}

pub fn acervo_schema() -> Schema {
    Schema::new("acervo")
        .field(
            Field::new("titulo")
                .required("O título é obrigatório.")
                .min_length(2, "O título deve ter pelo menos 2 caracteres.")
                .max_length(200, "O título deve ter no máximo 200 caracteres."),
        )
        .field(
            Field::new("tipo_documento")
                .required("O tipo de documento é obrigatório.")
                .one_of(TIPOS_DOCUMENTO, "Tipo de documento inválido."),
        )
        .field(Field::new("arquivo_url").url("URL do arquivo inválida."))
}

pub fn sign_in_schema() -> Schema {
    Schema::new("sign_in")
        .field(
            Field::new("email")
                .required("O e-mail é obrigatório.")
                .email("E-mail inválido."),
        )
        .field(Field::new("password").required("A senha é obrigatória."))
}

pub fn sign_up_schema() -> Schema {
    Schema::new("sign_up")
        .field(
            Field::new("nome")
                .required("O nome é obrigatório.")
                .min_length(2, "O nome deve ter pelo menos 2 caracteres."),
        )
        .field(
            Field::new("email")
                .required("O e-mail é obrigatório.")
                .email("E-mail inválido."),
        )
        .field(
            Field::new("password")
                .required("A senha é obrigatória.")
                .min_length(
                    MIN_PASSWORD_LENGTH,
                    "A senha deve ter pelo menos 6 caracteres.",
                ),
        )
        .field(
            Field::new("confirm_password")
                .required("Confirme a senha.")
                .matches("password", "As senhas não coincidem."),
        )
}

pub fn password_reset_schema() -> Schema {
    Schema::new("password_reset").field(
        Field::new("email")
            .required("O e-mail é obrigatório.")
            .email("E-mail inválido."),
    )
}
