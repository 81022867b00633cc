// src/common/error.rs

use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Nenhum erro atravessa a fronteira dos componentes: o loader converte tudo
// em `TierOutcome` e o resolvedor de papéis em `SyncOutcome`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Papel desconhecido: '{0}'")]
    UnknownRole(String),

    #[error("Escola não encontrada: {0}")]
    TenantNotFound(uuid::Uuid),

    #[error("Ano letivo não encontrado: {0}")]
    YearNotFound(String),

    #[error("Período não encontrado: {0}")]
    TermNotFound(String),

    // Falha do serviço remoto de dados (tabelas, RPCs)
    #[error("Falha na consulta remota: {0}")]
    DataSourceError(String),

    // Falha ao sincronizar o papel ativo com o registro do usuário
    #[error("Falha ao sincronizar o papel ativo: {0}")]
    SyncError(String),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Mensagem curta para o colaborador de notificação (sem stack trace).
    pub fn detail(&self) -> String {
        match self {
            AppError::DataSourceError(msg) | AppError::SyncError(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_strips_the_variant_prefix_for_remote_failures() {
        let err = AppError::DataSourceError("timeout".into());
        assert_eq!(err.detail(), "timeout");
        assert_eq!(err.to_string(), "Falha na consulta remota: timeout");
    }

    #[test]
    fn detail_keeps_full_message_for_other_variants() {
        let err = AppError::UnknownRole("janitor".into());
        assert_eq!(err.detail(), "Papel desconhecido: 'janitor'");
    }
}
