// src/common/notify.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// O colaborador de notificação (toasts na interface).
/// O núcleo só o chama em caminhos de falha.
pub trait Notifier: Send + Sync {
    fn report(&self, severity: Severity, title: &str, detail: &str);
}

// Uma notificação já registrada (útil para testes e para o snapshot do binário)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
    pub reported_at: DateTime<Utc>,
}

/// Implementação padrão: escreve via `tracing` e guarda o histórico.
#[derive(Default)]
pub struct TracingNotifier {
    history: std::sync::Mutex<Vec<Notification>>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Notification> {
        match self.history.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for TracingNotifier {
    fn report(&self, severity: Severity, title: &str, detail: &str) {
        match severity {
            Severity::Info => tracing::info!("🔔 {}: {}", title, detail),
            Severity::Warning => tracing::warn!("⚠️ {}: {}", title, detail),
            Severity::Error => tracing::error!("🔥 {}: {}", title, detail),
        }

        let entry = Notification {
            severity,
            title: title.to_string(),
            detail: detail.to_string(),
            reported_at: Utc::now(),
        };
        match self.history.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_reports_in_order() {
        let notifier = TracingNotifier::new();
        notifier.report(Severity::Error, "Falha A", "boom");
        notifier.report(Severity::Warning, "Falha B", "meh");

        let history = notifier.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].title, "Falha A");
        assert_eq!(history[1].severity, Severity::Warning);
    }
}
