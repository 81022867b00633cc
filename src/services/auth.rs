// src/services/auth.rs

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{auth::Principal, rbac::Role},
};

/// O provedor de autenticação, visto pelo núcleo.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_principal(&self) -> Option<Principal>;

    fn is_auth_resolving(&self) -> bool;

    /// Grava o papel ativo no registro do usuário. Disparar e esquecer:
    /// falhas são reportadas, nunca repetidas.
    async fn persist_active_role(&self, principal_id: Uuid, role: Role) -> Result<(), AppError>;
}

// Provedor em memória. Usado pelo binário (sessão vinda da fixture) e pelos testes.
#[derive(Default)]
pub struct StaticAuthProvider {
    principal: RwLock<Option<Principal>>,
    resolving: AtomicBool,
    fail_persist: AtomicBool,
}

impl StaticAuthProvider {
    pub fn new(principal: Option<Principal>) -> Self {
        Self {
            principal: RwLock::new(principal),
            ..Default::default()
        }
    }

    pub async fn sign_in(&self, principal: Principal) {
        *self.principal.write().await = Some(principal);
    }

    pub async fn sign_out(&self) {
        *self.principal.write().await = None;
    }

    pub fn set_resolving(&self, resolving: bool) {
        self.resolving.store(resolving, Ordering::SeqCst);
    }

    /// Faz as próximas sincronizações falharem (simula o backend fora do ar).
    pub fn set_fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_principal(&self) -> Option<Principal> {
        self.principal.read().await.clone()
    }

    fn is_auth_resolving(&self) -> bool {
        self.resolving.load(Ordering::SeqCst)
    }

    async fn persist_active_role(&self, principal_id: Uuid, role: Role) -> Result<(), AppError> {
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(AppError::SyncError("serviço de autenticação indisponível".into()));
        }

        let mut guard = self.principal.write().await;
        match guard.as_mut() {
            Some(principal) if principal.id == principal_id => {
                principal.remembered_role = Some(role.as_str().to_string());
                Ok(())
            }
            _ => Err(AppError::SyncError(format!("usuário {} não está autenticado", principal_id))),
        }
    }
}
