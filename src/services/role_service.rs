// src/services/role_service.rs

use std::{collections::BTreeSet, sync::Arc};

use tokio::{sync::RwLock, task::JoinHandle};
use uuid::Uuid;

use crate::{
    common::notify::{Notifier, Severity},
    db::local_cache::{active_role_key, LocalCache},
    models::{
        auth::{Principal, StaffProfile},
        rbac::{Role, RoleSet},
    },
    services::auth::AuthProvider,
};

/// Monta o conjunto de papéis do usuário: o papel declarado mais os papéis
/// suplementares do perfil que tenham escopo atribuído.
pub fn resolve_roles(principal: &Principal, profile: Option<&StaffProfile>) -> RoleSet {
    let mut roles = Vec::new();

    let declared = match principal.declared_role.parse::<Role>() {
        Ok(role) => {
            roles.push(role);
            Some(role)
        }
        Err(err) => {
            tracing::warn!("Papel declarado ignorado para {}: {}", principal.id, err);
            None
        }
    };

    // Super-admin e papéis de consumidor (aluno, responsável) não acumulam
    if declared.is_some_and(|role| role.is_terminal()) {
        return roles.into_iter().collect();
    }

    if let Some(profile) = profile {
        // Tags podem aparecer só na lista, só no mapa, ou nos dois
        let tags: BTreeSet<&str> = profile
            .roles
            .iter()
            .map(String::as_str)
            .chain(profile.assignments.keys().map(String::as_str))
            .collect();

        for tag in tags {
            let has_scope = profile
                .assignment_for(tag)
                .is_some_and(|assignment| !assignment.is_empty());
            if !has_scope {
                continue;
            }

            match tag.parse::<Role>() {
                Ok(role) => roles.push(role),
                Err(err) => tracing::warn!("Papel suplementar ignorado: {}", err),
            }
        }
    }

    roles.into_iter().collect()
}

/// Escolhe o papel ativo: o lembrado no registro do usuário, senão o do cache
/// local, senão o de maior prioridade. Nunca devolve algo fora do conjunto.
pub fn select_active_role(
    role_set: &RoleSet,
    remembered: Option<Role>,
    cached: Option<Role>,
) -> Option<Role> {
    remembered
        .filter(|role| role_set.contains(*role))
        .or_else(|| cached.filter(|role| role_set.contains(*role)))
        .or_else(|| role_set.head())
}

fn parse_optional(raw: Option<&str>) -> Option<Role> {
    let raw = raw?;
    match raw.parse::<Role>() {
        Ok(role) => Some(role),
        Err(err) => {
            tracing::debug!("Papel lembrado descartado: {}", err);
            None
        }
    }
}

// Resultado nomeado da sincronização em segundo plano
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    Failed(String),
}

/// Handle da sincronização disparada por uma troca de papel.
/// Quem não se importa pode simplesmente descartá-lo.
pub struct PendingSync(JoinHandle<SyncOutcome>);

impl PendingSync {
    pub async fn outcome(self) -> SyncOutcome {
        match self.0.await {
            Ok(outcome) => outcome,
            Err(err) => SyncOutcome::Failed(err.to_string()),
        }
    }
}

pub enum RoleSwitch {
    // Papel fora do conjunto: erro de quem chamou, nada muda
    Rejected,
    Unchanged,
    Switched { sync: PendingSync },
}

impl RoleSwitch {
    pub fn is_switched(&self) -> bool {
        matches!(self, RoleSwitch::Switched { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoleState {
    pub principal: Option<Principal>,
    pub profile: Option<Arc<StaffProfile>>,
    pub role_set: RoleSet,
    pub active: Option<Role>,
}

pub struct RoleService {
    auth: Arc<dyn AuthProvider>,
    cache: Arc<dyn LocalCache>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<RoleState>,
}

impl RoleService {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        cache: Arc<dyn LocalCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            auth,
            cache,
            notifier,
            state: RwLock::new(RoleState::default()),
        }
    }

    /// Recalcula papéis e papel ativo para o usuário atual.
    /// Devolve `true` quando o papel ativo mudou.
    pub async fn apply_principal(
        &self,
        principal: Option<Principal>,
        profile: Option<StaffProfile>,
    ) -> bool {
        let mut state = self.state.write().await;
        let previous = state.active;

        let Some(principal) = principal else {
            *state = RoleState::default();
            return previous.is_some();
        };

        let role_set = resolve_roles(&principal, profile.as_ref());
        let remembered = parse_optional(principal.remembered_role.as_deref());
        let cached = parse_optional(self.cache.get(&active_role_key(principal.id)).as_deref());
        let active = select_active_role(&role_set, remembered, cached);

        if active.is_none() {
            tracing::warn!("Usuário {} não tem nenhum papel utilizável", principal.id);
        } else {
            tracing::info!("👤 Papéis de {}: {:?}, ativo: {:?}", principal.id, role_set, active);
        }

        *state = RoleState {
            principal: Some(principal),
            profile: profile.map(Arc::new),
            role_set,
            active,
        };

        previous != active
    }

    /// Troca o papel ativo. Grava no cache local e sincroniza com o registro
    /// do usuário em segundo plano; a falha da sincronização não desfaz a troca.
    pub async fn switch_active_role(&self, role: Role) -> RoleSwitch {
        let principal_id: Uuid = {
            let mut state = self.state.write().await;

            if !state.role_set.contains(role) {
                tracing::debug!("Troca para papel fora do conjunto ignorada: {}", role);
                return RoleSwitch::Rejected;
            }
            if state.active == Some(role) {
                return RoleSwitch::Unchanged;
            }
            let Some(principal_id) = state.principal.as_ref().map(|p| p.id) else {
                return RoleSwitch::Rejected;
            };

            state.active = Some(role);
            principal_id
        };

        if let Err(err) = self.cache.set(&active_role_key(principal_id), role.as_str()) {
            tracing::warn!("Não foi possível gravar o papel no cache local: {}", err);
        }

        let auth = Arc::clone(&self.auth);
        let notifier = Arc::clone(&self.notifier);
        let handle = tokio::spawn(async move {
            match auth.persist_active_role(principal_id, role).await {
                Ok(()) => {
                    tracing::debug!("Papel ativo {} sincronizado para {}", role, principal_id);
                    SyncOutcome::Synced
                }
                Err(err) => {
                    let detail = err.detail();
                    notifier.report(Severity::Error, "Falha ao salvar o papel ativo", &detail);
                    SyncOutcome::Failed(detail)
                }
            }
        });

        tracing::info!("🔀 Papel ativo trocado para {}", role);
        RoleSwitch::Switched { sync: PendingSync(handle) }
    }

    pub async fn active_role(&self) -> Option<Role> {
        self.state.read().await.active
    }

    pub async fn role_set(&self) -> RoleSet {
        self.state.read().await.role_set.clone()
    }

    pub async fn profile(&self) -> Option<Arc<StaffProfile>> {
        self.state.read().await.profile.clone()
    }

    pub async fn snapshot(&self) -> RoleState {
        self.state.read().await.clone()
    }
}
