// src/services/dashboard_service.rs

use std::sync::Arc;

use serde::Serialize;

use crate::{
    common::{
        error::AppError,
        notify::{Notifier, Severity},
    },
    db::{
        data_source::{SchoolDataSource, StaffProfileSource},
        local_cache::LocalCache,
    },
    models::{
        dashboard::DashboardCounters,
        rbac::{Role, RoleSet},
        scope::Scope,
    },
    services::{
        auth::AuthProvider,
        calendar_service::CalendarService,
        hierarchy_service::{ClassStructure, HierarchyCache},
        loader_service::{CascadeReport, CascadingLoader, ScopedDataSet, Selection, TierOutcome, TierStatuses},
        role_service::{RoleService, RoleSwitch},
        scope_service::ScopeStore,
    },
};

// O que o binário imprime (e o que uma tela do dashboard consumiria)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub principal: Option<String>,
    pub active_role: Option<Role>,
    pub roles: RoleSet,
    pub scope: Scope,
    pub year: Option<String>,
    pub term: Option<String>,
    pub is_loading: bool,
    pub statuses: TierStatuses,
    pub counters: Option<DashboardCounters>,
    pub teaching_assignments: usize,
    pub structure: ClassStructure,
}

/// A "store" explícita do dashboard: pontos de mutação nomeados e seletores
/// somente leitura. Substitui o contexto global da interface.
pub struct DashboardStore {
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn StaffProfileSource>,
    notifier: Arc<dyn Notifier>,
    roles: RoleService,
    scopes: ScopeStore,
    calendar: CalendarService,
    loader: CascadingLoader,
    hierarchy: HierarchyCache,
}

impl DashboardStore {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn StaffProfileSource>,
        source: Arc<dyn SchoolDataSource>,
        cache: Arc<dyn LocalCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            roles: RoleService::new(auth.clone(), cache.clone(), notifier.clone()),
            scopes: ScopeStore::new(),
            calendar: CalendarService::new(source.clone(), cache, notifier.clone()),
            loader: CascadingLoader::new(source, notifier.clone()),
            hierarchy: HierarchyCache::new(),
            auth,
            profiles,
            notifier,
        }
    }

    // =========================================================================
    //  1. PONTOS DE MUTAÇÃO
    // =========================================================================

    /// Relê o usuário e o perfil, resolve papéis e roda a cascata inteira.
    pub async fn refresh_principal(&self) -> CascadeReport {
        let principal = self.auth.current_principal().await;

        let profile = match &principal {
            Some(p) => match self.profiles.get_profile(p.id).await {
                Ok(profile) => profile,
                Err(err) => {
                    self.notifier.report(
                        Severity::Warning,
                        "Falha ao carregar o perfil do funcionário",
                        &err.detail(),
                    );
                    None
                }
            },
            None => None,
        };

        self.roles.apply_principal(principal, profile).await;

        // Sem papel utilizável nada sai de idle
        if self.roles.active_role().await.is_none() {
            self.calendar.reset().await;
            self.loader.reset().await;
            return CascadeReport {
                tenant: TierOutcome::Idle,
                year: TierOutcome::Idle,
                term: TierOutcome::Idle,
            };
        }

        let tenant_id = self.tenant_id().await;
        let year = self.calendar.load_years(tenant_id).await;
        self.calendar.load_terms(tenant_id, year.as_deref()).await;

        self.loader.sync(&self.selection().await).await
    }

    /// Troca o papel ativo e recarrega as camadas que dependem dele.
    pub async fn switch_role(&self, role: Role) -> RoleSwitch {
        let outcome = self.roles.switch_active_role(role).await;
        if outcome.is_switched() {
            self.loader.sync(&self.selection().await).await;
        }
        outcome
    }

    pub async fn select_year(&self, year: &str) -> Result<CascadeReport, AppError> {
        let tenant_id = self
            .tenant_id()
            .await
            .ok_or_else(|| AppError::YearNotFound(year.to_string()))?;

        self.calendar.select_year(tenant_id, year).await?;
        self.calendar.load_terms(Some(tenant_id), Some(year)).await;

        Ok(self.loader.sync(&self.selection().await).await)
    }

    pub async fn select_term(&self, term: &str) -> Result<CascadeReport, AppError> {
        self.calendar.select_term(term).await?;
        Ok(self.loader.sync(&self.selection().await).await)
    }

    /// Recarrega todas as camadas aplicáveis com os seletores atuais.
    pub async fn refetch(&self) -> CascadeReport {
        self.loader.refetch(&self.selection().await).await
    }

    // =========================================================================
    //  2. SELETORES (SOMENTE LEITURA)
    // =========================================================================

    pub async fn selection(&self) -> Selection {
        let roles = self.roles.snapshot().await;
        Selection {
            tenant_id: roles.principal.as_ref().and_then(|p| p.tenant_id),
            role: roles.active,
            year: self.calendar.selected_year().await,
            term: self.calendar.selected_term().await,
        }
    }

    async fn tenant_id(&self) -> Option<uuid::Uuid> {
        self.roles
            .snapshot()
            .await
            .principal
            .and_then(|p| p.tenant_id)
    }

    pub async fn active_role(&self) -> Option<Role> {
        self.roles.active_role().await
    }

    pub async fn role_set(&self) -> RoleSet {
        self.roles.role_set().await
    }

    pub async fn scope(&self) -> Arc<Scope> {
        let roles = self.roles.snapshot().await;
        self.scopes.get_scope(roles.active, roles.profile.as_ref())
    }

    /// OU de todas as camadas mais os sinais de cima (auth, ano, período).
    pub async fn is_loading(&self) -> bool {
        self.auth.is_auth_resolving()
            || self.calendar.is_loading().await
            || self.loader.is_loading().await
    }

    pub async fn snapshot(&self) -> ScopedDataSet {
        self.loader.snapshot().await
    }

    pub async fn structure(&self) -> Arc<ClassStructure> {
        let data = self.loader.snapshot().await;
        let scope = self.scope().await;
        self.hierarchy.get(data.students(), &scope)
    }

    pub async fn view(&self) -> DashboardView {
        let roles = self.roles.snapshot().await;
        let data = self.loader.snapshot().await;
        let scope = self.scope().await;
        let structure = self.hierarchy.get(data.students(), &scope);

        DashboardView {
            principal: roles.principal.map(|p| p.display_name),
            active_role: roles.active,
            roles: roles.role_set,
            scope: (*scope).clone(),
            year: self.calendar.selected_year().await,
            term: self.calendar.selected_term().await,
            is_loading: self.is_loading().await,
            statuses: data.statuses,
            counters: data.counters().cloned(),
            teaching_assignments: data.assignments().len(),
            structure: (*structure).clone(),
        }
    }
}
