// src/services/loader_service.rs

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        notify::{Notifier, Severity},
    },
    db::data_source::SchoolDataSource,
    models::{
        dashboard::DashboardCounters,
        rbac::Role,
        school::{StaffMember, Student, Subject, TeachingAssignment},
        tenancy::{Subscription, Tenant},
    },
    services::tier_state::{TierState, TierStatus},
};

// Chaves de dependência de cada camada
pub type TenantKey = (Option<Uuid>, Role);
pub type YearKey = (Uuid, String);
pub type TermKey = (Uuid, String, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Tenant,
    Year,
    Term,
}

impl Tier {
    fn failure_title(&self) -> &'static str {
        match self {
            Tier::Tenant => "Falha ao carregar os dados da escola",
            Tier::Year => "Falha ao carregar os dados do ano letivo",
            Tier::Term => "Falha ao carregar as atribuições do período",
        }
    }
}

// ---
// Payloads das camadas
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TenantTierData {
    // Visão da plataforma (super-admin)
    Platform {
        tenants: Vec<Tenant>,
        subscriptions: Vec<Subscription>,
    },
    // Visão de uma escola
    School {
        tenant: Tenant,
        staff: Vec<StaffMember>,
        subjects: Vec<Subject>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearTierData {
    pub students: Arc<Vec<Student>>,
    pub counters: DashboardCounters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermTierData {
    pub assignments: Vec<TeachingAssignment>,
}

/// O que aconteceu com um disparo de camada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    Loaded,
    // Chave já carregada (ou carregando): nada a fazer
    Current,
    // Dependência de cima indisponível
    Idle,
    // Camada de cima ainda carregando para a mesma chave
    Blocked,
    // Resultado chegou com chave obsoleta e foi jogado fora
    Discarded,
    Failed(String),
}

/// Os seletores atuais que alimentam as chaves das camadas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub tenant_id: Option<Uuid>,
    pub role: Option<Role>,
    pub year: Option<String>,
    pub term: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub tenant: TierOutcome,
    pub year: TierOutcome,
    pub term: TierOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStatuses {
    pub tenant: TierStatus,
    pub year: TierStatus,
    pub term: TierStatus,
}

impl TierStatuses {
    pub fn any_loading(&self) -> bool {
        [self.tenant, self.year, self.term].contains(&TierStatus::Loading)
    }
}

/// Visão somente leitura das coleções publicadas.
#[derive(Debug, Clone)]
pub struct ScopedDataSet {
    pub tenant: Option<Arc<TenantTierData>>,
    pub year: Option<Arc<YearTierData>>,
    pub term: Option<Arc<TermTierData>>,
    pub statuses: TierStatuses,
}

impl ScopedDataSet {
    pub fn students(&self) -> Option<&Arc<Vec<Student>>> {
        self.year.as_ref().map(|y| &y.students)
    }

    pub fn counters(&self) -> Option<&DashboardCounters> {
        self.year.as_ref().map(|y| &y.counters)
    }

    pub fn assignments(&self) -> &[TeachingAssignment] {
        self.term.as_ref().map(|t| t.assignments.as_slice()).unwrap_or_default()
    }
}

#[derive(Default)]
struct LoaderState {
    tenant: TierState<TenantKey, Arc<TenantTierData>>,
    year: TierState<YearKey, Arc<YearTierData>>,
    term: TierState<TermKey, Arc<TermTierData>>,
    // Última seleção pedida; cascatas em andamento a relêem entre camadas
    wanted: Selection,
    // Chaves barradas enquanto a camada de cima carregava
    pending_year: Option<YearKey>,
    pending_term: Option<TermKey>,
}

/// Orquestra as três camadas de dados (escola -> ano -> período).
/// É o único dono das coleções; os demais só leem `snapshot()`.
pub struct CascadingLoader {
    source: Arc<dyn SchoolDataSource>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<LoaderState>,
}

impl CascadingLoader {
    pub fn new(source: Arc<dyn SchoolDataSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            notifier,
            state: RwLock::new(LoaderState::default()),
        }
    }

    // =========================================================================
    //  1. CAMADA DE ESCOLA
    // =========================================================================

    pub async fn load_tenant_tier(&self, tenant_id: Option<Uuid>, role: Option<Role>) -> TierOutcome {
        let Some(role) = role else {
            self.idle_from(Tier::Tenant).await;
            return TierOutcome::Idle;
        };
        // Só o super-admin trabalha sem escola
        if tenant_id.is_none() && !role.is_tenant_wide() {
            self.idle_from(Tier::Tenant).await;
            return TierOutcome::Idle;
        }

        let key: TenantKey = (tenant_id, role);
        {
            let mut state = self.state.write().await;
            // Outra escola: nada do que estava publicado vale mais, nem como dado
            // velho. A carga nova conta como primeira carga.
            let tenant_changed = state.tenant.desired().is_some_and(|(t, _)| *t != tenant_id)
                || state.tenant.data_key().is_some_and(|(t, _)| *t != tenant_id);
            if tenant_changed {
                state.tenant.reset();
                state.year.reset();
                state.term.reset();
                state.pending_year = None;
                state.pending_term = None;
            }
            state.tenant.begin(key.clone());
        }
        tracing::debug!("Camada de escola: carregando {:?}", key);

        let result = self.fetch_tenant_tier(tenant_id, role).await;
        let outcome = self.settle(Tier::Tenant, key, result, |s| &mut s.tenant).await;

        if let Some((tenant_id, year)) = self.take_pending_year().await {
            tracing::debug!("Disparando ano pendente {} após a escola", year);
            self.load_year_tier(Some(tenant_id), Some(&year)).await;
        }
        outcome
    }

    async fn fetch_tenant_tier(&self, tenant_id: Option<Uuid>, role: Role) -> Result<TenantTierData, AppError> {
        match tenant_id {
            Some(tenant_id) if !role.is_tenant_wide() => {
                let (tenant, staff, subjects) = tokio::try_join!(
                    self.source.fetch_tenant(tenant_id),
                    self.source.fetch_staff(tenant_id),
                    self.source.fetch_subjects(tenant_id),
                )?;
                Ok(TenantTierData::School { tenant, staff, subjects })
            }
            _ => {
                let (tenants, subscriptions) = tokio::try_join!(
                    self.source.fetch_tenants(),
                    self.source.fetch_subscriptions(),
                )?;
                Ok(TenantTierData::Platform { tenants, subscriptions })
            }
        }
    }

    // =========================================================================
    //  2. CAMADA DO ANO LETIVO
    // =========================================================================

    pub async fn load_year_tier(&self, tenant_id: Option<Uuid>, year: Option<&str>) -> TierOutcome {
        let (Some(tenant_id), Some(year)) = (tenant_id, year) else {
            self.idle_from(Tier::Year).await;
            return TierOutcome::Idle;
        };

        let key: YearKey = (tenant_id, year.to_string());
        {
            let mut state = self.state.write().await;
            // Guarda: a camada de escola precisa ter concluído para esta escola
            let tenant_ready = state
                .tenant
                .data_key()
                .is_some_and(|(t, _)| *t == Some(tenant_id));
            if !tenant_ready {
                // Escola ainda carregando: a chave fica guardada até ela ficar pronta
                let tenant_loading = state.tenant.is_loading()
                    && state.tenant.desired().is_some_and(|(t, _)| *t == Some(tenant_id));
                if tenant_loading {
                    state.pending_year = Some(key);
                    return TierOutcome::Blocked;
                }
                state.year.reset();
                state.term.reset();
                return TierOutcome::Idle;
            }
            state.pending_year = None;

            // Período do ano antigo deixa de ser válido
            let term_matches = state
                .term
                .desired()
                .is_some_and(|(t, y, _)| *t == tenant_id && y == year);
            if !term_matches {
                state.term.reset();
            }
            if state
                .pending_term
                .as_ref()
                .is_some_and(|(t, y, _)| *t != tenant_id || y != year)
            {
                state.pending_term = None;
            }
            state.year.begin(key.clone());
        }
        tracing::debug!("Camada do ano: carregando {:?}", key);

        let result = tokio::try_join!(
            self.source.fetch_students(tenant_id, year),
            self.source.fetch_dashboard_counters(tenant_id, year),
        )
        .map(|(students, counters)| YearTierData {
            students: Arc::new(students),
            counters,
        });
        let outcome = self.settle(Tier::Year, key, result, |s| &mut s.year).await;

        if let Some((tenant_id, year, term)) = self.take_pending_term().await {
            tracing::debug!("Disparando período pendente {}/{} após o ano", year, term);
            self.load_term_tier(Some(tenant_id), Some(&year), Some(&term)).await;
        }
        outcome
    }

    // =========================================================================
    //  3. CAMADA DO PERÍODO
    // =========================================================================

    pub async fn load_term_tier(
        &self,
        tenant_id: Option<Uuid>,
        year: Option<&str>,
        term: Option<&str>,
    ) -> TierOutcome {
        let (Some(tenant_id), Some(year), Some(term)) = (tenant_id, year, term) else {
            self.idle_from(Tier::Term).await;
            return TierOutcome::Idle;
        };

        let year_key: YearKey = (tenant_id, year.to_string());
        let key: TermKey = (tenant_id, year.to_string(), term.to_string());
        {
            let mut state = self.state.write().await;
            // Nunca dispara enquanto o ano (mesma chave) ainda está carregando
            // ou esperando a escola; a chave fica pendente
            let year_loading = state.year.is_loading() && state.year.is_current(&year_key);
            let year_waiting = state.pending_year.as_ref() == Some(&year_key);
            if year_loading || year_waiting {
                state.pending_term = Some(key);
                return TierOutcome::Blocked;
            }
            if !state.year.is_ready_for(&year_key) {
                state.term.reset();
                state.pending_term = None;
                return TierOutcome::Idle;
            }
            state.pending_term = None;
            state.term.begin(key.clone());
        }
        tracing::debug!("Camada do período: carregando {:?}", key);

        let result = self
            .source
            .fetch_teaching_assignments(tenant_id, year, term)
            .await
            .map(|assignments| TermTierData { assignments });
        self.settle(Tier::Term, key, result, |s| &mut s.term).await
    }

    // =========================================================================
    //  4. CASCATA, REFETCH E LEITURA
    // =========================================================================

    /// Roda as três camadas em ordem, disparando só as que têm chave nova
    /// (ou estão ociosas). A seleção passa a ser a desejada para qualquer
    /// cascata ainda em andamento.
    pub async fn sync(&self, selection: &Selection) -> CascadeReport {
        self.want(selection).await;
        self.cascade(false).await
    }

    /// Recarrega todas as camadas aplicáveis, mesmo com chave inalterada.
    pub async fn refetch(&self, selection: &Selection) -> CascadeReport {
        self.want(selection).await;
        self.cascade(true).await
    }

    async fn want(&self, selection: &Selection) {
        self.state.write().await.wanted = selection.clone();
    }

    /// A seleção mais recente pedida por `sync`/`refetch`.
    pub async fn wanted(&self) -> Selection {
        self.state.read().await.wanted.clone()
    }

    // Cada camada relê a seleção desejada antes de disparar: o último pedido vence
    async fn cascade(&self, force: bool) -> CascadeReport {
        let selection = self.wanted().await;
        let tenant_current = match selection.role {
            Some(role) => !force && !self.tenant_needs_load(selection.tenant_id, role).await,
            None => false,
        };
        let tenant = if tenant_current {
            TierOutcome::Current
        } else {
            self.load_tenant_tier(selection.tenant_id, selection.role).await
        };

        let selection = self.wanted().await;
        let year = selection.year.as_deref();
        let year_current = match (selection.tenant_id, year) {
            (Some(t), Some(y)) => !force && !self.year_needs_load(t, y).await,
            _ => false,
        };
        let year_outcome = if year_current {
            TierOutcome::Current
        } else {
            self.load_year_tier(selection.tenant_id, year).await
        };

        let selection = self.wanted().await;
        let year = selection.year.as_deref();
        let term = selection.term.as_deref();
        let term_current = match (selection.tenant_id, year, term) {
            (Some(t), Some(y), Some(p)) => !force && !self.term_needs_load(t, y, p).await,
            _ => false,
        };
        let term_outcome = if term_current {
            TierOutcome::Current
        } else {
            self.load_term_tier(selection.tenant_id, year, term).await
        };

        CascadeReport {
            tenant,
            year: year_outcome,
            term: term_outcome,
        }
    }

    async fn tenant_needs_load(&self, tenant_id: Option<Uuid>, role: Role) -> bool {
        self.state.read().await.tenant.needs_load(&(tenant_id, role))
    }

    async fn year_needs_load(&self, tenant_id: Uuid, year: &str) -> bool {
        let state = self.state.read().await;
        // Escola recarregada por troca de papel não invalida o ano
        !state.tenant.data_key().is_some_and(|(t, _)| *t == Some(tenant_id))
            || state.year.needs_load(&(tenant_id, year.to_string()))
    }

    async fn term_needs_load(&self, tenant_id: Uuid, year: &str, term: &str) -> bool {
        let state = self.state.read().await;
        !state.year.is_ready_for(&(tenant_id, year.to_string()))
            || state
                .term
                .needs_load(&(tenant_id, year.to_string(), term.to_string()))
    }

    /// Todas as camadas voltam para idle (usuário saiu, nenhum papel).
    pub async fn reset(&self) {
        self.idle_from(Tier::Tenant).await;
        self.state.write().await.wanted = Selection::default();
    }

    async fn idle_from(&self, tier: Tier) {
        let mut state = self.state.write().await;
        if tier == Tier::Tenant {
            state.tenant.reset();
        }
        if tier != Tier::Term {
            state.year.reset();
            state.pending_year = None;
        }
        state.term.reset();
        state.pending_term = None;
    }

    // Ano barrado pela escola: sai da fila quando a escola dele ficou pronta
    async fn take_pending_year(&self) -> Option<YearKey> {
        let mut state = self.state.write().await;
        let ready = state.pending_year.as_ref().is_some_and(|(t, _)| {
            !state.tenant.is_loading() && state.tenant.data_key().is_some_and(|(dt, _)| *dt == Some(*t))
        });
        if ready { state.pending_year.take() } else { None }
    }

    // Período barrado pelo ano: sai da fila quando o ano dele ficou pronto
    async fn take_pending_term(&self) -> Option<TermKey> {
        let mut state = self.state.write().await;
        let ready = state.pending_term.as_ref().is_some_and(|(t, y, _)| {
            !state.year.is_loading() && state.year.is_ready_for(&(*t, y.clone()))
        });
        if ready { state.pending_term.take() } else { None }
    }

    pub async fn statuses(&self) -> TierStatuses {
        let state = self.state.read().await;
        TierStatuses {
            tenant: state.tenant.status(),
            year: state.year.status(),
            term: state.term.status(),
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.statuses().await.any_loading()
    }

    pub async fn last_error(&self, tier: Tier) -> Option<String> {
        let state = self.state.read().await;
        let err = match tier {
            Tier::Tenant => state.tenant.last_error(),
            Tier::Year => state.year.last_error(),
            Tier::Term => state.term.last_error(),
        };
        err.map(str::to_string)
    }

    pub async fn snapshot(&self) -> ScopedDataSet {
        let state = self.state.read().await;
        ScopedDataSet {
            tenant: state.tenant.data().cloned(),
            year: state.year.data().cloned(),
            term: state.term.data().cloned(),
            statuses: TierStatuses {
                tenant: state.tenant.status(),
                year: state.year.status(),
                term: state.term.status(),
            },
        }
    }

    // Aplica o resultado de uma busca na camada, respeitando a chave capturada.
    // Erros viram notificação; resultados obsoletos somem em silêncio.
    async fn settle<K, T, F>(
        &self,
        tier: Tier,
        key: K,
        result: Result<T, AppError>,
        select: F,
    ) -> TierOutcome
    where
        K: Clone + PartialEq + std::fmt::Debug,
        F: FnOnce(&mut LoaderState) -> &mut TierState<K, Arc<T>>,
    {
        let mut state = self.state.write().await;
        let slot = select(&mut *state);

        match result {
            Ok(data) => {
                if slot.settle_ok(key.clone(), Arc::new(data)) {
                    tracing::debug!("Camada {:?} pronta para {:?}", tier, key);
                    TierOutcome::Loaded
                } else {
                    tracing::debug!("Resultado obsoleto descartado ({:?}, {:?})", tier, key);
                    TierOutcome::Discarded
                }
            }
            Err(err) => {
                let detail = err.detail();
                if !slot.settle_err(&key, detail.clone()) {
                    tracing::debug!("Erro obsoleto descartado ({:?}, {:?}): {}", tier, key, detail);
                    return TierOutcome::Discarded;
                }
                drop(state);
                self.notifier.report(Severity::Error, tier.failure_title(), &detail);
                TierOutcome::Failed(detail)
            }
        }
    }
}
