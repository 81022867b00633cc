// src/services/calendar_service.rs

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        notify::{Notifier, Severity},
    },
    db::{
        data_source::SchoolDataSource,
        local_cache::{academic_year_key, LocalCache},
    },
    models::school::{AcademicYear, Term},
};

/// Ano padrão: o lembrado no cache (se ainda existe), senão o marcado como
/// atual, senão o de maior rótulo.
pub fn pick_year(years: &[AcademicYear], cached: Option<&str>) -> Option<String> {
    cached
        .filter(|c| years.iter().any(|y| y.label == *c))
        .map(str::to_string)
        .or_else(|| years.iter().find(|y| y.is_current).map(|y| y.label.clone()))
        .or_else(|| years.iter().map(|y| y.label.clone()).max())
}

/// Período padrão: o atual, senão o primeiro.
pub fn pick_term(terms: &[Term]) -> Option<String> {
    terms
        .iter()
        .find(|t| t.is_current)
        .or_else(|| terms.first())
        .map(|t| t.label.clone())
}

#[derive(Debug, Clone, Default)]
pub struct CalendarState {
    pub years: Vec<AcademicYear>,
    pub selected_year: Option<String>,
    pub terms: Vec<Term>,
    pub selected_term: Option<String>,
    // Contadores: buscas sobrepostas não derrubam a flag umas das outras
    pub years_in_flight: usize,
    pub terms_in_flight: usize,
}

// Seletores de ano letivo e período: os sinais de carregamento "de cima"
// que entram no isLoading combinado.
pub struct CalendarService {
    source: Arc<dyn SchoolDataSource>,
    cache: Arc<dyn LocalCache>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<CalendarState>,
}

impl CalendarService {
    pub fn new(
        source: Arc<dyn SchoolDataSource>,
        cache: Arc<dyn LocalCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            cache,
            notifier,
            state: RwLock::new(CalendarState::default()),
        }
    }

    /// Busca os anos letivos da escola e escolhe o ano selecionado.
    pub async fn load_years(&self, tenant_id: Option<Uuid>) -> Option<String> {
        let Some(tenant_id) = tenant_id else {
            self.reset().await;
            return None;
        };

        self.state.write().await.years_in_flight += 1;
        let result = self.source.fetch_academic_years(tenant_id).await;

        let mut state = self.state.write().await;
        state.years_in_flight = state.years_in_flight.saturating_sub(1);
        match result {
            Ok(years) => {
                let cached = self.cache.get(&academic_year_key(tenant_id));
                state.selected_year = pick_year(&years, cached.as_deref());
                state.years = years;
            }
            Err(err) => {
                drop(state);
                self.notifier
                    .report(Severity::Error, "Falha ao carregar os anos letivos", &err.detail());
                return self.selected_year().await;
            }
        }
        state.selected_year.clone()
    }

    /// Seleção explícita do usuário; fica lembrada no cache local.
    pub async fn select_year(&self, tenant_id: Uuid, year: &str) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if !state.years.iter().any(|y| y.label == year) {
            return Err(AppError::YearNotFound(year.to_string()));
        }
        if state.selected_year.as_deref() != Some(year) {
            state.selected_year = Some(year.to_string());
            // Períodos do ano anterior não servem mais
            state.terms.clear();
            state.selected_term = None;
        }
        drop(state);

        if let Err(err) = self.cache.set(&academic_year_key(tenant_id), year) {
            tracing::warn!("Não foi possível lembrar o ano letivo: {}", err);
        }
        Ok(())
    }

    /// Busca os períodos do ano selecionado e escolhe o período padrão.
    pub async fn load_terms(&self, tenant_id: Option<Uuid>, year: Option<&str>) -> Option<String> {
        let (Some(tenant_id), Some(year)) = (tenant_id, year) else {
            let mut state = self.state.write().await;
            state.terms.clear();
            state.selected_term = None;
            return None;
        };

        self.state.write().await.terms_in_flight += 1;
        let result = self.source.fetch_terms(tenant_id, year).await;

        let mut state = self.state.write().await;
        state.terms_in_flight = state.terms_in_flight.saturating_sub(1);

        // O ano mudou enquanto buscávamos: resposta velha
        if state.selected_year.as_deref() != Some(year) {
            tracing::debug!("Períodos do ano {} descartados", year);
            return state.selected_term.clone();
        }

        match result {
            Ok(terms) => {
                let keep = state
                    .selected_term
                    .as_deref()
                    .is_some_and(|current| terms.iter().any(|t| t.label == current));
                if !keep {
                    state.selected_term = pick_term(&terms);
                }
                state.terms = terms;
                state.selected_term.clone()
            }
            Err(err) => {
                let selected = state.selected_term.clone();
                drop(state);
                self.notifier
                    .report(Severity::Error, "Falha ao carregar os períodos", &err.detail());
                selected
            }
        }
    }

    pub async fn select_term(&self, term: &str) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if !state.terms.iter().any(|t| t.label == term) {
            return Err(AppError::TermNotFound(term.to_string()));
        }
        state.selected_term = Some(term.to_string());
        Ok(())
    }

    pub async fn reset(&self) {
        *self.state.write().await = CalendarState::default();
    }

    pub async fn is_loading(&self) -> bool {
        let state = self.state.read().await;
        state.years_in_flight > 0 || state.terms_in_flight > 0
    }

    pub async fn selected_year(&self) -> Option<String> {
        self.state.read().await.selected_year.clone()
    }

    pub async fn selected_term(&self) -> Option<String> {
        self.state.read().await.selected_term.clone()
    }

    pub async fn snapshot(&self) -> CalendarState {
        self.state.read().await.clone()
    }
}
