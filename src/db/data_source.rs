// src/db/data_source.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::StaffProfile,
        dashboard::DashboardCounters,
        school::{AcademicYear, StaffMember, Student, Subject, TeachingAssignment, Term},
        tenancy::{Subscription, Tenant},
    },
};

/// O serviço remoto de dados, visto pelo núcleo.
/// Cada consulta pertence a uma das três camadas (escola, ano, período)
/// ou ao calendário que as seleciona. Nada de consultas avulsas.
#[async_trait]
pub trait SchoolDataSource: Send + Sync {
    // --- Camada de escola (visão da plataforma, só super-admin) ---
    async fn fetch_tenants(&self) -> Result<Vec<Tenant>, AppError>;
    async fn fetch_subscriptions(&self) -> Result<Vec<Subscription>, AppError>;

    // --- Camada de escola (visão de uma escola) ---
    async fn fetch_tenant(&self, tenant_id: Uuid) -> Result<Tenant, AppError>;
    async fn fetch_staff(&self, tenant_id: Uuid) -> Result<Vec<StaffMember>, AppError>;
    async fn fetch_subjects(&self, tenant_id: Uuid) -> Result<Vec<Subject>, AppError>;

    // --- Camada do ano letivo ---
    async fn fetch_students(&self, tenant_id: Uuid, year: &str) -> Result<Vec<Student>, AppError>;
    async fn fetch_dashboard_counters(
        &self,
        tenant_id: Uuid,
        year: &str,
    ) -> Result<DashboardCounters, AppError>;

    // --- Camada do período ---
    async fn fetch_teaching_assignments(
        &self,
        tenant_id: Uuid,
        year: &str,
        term: &str,
    ) -> Result<Vec<TeachingAssignment>, AppError>;

    // --- Calendário (seletores de ano e período) ---
    async fn fetch_academic_years(&self, tenant_id: Uuid) -> Result<Vec<AcademicYear>, AppError>;
    async fn fetch_terms(&self, tenant_id: Uuid, year: &str) -> Result<Vec<Term>, AppError>;
}

/// Perfil de funcionário, usado só pelo resolvedor de papéis e pelo escopo.
#[async_trait]
pub trait StaffProfileSource: Send + Sync {
    async fn get_profile(&self, principal_id: Uuid) -> Result<Option<StaffProfile>, AppError>;
}
