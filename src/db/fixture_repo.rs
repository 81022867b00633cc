// src/db/fixture_repo.rs

use std::{collections::{BTreeSet, HashMap}, path::Path, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::data_source::{SchoolDataSource, StaffProfileSource},
    models::{
        auth::{Principal, StaffProfile},
        dashboard::DashboardCounters,
        school::{AcademicYear, StaffMember, Student, Subject, TeachingAssignment, Term},
        tenancy::{Subscription, Tenant},
    },
};

// Dados de uma escola dentro do documento de fixture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolFixture {
    #[serde(default)]
    pub staff: Vec<StaffMember>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub years: Vec<AcademicYear>,
    // ano -> períodos
    #[serde(default)]
    pub terms: HashMap<String, Vec<Term>>,
    // ano -> alunos
    #[serde(default)]
    pub students: HashMap<String, Vec<Student>>,
    // ano -> contadores (se ausente, são calculados)
    #[serde(default)]
    pub counters: HashMap<String, DashboardCounters>,
    // "ano/período" -> atribuições
    #[serde(default)]
    pub assignments: HashMap<String, Vec<TeachingAssignment>>,
}

/// O documento inteiro: usuário, perfil e os dados da plataforma.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FixtureDocument {
    #[validate(nested)]
    pub principal: Principal,
    #[serde(default)]
    pub profile: Option<StaffProfile>,
    #[serde(default)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[validate(length(min = 1, message = "A fixture precisa de ao menos uma escola."))]
    pub schools: HashMap<Uuid, SchoolFixture>,
}

// Repositório somente leitura sobre o documento de fixture.
// Faz o papel do serviço remoto para o binário e para os testes.
#[derive(Clone)]
pub struct FixtureRepository {
    doc: Arc<FixtureDocument>,
}

impl FixtureRepository {
    pub fn new(doc: FixtureDocument) -> Self {
        Self { doc: Arc::new(doc) }
    }

    /// Lê e valida o documento JSON.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let doc: FixtureDocument = serde_json::from_str(&raw)?;
        doc.validate()?;

        tracing::info!(
            "📂 Fixture carregada: {} escola(s), usuário {}",
            doc.schools.len(),
            doc.principal.id
        );
        Ok(Self::new(doc))
    }

    pub fn principal(&self) -> &Principal {
        &self.doc.principal
    }

    fn school(&self, tenant_id: Uuid) -> Result<&SchoolFixture, AppError> {
        self.doc
            .schools
            .get(&tenant_id)
            .ok_or(AppError::TenantNotFound(tenant_id))
    }
}

// Contadores calculados a partir dos próprios dados, quando a fixture não os traz
fn derive_counters(school: &SchoolFixture, students: &[Student]) -> DashboardCounters {
    let classes: BTreeSet<(&str, &str, &str, &str)> = students
        .iter()
        .map(|s| (s.major.as_str(), s.group.as_str(), s.class_desc.as_str(), s.section.as_str()))
        .collect();

    DashboardCounters {
        total_students: students.len() as u64,
        total_staff: school.staff.len() as u64,
        total_classes: classes.len() as u64,
        total_subjects: school.subjects.len() as u64,
    }
}

#[async_trait]
impl SchoolDataSource for FixtureRepository {
    async fn fetch_tenants(&self) -> Result<Vec<Tenant>, AppError> {
        Ok(self.doc.tenants.clone())
    }

    async fn fetch_subscriptions(&self) -> Result<Vec<Subscription>, AppError> {
        Ok(self.doc.subscriptions.clone())
    }

    async fn fetch_tenant(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        self.doc
            .tenants
            .iter()
            .find(|t| t.id == tenant_id)
            .cloned()
            .ok_or(AppError::TenantNotFound(tenant_id))
    }

    async fn fetch_staff(&self, tenant_id: Uuid) -> Result<Vec<StaffMember>, AppError> {
        Ok(self.school(tenant_id)?.staff.clone())
    }

    async fn fetch_subjects(&self, tenant_id: Uuid) -> Result<Vec<Subject>, AppError> {
        Ok(self.school(tenant_id)?.subjects.clone())
    }

    async fn fetch_students(&self, tenant_id: Uuid, year: &str) -> Result<Vec<Student>, AppError> {
        let school = self.school(tenant_id)?;
        Ok(school.students.get(year).cloned().unwrap_or_default())
    }

    async fn fetch_dashboard_counters(
        &self,
        tenant_id: Uuid,
        year: &str,
    ) -> Result<DashboardCounters, AppError> {
        let school = self.school(tenant_id)?;
        if let Some(counters) = school.counters.get(year) {
            return Ok(counters.clone());
        }

        let students = school.students.get(year).map(Vec::as_slice).unwrap_or_default();
        Ok(derive_counters(school, students))
    }

    async fn fetch_teaching_assignments(
        &self,
        tenant_id: Uuid,
        year: &str,
        term: &str,
    ) -> Result<Vec<TeachingAssignment>, AppError> {
        let school = self.school(tenant_id)?;
        let key = format!("{}/{}", year, term);
        Ok(school.assignments.get(&key).cloned().unwrap_or_default())
    }

    async fn fetch_academic_years(&self, tenant_id: Uuid) -> Result<Vec<AcademicYear>, AppError> {
        Ok(self.school(tenant_id)?.years.clone())
    }

    async fn fetch_terms(&self, tenant_id: Uuid, year: &str) -> Result<Vec<Term>, AppError> {
        let school = self.school(tenant_id)?;
        Ok(school.terms.get(year).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl StaffProfileSource for FixtureRepository {
    async fn get_profile(&self, principal_id: Uuid) -> Result<Option<StaffProfile>, AppError> {
        Ok(self
            .doc
            .profile
            .as_ref()
            .filter(|p| p.principal_id == principal_id)
            .cloned())
    }
}
