// tests/test_support/mod.rs
#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use school_dashboard::{
    common::{error::AppError, notify::TracingNotifier},
    db::{FixtureDocument, FixtureRepository, MemoryCache, SchoolDataSource, SchoolFixture, StaffProfileSource},
    models::{
        auth::{Principal, RoleAssignment, StaffProfile},
        dashboard::DashboardCounters,
        school::{AcademicYear, StaffMember, Student, Subject, TeachingAssignment, Term},
        tenancy::{Subscription, Tenant},
    },
    services::{auth::StaticAuthProvider, dashboard_service::DashboardStore},
};
use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

fn repeat(n: usize, major: &str, group: &str, desc: &str, section: &str) -> Vec<Student> {
    (0..n)
        .map(|i| Student::new(format!("{} {}{}", major, desc, i), major, group, desc, section))
        .collect()
}

/// 50 alunos em 2025 (30 de Science, 20 de Arts) e 5 em 2024.
pub fn school() -> SchoolFixture {
    let mut school = SchoolFixture::default();
    school.years = vec![
        AcademicYear { label: "2024".into(), is_current: false },
        AcademicYear { label: "2025".into(), is_current: true },
    ];
    for year in ["2024", "2025"] {
        school.terms.insert(
            year.into(),
            vec![
                Term { label: "1".into(), is_current: true },
                Term { label: "2".into(), is_current: false },
            ],
        );
    }

    let mut students_2025 = repeat(10, "Science", "X", "IPA", "1");
    students_2025.extend(repeat(10, "Science", "X", "IPA", "2"));
    students_2025.extend(repeat(10, "Science", "XI", "IPA", "1"));
    students_2025.extend(repeat(20, "Arts", "X", "IPS", "1"));
    school.students.insert("2025".into(), students_2025);
    school.students.insert("2024".into(), repeat(5, "Science", "X", "IPA", "1"));

    let subject = Subject { id: Uuid::new_v4(), name: "Física".into(), code: Some("FIS".into()) };
    school.assignments.insert(
        "2025/1".into(),
        vec![TeachingAssignment {
            id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            subject_id: subject.id,
            major: "Science".into(),
            group: "X".into(),
            class_desc: "IPA".into(),
            section: "1".into(),
            year: "2025".into(),
            term: "1".into(),
        }],
    );
    school.subjects.push(subject);
    school
}

pub fn principal(declared_role: &str, tenant_id: Option<Uuid>) -> Principal {
    Principal {
        id: Uuid::new_v4(),
        display_name: "Rina".into(),
        declared_role: declared_role.into(),
        tenant_id,
        remembered_role: None,
    }
}

/// Perfil com uma atribuição de cursos para `major-head`.
pub fn major_head_profile(principal_id: Uuid, majors: &[&str]) -> StaffProfile {
    StaffProfile {
        principal_id,
        roles: vec!["major-head".into()],
        assignments: HashMap::from([(
            "major-head".to_string(),
            RoleAssignment {
                majors: majors.iter().map(|m| m.to_string()).collect(),
                ..Default::default()
            },
        )]),
    }
}

pub fn document(principal: Principal, profile: Option<StaffProfile>, tenant_id: Uuid) -> FixtureDocument {
    FixtureDocument {
        principal,
        profile,
        tenants: vec![Tenant {
            id: tenant_id,
            name: "SMA Negeri 1".into(),
            description: None,
            created_at: None,
        }],
        subscriptions: vec![],
        schools: HashMap::from([(tenant_id, school())]),
    }
}

// ---
// Fonte de dados com portão: segura uma chamada até o teste liberar
// ---
struct Gate {
    key: String,
    started: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

pub struct GatedSource {
    inner: FixtureRepository,
    gate: Mutex<Option<Gate>>,
    failing: std::sync::Mutex<HashSet<String>>,
}

impl GatedSource {
    pub fn new(inner: FixtureRepository) -> Self {
        Self {
            inner,
            gate: Mutex::new(None),
            failing: std::sync::Mutex::new(HashSet::new()),
        }
    }

    /// Arma o portão para a chave. Devolve (aviso de início, liberação).
    pub async fn hold(&self, key: &str) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.gate.lock().await = Some(Gate {
            key: key.to_string(),
            started: started_tx,
            release: release_rx,
        });
        (started_rx, release_tx)
    }

    pub fn fail(&self, key: &str, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(key.to_string());
        } else {
            set.remove(key);
        }
    }

    async fn pass(&self, key: String) -> Result<(), AppError> {
        let gate = {
            let mut gate = self.gate.lock().await;
            if gate.as_ref().is_some_and(|g| g.key == key) {
                gate.take()
            } else {
                None
            }
        };
        if let Some(gate) = gate {
            let _ = gate.started.send(());
            let _ = gate.release.await;
        }

        if self.failing.lock().unwrap().contains(&key) {
            return Err(AppError::DataSourceError(format!("{} indisponível", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl SchoolDataSource for GatedSource {
    async fn fetch_tenants(&self) -> Result<Vec<Tenant>, AppError> {
        self.pass("tenants".into()).await?;
        self.inner.fetch_tenants().await
    }

    async fn fetch_subscriptions(&self) -> Result<Vec<Subscription>, AppError> {
        self.pass("subscriptions".into()).await?;
        self.inner.fetch_subscriptions().await
    }

    async fn fetch_tenant(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        self.pass("tenant".into()).await?;
        self.inner.fetch_tenant(tenant_id).await
    }

    async fn fetch_staff(&self, tenant_id: Uuid) -> Result<Vec<StaffMember>, AppError> {
        self.inner.fetch_staff(tenant_id).await
    }

    async fn fetch_subjects(&self, tenant_id: Uuid) -> Result<Vec<Subject>, AppError> {
        self.inner.fetch_subjects(tenant_id).await
    }

    async fn fetch_students(&self, tenant_id: Uuid, year: &str) -> Result<Vec<Student>, AppError> {
        self.pass(format!("students:{}", year)).await?;
        self.inner.fetch_students(tenant_id, year).await
    }

    async fn fetch_dashboard_counters(&self, tenant_id: Uuid, year: &str) -> Result<DashboardCounters, AppError> {
        self.inner.fetch_dashboard_counters(tenant_id, year).await
    }

    async fn fetch_teaching_assignments(
        &self,
        tenant_id: Uuid,
        year: &str,
        term: &str,
    ) -> Result<Vec<TeachingAssignment>, AppError> {
        self.pass(format!("assignments:{}/{}", year, term)).await?;
        self.inner.fetch_teaching_assignments(tenant_id, year, term).await
    }

    async fn fetch_academic_years(&self, tenant_id: Uuid) -> Result<Vec<AcademicYear>, AppError> {
        self.pass("years".into()).await?;
        self.inner.fetch_academic_years(tenant_id).await
    }

    async fn fetch_terms(&self, tenant_id: Uuid, year: &str) -> Result<Vec<Term>, AppError> {
        self.pass(format!("terms:{}", year)).await?;
        self.inner.fetch_terms(tenant_id, year).await
    }
}

// ---
// Montagem completa da store para os cenários
// ---
pub struct Harness {
    pub tenant_id: Uuid,
    pub principal: Principal,
    pub auth: Arc<StaticAuthProvider>,
    pub source: Arc<GatedSource>,
    pub cache: Arc<MemoryCache>,
    pub notifier: Arc<TracingNotifier>,
    pub store: DashboardStore,
}

impl Harness {
    pub fn new(declared_role: &str, majors: Option<&[&str]>) -> Self {
        Self::with_cache(declared_role, majors, Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(declared_role: &str, majors: Option<&[&str]>, cache: Arc<MemoryCache>) -> Self {
        let tenant_id = Uuid::new_v4();
        let principal = principal(declared_role, Some(tenant_id));
        let profile = majors.map(|m| major_head_profile(principal.id, m));
        let repo = FixtureRepository::new(document(principal.clone(), profile, tenant_id));

        let profiles: Arc<dyn StaffProfileSource> = Arc::new(repo.clone());
        let source = Arc::new(GatedSource::new(repo));
        let auth = Arc::new(StaticAuthProvider::new(Some(principal.clone())));
        let notifier = Arc::new(TracingNotifier::new());

        let store = DashboardStore::new(
            auth.clone(),
            profiles,
            source.clone(),
            cache.clone(),
            notifier.clone(),
        );

        Self { tenant_id, principal, auth, source, cache, notifier, store }
    }
}
