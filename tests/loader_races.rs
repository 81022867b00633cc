// tests/loader_races.rs

mod test_support;

use std::sync::Arc;

use test_support::GatedSource;
use school_dashboard::{
    common::notify::TracingNotifier,
    db::{FixtureRepository, MemoryCache},
    models::rbac::Role,
    services::{
        calendar_service::CalendarService,
        loader_service::{CascadingLoader, Selection, TierOutcome},
        tier_state::TierStatus,
    },
};
use uuid::Uuid;

struct Setup {
    tenant_id: Uuid,
    source: Arc<GatedSource>,
    notifier: Arc<TracingNotifier>,
    loader: Arc<CascadingLoader>,
}

// Loader sem nenhuma camada carregada
fn bare() -> Setup {
    let tenant_id = Uuid::new_v4();
    let principal = test_support::principal("teacher", Some(tenant_id));
    let repo = FixtureRepository::new(test_support::document(principal, None, tenant_id));

    let source = Arc::new(GatedSource::new(repo));
    let notifier = Arc::new(TracingNotifier::new());
    let loader = Arc::new(CascadingLoader::new(source.clone(), notifier.clone()));

    Setup { tenant_id, source, notifier, loader }
}

async fn setup() -> Setup {
    let s = bare();
    let outcome = s.loader.load_tenant_tier(Some(s.tenant_id), Some(Role::Teacher)).await;
    assert_eq!(outcome, TierOutcome::Loaded);
    s
}

fn selection(tenant_id: Uuid, year: &str, term: Option<&str>) -> Selection {
    Selection {
        tenant_id: Some(tenant_id),
        role: Some(Role::Teacher),
        year: Some(year.to_string()),
        term: term.map(str::to_string),
    }
}

#[tokio::test]
async fn late_response_for_an_old_year_is_discarded() {
    let s = setup().await;
    let (started, release) = s.source.hold("students:2024").await;

    let old = {
        let loader = s.loader.clone();
        let tenant_id = s.tenant_id;
        tokio::spawn(async move { loader.load_year_tier(Some(tenant_id), Some("2024")).await })
    };
    started.await.unwrap();

    // O usuário troca de ano antes da resposta de 2024 chegar
    let outcome = s.loader.load_year_tier(Some(s.tenant_id), Some("2025")).await;
    assert_eq!(outcome, TierOutcome::Loaded);

    release.send(()).unwrap();
    assert_eq!(old.await.unwrap(), TierOutcome::Discarded);

    let snapshot = s.loader.snapshot().await;
    assert_eq!(snapshot.statuses.year, TierStatus::Ready);
    assert_eq!(snapshot.students().map(|st| st.len()), Some(50));
    assert!(s.notifier.history().is_empty());
}

#[tokio::test]
async fn late_failure_for_an_old_year_is_not_reported() {
    let s = setup().await;
    s.source.fail("students:2024", true);
    let (started, release) = s.source.hold("students:2024").await;

    let old = {
        let loader = s.loader.clone();
        let tenant_id = s.tenant_id;
        tokio::spawn(async move { loader.load_year_tier(Some(tenant_id), Some("2024")).await })
    };
    started.await.unwrap();

    s.loader.load_year_tier(Some(s.tenant_id), Some("2025")).await;
    release.send(()).unwrap();

    assert_eq!(old.await.unwrap(), TierOutcome::Discarded);
    assert!(s.notifier.history().is_empty());
    assert_eq!(s.loader.last_error(school_dashboard::services::loader_service::Tier::Year).await, None);
}

#[tokio::test]
async fn term_result_is_dropped_when_the_year_changes_mid_flight() {
    let s = setup().await;
    s.loader.load_year_tier(Some(s.tenant_id), Some("2025")).await;
    let (started, release) = s.source.hold("assignments:2025/1").await;

    let term = {
        let loader = s.loader.clone();
        let tenant_id = s.tenant_id;
        tokio::spawn(async move { loader.load_term_tier(Some(tenant_id), Some("2025"), Some("1")).await })
    };
    started.await.unwrap();

    s.loader.load_year_tier(Some(s.tenant_id), Some("2024")).await;
    release.send(()).unwrap();

    assert_eq!(term.await.unwrap(), TierOutcome::Discarded);
    let snapshot = s.loader.snapshot().await;
    assert!(snapshot.term.is_none());
    assert_eq!(snapshot.statuses.term, TierStatus::Idle);
    assert_eq!(snapshot.students().map(|st| st.len()), Some(5));
}

#[tokio::test]
async fn term_waits_while_the_same_year_is_loading() {
    let s = setup().await;
    let (started, release) = s.source.hold("students:2025").await;

    let year = {
        let loader = s.loader.clone();
        let tenant_id = s.tenant_id;
        tokio::spawn(async move { loader.load_year_tier(Some(tenant_id), Some("2025")).await })
    };
    started.await.unwrap();

    let outcome = s.loader.load_term_tier(Some(s.tenant_id), Some("2025"), Some("1")).await;
    assert_eq!(outcome, TierOutcome::Blocked);
    assert_eq!(s.loader.statuses().await.term, TierStatus::Idle);

    release.send(()).unwrap();
    assert_eq!(year.await.unwrap(), TierOutcome::Loaded);

    // O período barrado sai sozinho quando o ano fica pronto
    let snapshot = s.loader.snapshot().await;
    assert_eq!(snapshot.statuses.term, TierStatus::Ready);
    assert_eq!(snapshot.assignments().len(), 1);
    assert!(!s.loader.is_loading().await);
}

#[tokio::test]
async fn newer_term_chosen_while_the_year_loads_wins() {
    let s = setup().await;
    let (started, release) = s.source.hold("students:2025").await;

    let first = {
        let loader = s.loader.clone();
        let wanted = selection(s.tenant_id, "2025", Some("1"));
        tokio::spawn(async move { loader.sync(&wanted).await })
    };
    started.await.unwrap();

    let report = s.loader.sync(&selection(s.tenant_id, "2025", Some("2"))).await;
    assert_eq!(report.year, TierOutcome::Current);
    assert_eq!(report.term, TierOutcome::Blocked);

    release.send(()).unwrap();
    let report = first.await.unwrap();
    assert_eq!(report.year, TierOutcome::Loaded);

    // Só o período 2 tem chave desejada; o 1 nunca foi buscado
    let snapshot = s.loader.snapshot().await;
    assert_eq!(snapshot.statuses.term, TierStatus::Ready);
    assert_eq!(snapshot.assignments().len(), 0);
    assert!(!s.loader.is_loading().await);
    assert_eq!(s.loader.wanted().await.term.as_deref(), Some("2"));
}

#[tokio::test]
async fn newer_year_chosen_while_the_school_loads_wins() {
    let s = bare();
    let (started, release) = s.source.hold("tenant").await;

    let first = {
        let loader = s.loader.clone();
        let wanted = selection(s.tenant_id, "2025", Some("1"));
        tokio::spawn(async move { loader.sync(&wanted).await })
    };
    started.await.unwrap();

    let report = s.loader.sync(&selection(s.tenant_id, "2024", Some("1"))).await;
    assert_eq!(report.tenant, TierOutcome::Current);
    assert_eq!(report.year, TierOutcome::Blocked);
    assert_eq!(report.term, TierOutcome::Blocked);

    release.send(()).unwrap();
    assert_eq!(first.await.unwrap().tenant, TierOutcome::Loaded);

    let snapshot = s.loader.snapshot().await;
    assert_eq!(snapshot.statuses.year, TierStatus::Ready);
    assert_eq!(snapshot.students().map(|st| st.len()), Some(5));
    assert_eq!(snapshot.statuses.term, TierStatus::Ready);
    assert!(!s.loader.is_loading().await);
}

#[tokio::test]
async fn failed_year_is_retried_on_the_next_sync() {
    let s = setup().await;
    s.loader.sync(&selection(s.tenant_id, "2025", None)).await;

    s.source.fail("students:2024", true);
    let report = s.loader.sync(&selection(s.tenant_id, "2024", None)).await;
    assert!(matches!(report.year, TierOutcome::Failed(_)));

    // Dado velho continua visível, mas a chave pedida ainda não foi servida
    let snapshot = s.loader.snapshot().await;
    assert_eq!(snapshot.statuses.year, TierStatus::Ready);
    assert_eq!(snapshot.students().map(|st| st.len()), Some(50));

    s.source.fail("students:2024", false);
    let report = s.loader.sync(&selection(s.tenant_id, "2024", None)).await;
    assert_eq!(report.year, TierOutcome::Loaded);
    assert_eq!(s.loader.snapshot().await.students().map(|st| st.len()), Some(5));
}

#[tokio::test]
async fn overlapping_term_fetches_keep_the_calendar_loading() {
    let s = bare();
    let calendar = Arc::new(CalendarService::new(
        s.source.clone(),
        Arc::new(MemoryCache::new()),
        s.notifier.clone(),
    ));
    assert_eq!(calendar.load_years(Some(s.tenant_id)).await.as_deref(), Some("2025"));

    let (started, release) = s.source.hold("terms:2025").await;
    let slow = {
        let calendar = calendar.clone();
        let tenant_id = s.tenant_id;
        tokio::spawn(async move { calendar.load_terms(Some(tenant_id), Some("2025")).await })
    };
    started.await.unwrap();

    // A segunda busca termina antes; a primeira ainda está no ar
    calendar.load_terms(Some(s.tenant_id), Some("2025")).await;
    assert!(calendar.is_loading().await);

    release.send(()).unwrap();
    slow.await.unwrap();
    assert!(!calendar.is_loading().await);
}

#[tokio::test]
async fn switching_school_clears_the_lower_tiers() {
    let s = setup().await;
    s.loader.load_year_tier(Some(s.tenant_id), Some("2025")).await;
    s.loader.load_term_tier(Some(s.tenant_id), Some("2025"), Some("1")).await;

    // Escola desconhecida: a carga falha, mas ano e período já eram de outra escola
    let outcome = s.loader.load_tenant_tier(Some(Uuid::new_v4()), Some(Role::Teacher)).await;
    assert!(matches!(outcome, TierOutcome::Failed(_)));

    // Nem a escola antiga fica publicada como dado velho
    let snapshot = s.loader.snapshot().await;
    assert!(snapshot.tenant.is_none());
    assert_eq!(snapshot.statuses.tenant, TierStatus::Idle);
    assert!(snapshot.year.is_none());
    assert!(snapshot.term.is_none());
    assert_eq!(snapshot.statuses.year, TierStatus::Idle);
}
