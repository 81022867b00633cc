// src/services.rs

pub mod auth;
pub use auth::{AuthProvider, StaticAuthProvider};
pub mod calendar_service;
pub use calendar_service::CalendarService;
pub mod dashboard_service;
pub use dashboard_service::{DashboardStore, DashboardView};
pub mod hierarchy_service;
pub use hierarchy_service::{build_structure, ClassStructure, HierarchyCache};
pub mod loader_service;
pub use loader_service::{CascadingLoader, ScopedDataSet, Selection, TierOutcome};
pub mod role_service;
pub use role_service::{resolve_roles, select_active_role, RoleService, RoleSwitch, SyncOutcome};
pub mod scope_service;
pub use scope_service::{scope_for, ScopeStore};
pub mod tier_state;
pub use tier_state::{TierState, TierStatus};
