// src/models/tenancy.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---
// 1. Tenant (a "Escola")
// ---
// Metadados da escola que o usuário está administrando
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ---
// 2. Subscription (o plano da escola na plataforma)
// ---
// Só o super-admin enxerga isso. Apenas carregamos, sem lógica de cobrança.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub tenant_id: Uuid,
    pub plan: String,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}
