// src/models/auth.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::scope::ClassKey;

// Representa o usuário autenticado, vindo do provedor de autenticação.
// O núcleo trata como somente leitura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,

    #[validate(length(min = 1, message = "O nome de exibição não pode ser vazio."))]
    pub display_name: String,

    // Papel declarado no cadastro. Texto livre: pode estar fora do vocabulário.
    #[validate(length(min = 1, message = "O papel declarado não pode ser vazio."))]
    pub declared_role: String,

    // Escola do usuário. O super-admin da plataforma pode não ter nenhuma.
    #[serde(default)]
    pub tenant_id: Option<Uuid>,

    // Último papel ativo sincronizado de volta pelo próprio dashboard
    #[serde(default)]
    pub remembered_role: Option<String>,
}

// Atribuição de escopo de um papel suplementar.
// O formato varia por papel: cursos, turmas ou uma disciplina.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    #[serde(default)]
    pub majors: Vec<String>,
    #[serde(default)]
    pub classes: Vec<ClassKey>,
    #[serde(default)]
    pub subject_id: Option<Uuid>,
}

impl RoleAssignment {
    pub fn is_empty(&self) -> bool {
        self.majors.is_empty() && self.classes.is_empty() && self.subject_id.is_none()
    }
}

// Perfil de funcionário (1:1 com o Principal, quando existe)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub principal_id: Uuid,

    // Tags de papéis suplementares (texto livre, como vem do banco)
    #[serde(default)]
    pub roles: Vec<String>,

    // Mapa papel -> escopo atribuído
    #[serde(default)]
    pub assignments: HashMap<String, RoleAssignment>,
}

impl StaffProfile {
    pub fn assignment_for(&self, role_tag: &str) -> Option<&RoleAssignment> {
        self.assignments.get(role_tag)
    }
}
