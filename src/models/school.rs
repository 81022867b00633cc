// src/models/school.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---
// 1. Student (a matrícula do aluno no ano letivo)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    // Curso / habilitação (ex: "Science")
    pub major: String,
    // Série (ex: "X", "XI")
    pub group: String,
    // Descrição da turma (ex: "IPA")
    pub class_desc: String,
    #[serde(default)]
    pub section: String,
}

impl Student {
    pub fn new(
        full_name: impl Into<String>,
        major: impl Into<String>,
        group: impl Into<String>,
        class_desc: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            major: major.into(),
            group: group.into(),
            class_desc: class_desc.into(),
            section: section.into(),
        }
    }
}

// ---
// 2. StaffMember (diretório de funcionários da escola)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
}

// ---
// 3. Subject (catálogo de disciplinas)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

// ---
// 4. TeachingAssignment (quem ensina o quê, para quem, no período)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachingAssignment {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub subject_id: Uuid,
    pub major: String,
    pub group: String,
    pub class_desc: String,
    #[serde(default)]
    pub section: String,
    pub year: String,
    pub term: String,
}

// ---
// 5. Calendário letivo
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicYear {
    pub label: String,
    #[serde(default)]
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub label: String,
    #[serde(default)]
    pub is_current: bool,
}
