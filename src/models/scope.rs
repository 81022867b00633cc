// src/models/scope.rs

use serde::{Deserialize, Serialize};

use crate::models::school::Student;

// Identifica uma turma concreta: (curso, série, turma, seção)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassKey {
    pub major: String,
    pub group: String,
    pub class_desc: String,
    pub section: String,
}

impl ClassKey {
    pub fn new(
        major: impl Into<String>,
        group: impl Into<String>,
        class_desc: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            major: major.into(),
            group: group.into(),
            class_desc: class_desc.into(),
            section: section.into(),
        }
    }

    pub fn of(student: &Student) -> Self {
        Self::new(
            student.major.as_str(),
            student.group.as_str(),
            student.class_desc.as_str(),
            student.section.as_str(),
        )
    }

    pub fn matches(&self, student: &Student) -> bool {
        self.major == student.major
            && self.group == student.group
            && self.class_desc == student.class_desc
            && self.section == student.section
    }
}

/// A restrição administrativa do papel ativo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "camelCase")]
pub enum Scope {
    #[default]
    Unrestricted,
    MajorList(Vec<String>),
    ClassTupleList(Vec<ClassKey>),
}

impl Scope {
    pub fn allows(&self, student: &Student) -> bool {
        match self {
            Scope::Unrestricted => true,
            Scope::MajorList(majors) => majors.iter().any(|m| *m == student.major),
            Scope::ClassTupleList(classes) => classes.iter().any(|k| k.matches(student)),
        }
    }

    /// Filtra a coleção. Idempotente: aplicar duas vezes dá o mesmo resultado.
    pub fn apply(&self, students: &[Student]) -> Vec<Student> {
        students.iter().filter(|s| self.allows(s)).cloned().collect()
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Scope::Unrestricted)
    }
}
