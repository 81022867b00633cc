// src/models/rbac.rs

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::common::error::AppError;

// ---
// 1. Role (o vocabulário fechado de papéis)
// ---
// A ordem de declaração É a hierarquia de prioridade: o `Ord` derivado coloca
// o papel mais alto primeiro. É uma ordem total sobre o vocabulário conhecido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SuperAdmin,
    SchoolAdmin,
    Headmaster,
    AcademicDirector,
    MajorHead,
    SubjectCoordinator,
    HomeroomTeacher,
    Teacher,
    Student,
    Parent,
}

// A "classe" de prioridade de um papel. Decide, por exemplo, quais coleções a
// camada de escola carrega.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleClass {
    TenantSuper,
    TenantAdmin,
    SubordinateAdmin,
    BaseStaff,
    Consumer,
}

impl Role {
    pub const ALL: [Role; 10] = [
        Role::SuperAdmin,
        Role::SchoolAdmin,
        Role::Headmaster,
        Role::AcademicDirector,
        Role::MajorHead,
        Role::SubjectCoordinator,
        Role::HomeroomTeacher,
        Role::Teacher,
        Role::Student,
        Role::Parent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::SchoolAdmin => "school-admin",
            Role::Headmaster => "headmaster",
            Role::AcademicDirector => "academic-director",
            Role::MajorHead => "major-head",
            Role::SubjectCoordinator => "subject-coordinator",
            Role::HomeroomTeacher => "homeroom-teacher",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }

    pub fn class(&self) -> RoleClass {
        match self {
            Role::SuperAdmin => RoleClass::TenantSuper,
            Role::SchoolAdmin | Role::Headmaster => RoleClass::TenantAdmin,
            Role::AcademicDirector
            | Role::MajorHead
            | Role::SubjectCoordinator
            | Role::HomeroomTeacher => RoleClass::SubordinateAdmin,
            Role::Teacher => RoleClass::BaseStaff,
            Role::Student | Role::Parent => RoleClass::Consumer,
        }
    }

    /// Papéis "terminais" não acumulam papéis suplementares do perfil.
    pub fn is_terminal(&self) -> bool {
        matches!(self.class(), RoleClass::TenantSuper | RoleClass::Consumer)
    }

    /// Só o super-admin enxerga a plataforma inteira (diretório de escolas).
    pub fn is_tenant_wide(&self) -> bool {
        self.class() == RoleClass::TenantSuper
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == tag)
            .ok_or_else(|| AppError::UnknownRole(tag.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---
// 2. RoleSet (conjunto ordenado e sem duplicatas)
// ---
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// O papel de maior prioridade.
    pub fn head(&self) -> Option<Role> {
        self.0.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        // BTreeSet ordena pela hierarquia e remove duplicatas de uma vez
        let sorted: BTreeSet<Role> = iter.into_iter().collect();
        Self(sorted.into_iter().collect())
    }
}
