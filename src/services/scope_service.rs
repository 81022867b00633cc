// src/services/scope_service.rs

use std::sync::{Arc, Mutex};

use crate::models::{auth::StaffProfile, rbac::Role, scope::Scope};

/// Consulta pura: o escopo do papel ativo no mapa de atribuições do perfil.
/// Papel sem atribuição (ou atribuição só de disciplina) não filtra alunos.
pub fn scope_for(role: Role, profile: Option<&StaffProfile>) -> Scope {
    let Some(assignment) = profile.and_then(|p| p.assignment_for(role.as_str())) else {
        return Scope::Unrestricted;
    };

    // Cursos têm precedência sobre turmas quando os dois vêm preenchidos
    if !assignment.majors.is_empty() {
        Scope::MajorList(assignment.majors.clone())
    } else if !assignment.classes.is_empty() {
        Scope::ClassTupleList(assignment.classes.clone())
    } else {
        Scope::Unrestricted
    }
}

type ScopeMemo = (Role, Arc<StaffProfile>, Arc<Scope>);

// Memoiza a última consulta pela identidade de (papel, perfil)
#[derive(Default)]
pub struct ScopeStore {
    last: Mutex<Option<ScopeMemo>>,
}

impl ScopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_scope(&self, role: Option<Role>, profile: Option<&Arc<StaffProfile>>) -> Arc<Scope> {
        let Some(role) = role else {
            return Arc::new(Scope::Unrestricted);
        };
        let Some(profile) = profile else {
            return Arc::new(scope_for(role, None));
        };

        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some((cached_role, cached_profile, scope)) = last.as_ref() {
            if *cached_role == role && Arc::ptr_eq(cached_profile, profile) {
                return Arc::clone(scope);
            }
        }

        let scope = Arc::new(scope_for(role, Some(profile)));
        *last = Some((role, Arc::clone(profile), Arc::clone(&scope)));
        scope
    }
}
