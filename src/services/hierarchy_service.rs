// src/services/hierarchy_service.rs

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex},
};

use serde::Serialize;

use crate::models::{
    dashboard::ClassNode,
    school::Student,
    scope::{ClassKey, Scope},
};

/// Sentinela "todos" dos seletores de curso / série / turma.
pub const ALL: &str = "all";

/// Regra única para listas de opções: prefixa "all" sempre que houver mais
/// de um valor distinto. Os valores já chegam ordenados.
pub fn with_all_sentinel<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let values: Vec<String> = values.into_iter().collect();
    if values.len() > 1 {
        std::iter::once(ALL.to_string()).chain(values).collect()
    } else {
        values
    }
}

fn matches_filter(filter: &str, value: &str) -> bool {
    filter == ALL || filter == value
}

type GroupKey = (String, String);
type DescKey = (String, String, String);

// A estrutura curso -> série -> turma -> seção derivada dos alunos
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStructure {
    pub majors: Vec<String>,
    pub class_nodes: Vec<ClassNode>,
    filtered_count: usize,
    #[serde(skip)]
    groups_by_major: BTreeMap<String, BTreeSet<String>>,
    #[serde(skip)]
    descs_by_group: BTreeMap<GroupKey, BTreeSet<String>>,
    #[serde(skip)]
    sections_by_desc: BTreeMap<DescKey, BTreeMap<String, usize>>,
}

impl ClassStructure {
    pub fn groups(&self, major: &str) -> Vec<String> {
        let groups: BTreeSet<String> = self
            .groups_by_major
            .iter()
            .filter(|(m, _)| matches_filter(major, m))
            .flat_map(|(_, groups)| groups.iter().cloned())
            .collect();
        with_all_sentinel(groups)
    }

    pub fn class_descs(&self, major: &str, group: &str) -> Vec<String> {
        let descs: BTreeSet<String> = self
            .descs_by_group
            .iter()
            .filter(|((m, g), _)| matches_filter(major, m) && matches_filter(group, g))
            .flat_map(|(_, descs)| descs.iter().cloned())
            .collect();
        with_all_sentinel(descs)
    }

    pub fn sections(&self, major: &str, group: &str, class_desc: &str) -> Vec<String> {
        let sections: BTreeSet<String> = self
            .sections_by_desc
            .iter()
            .filter(|((m, g, d), _)| {
                matches_filter(major, m) && matches_filter(group, g) && matches_filter(class_desc, d)
            })
            .flat_map(|(_, sections)| sections.keys().cloned())
            .collect();
        with_all_sentinel(sections)
    }

    /// Quantos alunos sobraram depois do filtro de escopo.
    pub fn filtered_count(&self) -> usize {
        self.filtered_count
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_count == 0
    }
}

/// Monta a estrutura de turmas. Nunca falha: sem alunos, tudo vazio.
pub fn build_structure(students: &[Student], scope: &Scope) -> ClassStructure {
    let mut structure = ClassStructure::default();

    // 1. Filtro de escopo + 2. uma única passada montando os três índices
    for student in students.iter().filter(|s| scope.allows(s)) {
        structure.filtered_count += 1;

        structure
            .groups_by_major
            .entry(student.major.clone())
            .or_default()
            .insert(student.group.clone());

        structure
            .descs_by_group
            .entry((student.major.clone(), student.group.clone()))
            .or_default()
            .insert(student.class_desc.clone());

        *structure
            .sections_by_desc
            .entry((student.major.clone(), student.group.clone(), student.class_desc.clone()))
            .or_default()
            .entry(student.section.clone())
            .or_default() += 1;
    }

    // 3. Um nó por (curso, série, turma, seção), já em ordem
    structure.class_nodes = structure
        .sections_by_desc
        .iter()
        .flat_map(|((major, group, desc), sections)| {
            sections.iter().map(move |(section, count)| {
                ClassNode::new(ClassKey::new(major.as_str(), group.as_str(), desc.as_str(), section.as_str()), *count)
            })
        })
        .collect();

    structure.majors = with_all_sentinel(structure.groups_by_major.keys().cloned());

    structure
}

type HierarchyMemo = (Arc<Vec<Student>>, Scope, Arc<ClassStructure>);

// Memoiza a última estrutura pela identidade da coleção + igualdade do escopo
#[derive(Default)]
pub struct HierarchyCache {
    last: Mutex<Option<HierarchyMemo>>,
}

impl HierarchyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, students: Option<&Arc<Vec<Student>>>, scope: &Scope) -> Arc<ClassStructure> {
        let Some(students) = students else {
            return Arc::new(ClassStructure::default());
        };

        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some((cached_students, cached_scope, structure)) = last.as_ref() {
            if Arc::ptr_eq(cached_students, students) && cached_scope == scope {
                return Arc::clone(structure);
            }
        }

        let structure = Arc::new(build_structure(students, scope));
        tracing::debug!(
            "Estrutura de turmas recalculada: {} aluno(s), {} turma(s)",
            structure.filtered_count(),
            structure.class_nodes.len()
        );
        *last = Some((Arc::clone(students), scope.clone(), Arc::clone(&structure)));
        structure
    }
}
