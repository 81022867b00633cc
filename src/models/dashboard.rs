// src/models/dashboard.rs

use serde::{Deserialize, Serialize};

use crate::models::scope::ClassKey;

// 1. Contadores agregados do ano letivo (os Cards do Topo)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounters {
    pub total_students: u64,
    pub total_staff: u64,
    pub total_classes: u64,
    pub total_subjects: u64,
}

// 2. Nó derivado da estrutura de turmas (nunca persistido)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassNode {
    pub key: ClassKey,
    pub display_name: String,
    pub student_count: usize,
}

impl ClassNode {
    pub fn new(key: ClassKey, student_count: usize) -> Self {
        let display_name = display_name_for(&key);
        Self { key, display_name, student_count }
    }
}

// "XI IPA 2" (seção vazia some do nome)
fn display_name_for(key: &ClassKey) -> String {
    [key.group.as_str(), key.class_desc.as_str(), key.section.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_skips_empty_parts() {
        let node = ClassNode::new(ClassKey::new("Science", "XI", "IPA", "2"), 3);
        assert_eq!(node.display_name, "XI IPA 2");

        let node = ClassNode::new(ClassKey::new("Science", "X", "IPA", ""), 1);
        assert_eq!(node.display_name, "X IPA");
    }
}
