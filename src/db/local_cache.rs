// src/db/local_cache.rs

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use crate::common::error::AppError;

/// Camada fina de persistência local (equivalente ao localStorage).
/// Sem TTL, sem expulsão.
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

// Chaves usadas pelo núcleo
pub fn active_role_key(principal_id: uuid::Uuid) -> String {
    format!("active_role:{}", principal_id)
}

pub fn academic_year_key(tenant_id: uuid::Uuid) -> String {
    format!("academic_year:{}", tenant_id)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ---
// 1. Em memória (testes e sessões efêmeras)
// ---
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---
// 2. Em arquivo JSON (sobrevive a recarregamentos do binário)
// ---
pub struct FileCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileCache {
    /// Abre o arquivo de cache. Se ele ainda não existe, começa vazio.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());

        // Reescreve o documento inteiro; o cache é pequeno
        let body = serde_json::to_string_pretty(&*entries)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}
