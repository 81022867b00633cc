// src/services/tier_state.rs

use std::fmt::Debug;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierStatus {
    Idle,
    Loading,
    Ready,
}

/// Máquina de estados de uma camada: idle -> loading -> ready.
///
/// `desired` é a chave de dependência capturada no disparo; `data_key` é a
/// chave que produziu `data`. Um resultado só é aceito se a chave capturada
/// ainda for a desejada.
#[derive(Debug, Clone)]
pub struct TierState<K, T> {
    status: TierStatus,
    desired: Option<K>,
    data: Option<T>,
    data_key: Option<K>,
    last_error: Option<String>,
}

impl<K, T> Default for TierState<K, T> {
    fn default() -> Self {
        Self {
            status: TierStatus::Idle,
            desired: None,
            data: None,
            data_key: None,
            last_error: None,
        }
    }
}

impl<K, T> TierState<K, T>
where
    K: Clone + PartialEq + Debug,
    T: Clone,
{
    pub fn status(&self) -> TierStatus {
        self.status
    }

    pub fn desired(&self) -> Option<&K> {
        self.desired.as_ref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_key(&self) -> Option<&K> {
        self.data_key.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == TierStatus::Loading
    }

    /// Já concluiu ao menos uma carga (e não foi resetada desde então).
    pub fn has_completed(&self) -> bool {
        self.data_key.is_some()
    }

    /// Pronta e com dados produzidos exatamente por `key`.
    pub fn is_ready_for(&self, key: &K) -> bool {
        self.status == TierStatus::Ready && self.data_key.as_ref() == Some(key)
    }

    pub fn is_current(&self, key: &K) -> bool {
        self.desired.as_ref() == Some(key)
    }

    /// Precisa disparar para `key`? Não, se já está carregando para a mesma
    /// chave ou se os dados publicados vieram dela. Uma falha que manteve
    /// dados de outra chave ainda precisa de nova tentativa.
    pub fn needs_load(&self, key: &K) -> bool {
        match self.status {
            TierStatus::Idle => true,
            TierStatus::Loading => !self.is_current(key),
            TierStatus::Ready => !self.is_current(key) || self.data_key.as_ref() != Some(key),
        }
    }

    /// Qualquer estado -> loading, capturando a nova chave desejada.
    /// Os dados anteriores continuam disponíveis até o resultado chegar.
    pub fn begin(&mut self, key: K) {
        self.desired = Some(key);
        self.status = TierStatus::Loading;
    }

    /// loading -> ready. Devolve `false` (e não toca em nada) se a chave
    /// capturada não é mais a desejada.
    pub fn settle_ok(&mut self, key: K, data: T) -> bool {
        if !self.is_current(&key) {
            return false;
        }
        self.data = Some(data);
        self.data_key = Some(key);
        self.last_error = None;
        self.status = TierStatus::Ready;
        true
    }

    /// loading -> ready (mantém o último valor bom) ou idle (primeira carga).
    /// Devolve `false` se o resultado é obsoleto.
    pub fn settle_err(&mut self, key: &K, message: String) -> bool {
        if !self.is_current(key) {
            return false;
        }
        self.last_error = Some(message);
        self.status = if self.data.is_some() {
            TierStatus::Ready
        } else {
            TierStatus::Idle
        };
        true
    }

    /// Dependência de cima indisponível: volta para idle e esquece tudo.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
