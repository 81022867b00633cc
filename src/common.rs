// src/common.rs

pub mod error;
pub use error::AppError;
pub mod notify;
pub use notify::{Notification, Notifier, Severity, TracingNotifier};
