// src/models.rs

pub mod auth;
pub mod dashboard;
pub mod rbac;
pub mod school;
pub mod scope;
pub mod tenancy;
