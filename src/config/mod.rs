//! Core schema and environment types
//!
//! This module contains the foundational types for resolution:
//! - `SettingSpec` - Declarative description of one key (kind, default, env var, constraints)
//! - `Schema` - Ordered, validated list of specs
//! - `EnvSource` / `Environment` - Where override values come from

mod schema;
mod types;

pub use schema::{
    IntRange, Schema, SchemaBuilder, SettingConstraints, SettingKind, SettingSpec, SettingValue,
};

pub use types::{EnvSource, Environment, ProcessEnv};
