// src/model/mod.rs

//! Core data model: incoming package entities and installed-state records

pub mod entity;
pub mod installed;

pub use entity::{
    BaseEntity, ContainerKind, DataSource, ModuleEntity, PackageEntity, SplitEntity,
};
pub use installed::{InstalledInfo, InstalledStateResolver, SnapshotResolver};
