use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who holds a permission when nothing grants or denies it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionDefault {
    True,
    #[default]
    False,
    Op,
    NotOp,
}

impl PermissionDefault {
    pub fn value(self, is_op: bool) -> bool {
        match self {
            PermissionDefault::True => true,
            PermissionDefault::False => false,
            PermissionDefault::Op => is_op,
            PermissionDefault::NotOp => !is_op,
        }
    }
}

impl FromStr for PermissionDefault {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(PermissionDefault::True),
            "false" => Ok(PermissionDefault::False),
            "op" | "isop" | "operator" => Ok(PermissionDefault::Op),
            "not op" | "not-op" | "notop" | "!op" | "not_op" => Ok(PermissionDefault::NotOp),
            other => anyhow::bail!("Unknown permission default '{}'", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub name: String,
    pub default: PermissionDefault,
}

impl Permission {
    pub fn new(name: impl Into<String>, default: PermissionDefault) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("permission {0} is already registered")]
    AlreadyRegistered(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait PermissionRegistry: Send + Sync {
    fn get_permission(&self, name: &str) -> Option<Permission>;

    /// Fails when the name is already registered.
    fn add_permission(&self, permission: Permission) -> Result<(), PermissionError>;

    /// Returns whether a registration was removed.
    fn remove_permission(&self, name: &str) -> bool;
}

/// Registers `name` with `default`, replacing any earlier registration.
pub fn add_default_permission(
    registry: &dyn PermissionRegistry,
    name: &str,
    default: PermissionDefault,
) -> Result<()> {
    if registry.get_permission(name).is_some() {
        registry.remove_permission(name);
        debug!("Replacing existing registration of {}", name);
    }
    registry.add_permission(Permission::new(name, default))?;
    Ok(())
}

/// In-memory permission registry.
#[derive(Debug, Default)]
pub struct PermissionManager {
    permissions: RwLock<HashMap<String, Permission>>,
}

impl PermissionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default outcome for a holder without explicit grants. Unregistered
    /// permissions belong to operators only.
    pub fn resolve(&self, name: &str, is_op: bool) -> bool {
        match self.get_permission(name) {
            Some(permission) => permission.default.value(is_op),
            None => is_op,
        }
    }
}

impl PermissionRegistry for PermissionManager {
    fn get_permission(&self, name: &str) -> Option<Permission> {
        self.permissions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn add_permission(&self, permission: Permission) -> Result<(), PermissionError> {
        let mut permissions = self
            .permissions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if permissions.contains_key(&permission.name) {
            return Err(PermissionError::AlreadyRegistered(permission.name));
        }
        permissions.insert(permission.name.clone(), permission);
        Ok(())
    }

    fn remove_permission(&self, name: &str) -> bool {
        self.permissions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }
}
