use std::collections::{HashMap, HashSet};

use ergon_core::{AppError, AppResult, NonEmptyString, OrganizationId};
use serde::{Deserialize, Serialize};

use crate::OrganizationUnitId;

/// Node in an organization's unit hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUnit {
    id: OrganizationUnitId,
    organization_id: OrganizationId,
    name: NonEmptyString,
    parent_id: Option<OrganizationUnitId>,
    is_active: bool,
}

impl OrganizationUnit {
    /// Creates a validated organization unit.
    pub fn new(
        id: OrganizationUnitId,
        organization_id: OrganizationId,
        name: impl Into<String>,
        parent_id: Option<OrganizationUnitId>,
        is_active: bool,
    ) -> AppResult<Self> {
        if parent_id == Some(id) {
            return Err(AppError::Validation(format!(
                "organization unit '{id}' cannot be its own parent"
            )));
        }

        Ok(Self {
            id,
            organization_id,
            name: NonEmptyString::new(name)?,
            parent_id,
            is_active,
        })
    }

    /// Returns the unit identifier.
    #[must_use]
    pub fn id(&self) -> OrganizationUnitId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the unit name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the parent unit, if any.
    #[must_use]
    pub fn parent_id(&self) -> Option<OrganizationUnitId> {
        self.parent_id
    }

    /// Returns whether the unit is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Validates that attaching `candidate` to the existing units keeps the hierarchy a tree.
///
/// The parent must exist, belong to the same organization, and must not be a
/// descendant of the candidate.
pub fn validate_unit_placement(
    existing: &HashMap<OrganizationUnitId, OrganizationUnit>,
    candidate: &OrganizationUnit,
) -> AppResult<()> {
    let Some(parent_id) = candidate.parent_id() else {
        return Ok(());
    };

    let mut visited = HashSet::from([candidate.id()]);
    let mut cursor = Some(parent_id);

    while let Some(current_id) = cursor {
        let current = existing.get(&current_id).ok_or_else(|| {
            AppError::NotFound(format!("organization unit '{current_id}' does not exist"))
        })?;

        if current.organization_id() != candidate.organization_id() {
            return Err(AppError::Validation(format!(
                "organization unit '{}' cannot be placed under unit '{}' of another organization",
                candidate.id(),
                current_id
            )));
        }

        if !visited.insert(current_id) {
            return Err(AppError::Conflict(format!(
                "placing organization unit '{}' under '{}' would create a cycle",
                candidate.id(),
                parent_id
            )));
        }

        cursor = current.parent_id();
    }

    Ok(())
}
