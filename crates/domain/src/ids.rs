use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a user record.
    UserId
);
uuid_identifier!(
    /// Unique identifier for an organization unit.
    OrganizationUnitId
);
uuid_identifier!(
    /// Unique identifier for a role.
    RoleId
);
uuid_identifier!(
    /// Unique identifier for a named permission.
    PermissionId
);
uuid_identifier!(
    /// Unique identifier for a user-unit-role assignment.
    AssignmentId
);
uuid_identifier!(
    /// Unique identifier for an ERP module.
    ModuleId
);
uuid_identifier!(
    /// Unique identifier for a submodule inside a module.
    SubmoduleId
);
uuid_identifier!(
    /// Unique identifier for a dynamic form.
    FormId
);
