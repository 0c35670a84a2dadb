//! Personnel records: identities, their profiles, and the status and
//! department lookup tables profiles point at.
//!
//! All access goes through [`Engine`], which owns the database connection and
//! runs the identity lifecycle hooks that keep profiles in step with identity
//! records.

pub use admin::{
    AdminConfig, AdminListing, Cell, DEPARTMENT_ADMIN, EMPTY_VALUE_DISPLAY, IDENTITY_ADMIN,
    PROFILE_ADMIN, ProfileListItem, REGISTRY, STATUS_ADMIN,
};
pub use avatar::{DEFAULT_AVATAR, MediaStore, avatar_path};
pub use departments::{DepartmentInput, UserDepartment};
pub use error::{EngineError, FieldErrors};
pub use hooks::{IdentityEvent, IdentityHook};
pub use ops::{Engine, EngineBuilder, ProfilePage, ProfileQuery};
pub use phone::PhoneRegion;
pub use profiles::{ProfileInput, UserProfile};
pub use statuses::{StatusInput, UserStatus};
pub use users::{Identity, IdentityInput};

pub mod admin;
mod avatar;
mod departments;
mod error;
mod hooks;
mod ops;
mod phone;
mod profiles;
mod statuses;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
