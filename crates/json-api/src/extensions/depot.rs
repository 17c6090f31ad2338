//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use storefront_app::domain::users::records::UserUuid;

use crate::identity::{Identity, Role};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_identity(&mut self, identity: Identity);

    /// The authenticated user.
    fn user_or_401(&self) -> Result<UserUuid, StatusError>;

    /// The authenticated user, who must be an admin.
    fn admin_or_403(&self) -> Result<UserUuid, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_identity(&mut self, identity: Identity) {
        self.inject(identity);
    }

    fn user_or_401(&self) -> Result<UserUuid, StatusError> {
        self.obtain::<Identity>()
            .map(|identity| identity.user)
            .map_err(|_ignored| StatusError::unauthorized())
    }

    fn admin_or_403(&self) -> Result<UserUuid, StatusError> {
        let identity = self
            .obtain::<Identity>()
            .map_err(|_ignored| StatusError::unauthorized())?;

        if identity.role != Role::Admin {
            return Err(StatusError::forbidden().brief("Admin access required"));
        }

        Ok(identity.user)
    }
}
