//! Owner-only access control.
//!
//! Every owned entity names the attribute that identifies its owner by
//! implementing [`Owned`]; handlers then call [`ensure_owner`] once, before
//! touching anything, instead of repeating the comparison per entity type.

use crate::error::CoreError;
use crate::types::DbId;

/// An entity that belongs to exactly one user.
pub trait Owned {
    /// Entity name used in error messages and logs (e.g. `"Blueprint"`).
    const ENTITY: &'static str;

    /// Primary key of the entity itself.
    fn id(&self) -> DbId;

    /// Id of the user allowed to modify the entity.
    fn owner_id(&self) -> DbId;

    /// Whether `user_id` owns this entity.
    fn is_owned_by(&self, user_id: DbId) -> bool {
        self.owner_id() == user_id
    }
}

/// Refuse with [`CoreError::Forbidden`] unless `actor` owns `entity`.
pub fn ensure_owner<T: Owned>(entity: &T, actor: DbId) -> Result<(), CoreError> {
    if entity.is_owned_by(actor) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "You are not allowed to modify this {}",
            T::ENTITY.to_lowercase()
        )))
    }
}
