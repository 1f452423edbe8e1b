//! Persistence seam. Each domain declares its own repository trait next to
//! its SQL; [`Store`] is the union the handlers depend on.

use sqlx::PgPool;

use crate::auth::repo::UserRepo;
use crate::locations::repo::LocationRepo;
use crate::sets::repo::SetRepo;

#[cfg(test)]
pub mod memory;

pub trait Store: UserRepo + LocationRepo + SetRepo {}

impl<T> Store for T where T: UserRepo + LocationRepo + SetRepo {}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}
