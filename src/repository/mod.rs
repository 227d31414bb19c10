//! Repository layer for database operations

pub mod activity;
pub mod categories;
pub mod equipment;
pub mod extensions;
pub mod loans;
pub mod returns;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub categories: categories::CategoriesRepository,
    pub equipment: equipment::EquipmentRepository,
    pub loans: loans::LoansRepository,
    pub extensions: extensions::ExtensionsRepository,
    pub returns: returns::ReturnsRepository,
    pub activity: activity::ActivityRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            extensions: extensions::ExtensionsRepository::new(pool.clone()),
            returns: returns::ReturnsRepository::new(pool.clone()),
            activity: activity::ActivityRepository::new(pool.clone()),
            pool,
        }
    }
}
