//! Business logic layer

pub mod categories;
pub mod equipment;
pub mod extensions;
pub mod fines;
pub mod loans;
pub mod returns;
pub mod sweeper;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

/// All services bundled for the application state
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub categories: categories::CategoriesService,
    pub equipment: equipment::EquipmentService,
    pub loans: loans::LoansService,
    pub extensions: extensions::ExtensionsService,
    pub returns: returns::ReturnsService,
    pub sweeper: sweeper::SweeperService,
}

impl Services {
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), config.auth.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), config.loans.clone()),
            extensions: extensions::ExtensionsService::new(
                repository.clone(),
                config.loans.clone(),
            ),
            returns: returns::ReturnsService::new(repository.clone()),
            sweeper: sweeper::SweeperService::new(repository, config.loans.clone()),
        }
    }
}
