//! Application state shared across handlers

use sqlx::PgPool;

use crate::{
    jwt::JwtService,
    repositories::{CompanyRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub company_repository: CompanyRepository,
}

impl AppState {
    /// Build the state and its repositories around one pool
    pub fn new(db_pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            user_repository: UserRepository::new(db_pool.clone()),
            company_repository: CompanyRepository::new(db_pool),
            jwt_service,
        }
    }
}
