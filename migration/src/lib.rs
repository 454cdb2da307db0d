use sea_orm_migration::prelude::*;

mod m2026_06_02_create_users;
mod m2026_06_02_000002_create_api_tokens;
mod m2026_06_14_create_recipes;
mod m2026_06_14_000002_create_tags;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        // keep order: users before the tables that reference them
        vec![
            Box::new(m2026_06_02_create_users::Migration),
            Box::new(m2026_06_02_000002_create_api_tokens::Migration),
            Box::new(m2026_06_14_create_recipes::Migration),
            Box::new(m2026_06_14_000002_create_tags::Migration),
        ]
    }
}
