//! SeaORM entities

pub mod tenant_database_info;

pub use tenant_database_info::Entity as TenantDatabaseInfo;
