//! Repository implementations of the tenantry interfaces

pub mod tenant_directory;
