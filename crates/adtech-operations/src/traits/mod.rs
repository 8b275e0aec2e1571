mod auth_mapping_store;
mod identity_provider;
mod metadata_store;

pub use auth_mapping_store::AuthMappingStore;
pub use identity_provider::IdentityRoleProvider;
pub use metadata_store::TenantMetadataStore;
