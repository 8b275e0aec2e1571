mod file;
mod memory;
mod state;

pub use file::{FileAuthMappingStore, FileIdentityProvider, FileMetadataStore};
pub use memory::{InMemoryAuthMappingStore, InMemoryIdentityProvider, InMemoryMetadataStore};
