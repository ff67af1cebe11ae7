//! Infrastructure adapters for the rights matrix editor.

#![forbid(unsafe_code)]

mod envelope;
mod http_rights_gateway;
mod http_subject_directory;
mod in_memory_rights_gateway;
mod in_memory_subject_directory;
mod static_permission_probe;

pub use http_rights_gateway::HttpRightsGateway;
pub use http_subject_directory::HttpSubjectDirectory;
pub use in_memory_rights_gateway::InMemoryRightsGateway;
pub use in_memory_subject_directory::InMemorySubjectDirectory;
pub use static_permission_probe::StaticPermissionProbe;
