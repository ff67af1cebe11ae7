use std::sync::Arc;

use gridrights_application::{EditorRegistry, SubjectDirectoryService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub editor_registry: Arc<EditorRegistry>,
    pub subject_directory_service: SubjectDirectoryService,
}
