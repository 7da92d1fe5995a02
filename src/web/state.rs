use std::sync::Arc;

use crate::auth::PrincipalResolver;
use crate::editor::Editors;
use crate::persist::EntityStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub resolver: Arc<dyn PrincipalResolver>,
    pub editors: Arc<Editors>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, resolver: Arc<dyn PrincipalResolver>) -> Self {
        Self {
            store,
            resolver,
            editors: Arc::new(Editors::standard()),
        }
    }

    pub fn with_editors(mut self, editors: Editors) -> Self {
        self.editors = Arc::new(editors);
        self
    }
}
