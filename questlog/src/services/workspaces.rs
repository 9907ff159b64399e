use std::sync::Arc;

use crate::error::{QuestlogError, Result};
use crate::models::{DatabaseKind, UserRecord};
use crate::store::{AdminStore, WorkspaceConnector, WorkspaceStore};

/// A registered user together with a store opened on their workspace.
pub struct UserWorkspace {
    pub user: UserRecord,
    pub store: Arc<dyn WorkspaceStore>,
}

impl UserWorkspace {
    pub fn database(&self, kind: DatabaseKind) -> Result<&str> {
        self.user.database_ids.require(kind)
    }
}

/// Resolves users through the admin registry and opens their workspaces.
#[derive(Clone)]
pub struct Workspaces {
    admin: Arc<dyn AdminStore>,
    connector: Arc<dyn WorkspaceConnector>,
}

impl Workspaces {
    pub fn new(admin: Arc<dyn AdminStore>, connector: Arc<dyn WorkspaceConnector>) -> Self {
        Self { admin, connector }
    }

    pub fn admin(&self) -> &dyn AdminStore {
        self.admin.as_ref()
    }

    pub fn connect(&self, api_key: &str) -> Result<Arc<dyn WorkspaceStore>> {
        self.connector.connect(api_key)
    }

    pub async fn open(&self, name: &str) -> Result<UserWorkspace> {
        let user = self
            .admin
            .get_user(name)
            .await?
            .ok_or_else(|| QuestlogError::NotFound(format!("User {name} not found")))?;
        let store = self.connector.connect(user.require_api_key()?)?;
        Ok(UserWorkspace { user, store })
    }
}
