//! Installed system-menu title identity.

use async_trait::async_trait;

/// Source of the "which system menu is installed" signal.
#[async_trait]
pub trait TitleIdentity: Send + Sync {
    /// Title id of the installed system menu, if the platform knows it.
    async fn installed_menu_title(&self) -> Option<u64>;
}

/// Host implementation: the id comes from configuration. A console backend
/// would query the system application registry instead.
pub struct ConfiguredTitle {
    id: Option<u64>,
}

impl ConfiguredTitle {
    pub fn new(id: Option<u64>) -> Self {
        Self { id }
    }
}

#[async_trait]
impl TitleIdentity for ConfiguredTitle {
    async fn installed_menu_title(&self) -> Option<u64> {
        self.id
    }
}
