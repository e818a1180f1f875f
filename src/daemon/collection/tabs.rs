use std::collections::HashMap;

use crate::daemon::protocol::TabId;

/// Last known URL of every tab the extension told us about. Answers tab lookups synchronously.
#[derive(Debug, Default)]
pub struct TabRegistry {
    urls: HashMap<TabId, String>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, tab_id: TabId, url: &str) {
        self.urls.insert(tab_id, url.to_owned());
    }

    pub fn forget(&mut self, tab_id: TabId) {
        self.urls.remove(&tab_id);
    }

    pub fn url_of(&self, tab_id: TabId) -> Option<&str> {
        self.urls.get(&tab_id).map(String::as_str)
    }
}
