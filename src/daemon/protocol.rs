//! Messages exchanged with the browser extension. Both directions are one JSON object per line,
//! tagged by `type`.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::storage::store::StoreChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdleState {
    Active,
    Idle,
    Locked,
}

impl IdleState {
    /// Locked screens count as idle.
    pub fn is_idle(&self) -> bool {
        matches!(self, IdleState::Idle | IdleState::Locked)
    }
}

/// Signals forwarded by the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BrowserEvent {
    TabActivated {
        tab_id: TabId,
        #[serde(default)]
        url: Option<String>,
    },
    /// `url` is only present when the navigation changed it.
    TabUpdated {
        tab_id: TabId,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        active: bool,
    },
    TabRemoved {
        tab_id: TabId,
    },
    WindowFocusChanged {
        focused: bool,
    },
    IdleStateChanged {
        state: IdleState,
    },
    GenerateWeeklyReport,
}

/// Everything that goes through the host's event queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Browser(BrowserEvent),
    WeeklyAlarm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_message: Option<String>,
}

/// Messages sent back to the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostMessage {
    SetBadge {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Notify(Notification),
    SetIdleDetectionInterval {
        seconds: u32,
    },
    StorageChanged(StoreChange),
}
