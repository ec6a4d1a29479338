//! Lifecycle event names and their dispatch modes.

use serde::{Deserialize, Serialize};

/// How handlers for an event are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Each handler receives the previous handler's output; the last output
    /// is the result.
    Chain,
    /// Every handler receives the original payload; outputs are gathered in
    /// handler order.
    Collect,
}

impl DispatchMode {
    /// The mode used for an event name. Names outside [`HookPoint`] collect.
    pub fn for_event(event: &str) -> Self {
        HookPoint::parse(event)
            .map(|hook| hook.mode())
            .unwrap_or(Self::Collect)
    }
}

/// Lifecycle events raised by the page service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Before a page is persisted. Payload: page data object.
    BeforePageSave,
    /// Page-save transform run after `before_page_save`. Payload: page data object.
    OnPageSave,
    /// After a page was persisted. Payload: stored page.
    AfterPageSave,
    /// After a page was rendered. Payload: markup string, context: page.
    AfterPageRender,
    /// Export transform run after `after_page_render`. Payload: markup string, context: page.
    OnPageExport,
    /// After a page was deleted. Payload: deleted page.
    AfterPageDelete,
}

impl HookPoint {
    /// Every known hook point.
    pub const ALL: [HookPoint; 6] = [
        Self::BeforePageSave,
        Self::OnPageSave,
        Self::AfterPageSave,
        Self::AfterPageRender,
        Self::OnPageExport,
        Self::AfterPageDelete,
    ];

    /// Returns the string name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforePageSave => "before_page_save",
            Self::OnPageSave => "on_page_save",
            Self::AfterPageSave => "after_page_save",
            Self::AfterPageRender => "after_page_render",
            Self::OnPageExport => "on_page_export",
            Self::AfterPageDelete => "after_page_delete",
        }
    }

    /// Parse an event name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hook| hook.as_str() == name)
    }

    /// The dispatch mode this event always uses.
    pub fn mode(&self) -> DispatchMode {
        match self {
            Self::BeforePageSave | Self::OnPageSave | Self::AfterPageRender | Self::OnPageExport => {
                DispatchMode::Chain
            }
            Self::AfterPageSave | Self::AfterPageDelete => DispatchMode::Collect,
        }
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for hook in HookPoint::ALL {
            assert_eq!(HookPoint::parse(hook.as_str()), Some(hook));
        }
        assert_eq!(HookPoint::parse("before_login"), None);
    }

    #[test]
    fn test_modes() {
        assert_eq!(DispatchMode::for_event("before_page_save"), DispatchMode::Chain);
        assert_eq!(DispatchMode::for_event("on_page_export"), DispatchMode::Chain);
        assert_eq!(DispatchMode::for_event("after_page_save"), DispatchMode::Collect);
        assert_eq!(DispatchMode::for_event("custom_event"), DispatchMode::Collect);
    }
}
