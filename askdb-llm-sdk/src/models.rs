//! Model catalog
//!
//! Display names offered to users and the provider model ids they resolve to.

/// Claude model constants
pub mod claude {
    /// Claude Sonnet 4.5
    pub const SONNET_4_5_ID: &str = "claude-sonnet-4-5-20250929";
    pub const SONNET_4_5_NAME: &str = "Claude Sonnet 4.5";

    /// Claude Haiku 4.5
    pub const HAIKU_4_5_ID: &str = "claude-haiku-4-5-20251001";
    pub const HAIKU_4_5_NAME: &str = "Claude Haiku 4.5";

    /// Claude 3 Sonnet (legacy)
    pub const SONNET_3_ID: &str = "claude-3-sonnet-20240229";
    pub const SONNET_3_NAME: &str = "Claude 3 Sonnet";

    /// Claude 3 Haiku (legacy)
    pub const HAIKU_3_ID: &str = "claude-3-haiku-20240307";
    pub const HAIKU_3_NAME: &str = "Claude 3 Haiku";

    pub const DEFAULT_ID: &str = SONNET_4_5_ID;
}

/// Every known (display name, model id) pair
pub const CATALOG: &[(&str, &str)] = &[
    (claude::SONNET_4_5_NAME, claude::SONNET_4_5_ID),
    (claude::HAIKU_4_5_NAME, claude::HAIKU_4_5_ID),
    (claude::SONNET_3_NAME, claude::SONNET_3_ID),
    (claude::HAIKU_3_NAME, claude::HAIKU_3_ID),
];

/// Resolve a display name to a model id
///
/// Unknown names are assumed to already be raw model ids and pass through.
pub fn resolve_model(name: &str) -> &str {
    let name = name.trim();
    CATALOG
        .iter()
        .find(|(display, _)| display.eq_ignore_ascii_case(name))
        .map(|(_, id)| *id)
        .unwrap_or(name)
}
