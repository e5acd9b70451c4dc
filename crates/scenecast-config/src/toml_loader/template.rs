//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# scenecast configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[presence]
# client_id = 0              # application id registered with the presence service
# auto_context_sync = true   # derive presence whenever a context activates
# idle_state = "Idle"        # state text shown for contexts without an entry
# tick_interval_ms = 16      # 1-1000

[logging]
# level = "INFO"             # TRACE, DEBUG, INFO, WARNING, ERROR

# One table per context name. Names are matched exactly (case-sensitive).
# Every field is optional; omitted fields are not shown.
#
# [contexts.Menu]
# state = "In Menu"
# details = "Choosing a mode"
# start = 1700000000         # epoch seconds
# end = 1700003600
# large_image = "logo"
# large_text = "scenecast"
# small_image = "menu"
# small_text = "Main menu"
"##
    .to_string()
}
