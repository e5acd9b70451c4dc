//! Validation for `[contexts.*]` entries.

use crate::schema::ScenecastConfig;

/// Validate context names and time ranges.
pub(crate) fn validate_contexts(errors: &mut Vec<String>, config: &ScenecastConfig) {
    for (name, entry) in &config.contexts {
        if name.trim().is_empty() {
            errors.push("contexts: context name must not be blank".to_string());
        }

        if let (Some(start), Some(end)) = (entry.start, entry.end) {
            if start > end {
                errors.push(format!(
                    "contexts.{name}: start ({start}) is after end ({end})"
                ));
            }
        }
    }
}
