//! Environment variable credential lookup.
//!
//! The AI bearer credential is read once at startup. An absent, empty, or
//! non-Unicode variable means "no credential" and puts private chats in
//! canned mode.

use secrecy::SecretString;

/// Read the credential stored in the environment variable `var_name`.
///
/// Returns `None` when the variable is unset, blank, or not valid Unicode.
pub fn resolve_api_key(var_name: &str) -> Option<SecretString> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val)),
        Ok(_) => {
            tracing::debug!(var = var_name, "Credential variable is empty");
            None
        }
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => {
            // Exists but unusable as a header value; treat as not found.
            tracing::warn!(var = var_name, "Credential variable is not valid Unicode, ignoring");
            None
        }
    }
}
