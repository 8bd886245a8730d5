//! Environment variable helpers.
//!
//! All runtime configuration comes from the environment. Invalid values are
//! logged at warn level and replaced by the default instead of aborting.

/// Parse an environment variable with a default fallback.
///
/// Unset variables return `default` silently. Set-but-unparseable values
/// log a warning and return `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Read a string variable, treating unset and blank values alike.
#[must_use]
pub fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Read a string variable or fall back to `default`.
#[must_use]
pub fn env_or(var: &str, default: &str) -> String {
    env_non_empty(var).unwrap_or_else(|| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    // SAFETY (all tests): each test owns a unique variable name.
    fn set(var: &str, value: &str) {
        unsafe { std::env::set_var(var, value) };
    }

    fn unset(var: &str) {
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn test_env_parse_valid_value() {
        let var_name = "TRIPDESK_TEST_PARSE_VALID_41801";
        set(var_name, "42");
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_trims_whitespace() {
        let var_name = "TRIPDESK_TEST_PARSE_TRIM_41802";
        set(var_name, " 7 ");
        let result: u64 = env_parse_with_default(var_name, 1);
        assert_eq!(result, 7);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var_name = "TRIPDESK_TEST_PARSE_INVALID_41803";
        set(var_name, "ninety");
        let result: u32 = env_parse_with_default(var_name, 90);
        assert_eq!(result, 90);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_missing_var() {
        let var_name = "TRIPDESK_TEST_PARSE_MISSING_41804";
        unset(var_name);
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_non_empty_blank_is_none() {
        let var_name = "TRIPDESK_TEST_NON_EMPTY_41805";
        set(var_name, "   ");
        assert_eq!(env_non_empty(var_name), None);
        set(var_name, " value ");
        assert_eq!(env_non_empty(var_name).as_deref(), Some("value"));
        unset(var_name);
    }

    #[test]
    fn test_env_or_default() {
        let var_name = "TRIPDESK_TEST_ENV_OR_41806";
        unset(var_name);
        assert_eq!(env_or(var_name, "fallback"), "fallback");
    }
}
