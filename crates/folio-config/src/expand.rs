//! `${VAR}` and `${VAR:-default}` expansion in config values.

use std::env::{self, VarError};

use crate::ConfigError;

/// Expand `${VAR}` references in `value`. `field` names the setting in errors.
///
/// A variable that is unset (or not UTF-8) and has no default is an error.
/// `$VAR` without braces is left alone.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| env::var(name).map(Some);
    match shellexpand::env_with_context(value, lookup) {
        Ok(expanded) => Ok(expanded.into_owned()),
        Err(e) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: describe(&e.var_name, &e.cause),
        }),
    }
}

fn describe(var: &str, cause: &VarError) -> String {
    match cause {
        VarError::NotPresent => format!("${{{var}}} not set"),
        VarError::NotUnicode(_) => format!("${{{var}}} is not valid UTF-8"),
    }
}
