use std::{path::Path, str::FromStr};

use anyhow::bail;
use indoc::indoc;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use std::fmt::Write;
use toml::Value;

use crate::Config;

/// Fields that may reference an unset environment variable; they are dropped instead of failing.
const OPTIONAL_ENV_FIELDS: &[&str] = &["mail.username", "mail.password"];

/// Check if the error is specifically about a missing environment variable
fn is_missing_env_var_error<E: std::fmt::Display>(err: &E) -> bool {
    let err_str = err.to_string().to_lowercase();

    err_str.contains("environment variable not found")
        || err_str.contains("env var")
        || (err_str.contains("variable") && err_str.contains("not found"))
}

/// Extract the path from an error message like "Failed to expand dynamic string at path 'path': error"
fn extract_path_from_error(error_message: &str) -> Option<&str> {
    let start = error_message.find("path '")? + "path '".len();
    let end = error_message[start..].find("':")?;

    Some(&error_message[start..start + end])
}

/// Remove a field from the TOML configuration by path
fn remove_field_from_config(config: &mut Value, path: &str) -> bool {
    let Some((parents, field)) = path.rsplit_once('.') else {
        return config.as_table_mut().and_then(|table| table.remove(path)).is_some();
    };

    let mut current = config;

    for part in parents.split('.') {
        let Some(value) = current.as_table_mut().and_then(|table| table.get_mut(part)) else {
            return false;
        };

        current = value;
    }

    let removed = current.as_table_mut().and_then(|table| table.remove(field)).is_some();

    if removed {
        log::debug!("Removed optional field '{path}' due to missing environment variable");
    }

    removed
}

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let mut raw_config: Value = toml::from_str(&content)?;

    // Each pass either succeeds or drops one optional field, so this terminates.
    loop {
        let mut expanded = raw_config.clone();

        let Err(err) = expand_dynamic_strings(&mut Vec::new(), &mut expanded) else {
            raw_config = expanded;
            break;
        };

        let err_str = err.to_string();

        let Some(field) = extract_path_from_error(&err_str) else {
            return Err(err);
        };

        if !OPTIONAL_ENV_FIELDS.contains(&field) || !is_missing_env_var_error(&err) {
            return Err(err);
        }

        if !remove_field_from_config(&mut raw_config, field) {
            return Err(err);
        }
    }

    let config = Config::deserialize(raw_config)?;
    validate_mail(&config)?;

    if config.auth.uses_default_credentials() {
        log::warn!("The operator login still uses the default admin/admin credentials. Set [auth] in the configuration.");
    }

    Ok(config)
}

pub(crate) fn validate_mail(config: &Config) -> anyhow::Result<()> {
    let sender = config.mail.sender.trim();

    if sender.is_empty() || !sender.contains('@') {
        bail!(indoc! {r#"
            No sender address configured. Mailgate needs a From address to deliver mail.

            Example configuration:

              [mail]
              host = "smtp.example.com"
              port = 587
              username = "{{ env.SMTP_USER }}"
              password = "{{ env.SMTP_PASS }}"
              sender = "Mailgate <noreply@example.com>"
        "#});
    }

    if config.mail.host.trim().is_empty() {
        bail!("The mail relay host must not be empty. Set host in [mail].");
    }

    Ok(())
}

fn expand_dynamic_strings<'a>(path: &mut Vec<Result<&'a str, usize>>, value: &'a mut Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(err) => {
                let mut p = String::new();
                for segment in path {
                    match segment {
                        Ok(s) => {
                            p.push_str(s);
                            p.push('.');
                        }
                        Err(i) => write!(p, "[{i}]")?,
                    }
                }
                if p.ends_with('.') {
                    p.pop();
                }

                bail!("Failed to expand dynamic string at path '{p}': {err}");
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}
