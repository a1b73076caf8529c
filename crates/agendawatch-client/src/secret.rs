//! Secret references in the watcher config.
//!
//! Credential values can point at secrets stored elsewhere instead of
//! holding them in plain text:
//!
//! ```text
//! PASSWORD=pass::school/platform
//! BOT_TOKEN=env::AGENDAWATCH_BOT_TOKEN
//! USER_ID=env::AGENDAWATCH_CHAT_ID
//! ```
//!
//! `USER_ID` is a chat id, not a secret, so the password store is not
//! accepted for it.

/// Config keys that may not be read from the password store.
const INLINE_ONLY_KEYS: [&str; 1] = ["USER_ID"];

/// Resolves the value of config `key`, expanding a secret reference.
///
/// `pass::path` takes the first line of `pass show path`, `env::VAR` reads
/// `$VAR`, and anything else is returned unchanged. Resolved values lose
/// trailing whitespace, as inline values do when the file is parsed.
pub fn resolve(key: &str, value: &str) -> Result<String, String> {
    let resolved = if let Some(path) = value.strip_prefix("pass::") {
        if INLINE_ONLY_KEYS.contains(&key) {
            return Err(format!(
                "{} is a chat id; set it inline or with env::",
                key
            ));
        }
        from_password_store(key, path)?
    } else if let Some(var) = value.strip_prefix("env::") {
        from_env(key, var)?
    } else {
        return Ok(value.to_string());
    };
    Ok(resolved.trim_end().to_string())
}

fn from_password_store(key: &str, path: &str) -> Result<String, String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("{}: cannot run `pass show {}`: {}", key, path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{}: `pass show {}` exited with {}: {}",
            key,
            path,
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("{}: password store entry `{}` is empty", key, path))
}

fn from_env(key: &str, var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("{}: environment variable `{}` is not set", key, var))
}
