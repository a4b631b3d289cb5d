//! `.env` support for the binary: `KEY=value` lines, `#` comments, optional
//! `export ` prefix, single quotes (literal) and double quotes (with escapes).

use std::path::Path;

/// Parse a whole `.env` document. Errors are prefixed with the 1-based line number.
pub fn parse(contents: &str) -> Result<Vec<(String, String)>, String> {
    let mut vars = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if let Some(pair) = parse_line(line).map_err(|e| format!("line {}: {}", index + 1, e))? {
            vars.push(pair);
        }
    }
    Ok(vars)
}

/// Load `path` into the process environment. Variables that are already set win.
/// Returns how many variables were applied.
pub fn load(path: &Path) -> Result<usize, String> {
    let contents = std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let vars = parse(&contents).map_err(|e| format!("{}: {}", path.display(), e))?;

    let mut applied = 0;
    for (key, value) in vars {
        if std::env::var_os(&key).is_none() {
            // Mutating the process environment is unsafe on some targets; done before any threads start.
            unsafe {
                std::env::set_var(&key, value);
            }
            applied += 1;
        }
    }
    Ok(applied)
}

fn parse_line(line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let assignment = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);

    let (key, raw_value) = assignment
        .split_once('=')
        .ok_or_else(|| "missing '=' in assignment".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("environment variable name cannot be empty".to_string());
    }
    if key.chars().any(char::is_whitespace) {
        return Err(format!("environment variable name contains whitespace: {}", key));
    }

    Ok(Some((key.to_string(), parse_value(raw_value.trim())?)))
}

fn parse_value(raw: &str) -> Result<String, String> {
    let mut chars = raw.chars();
    let quote = match chars.next() {
        None => return Ok(String::new()),
        Some(q @ ('"' | '\'')) => q,
        Some(_) => {
            let unquoted = raw.split_once('#').map(|(v, _)| v).unwrap_or(raw);
            return Ok(unquoted.trim_end().to_string());
        }
    };

    let mut value = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if quote == '"' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "unterminated escape sequence in double-quoted value".to_string())?;
                value.push(match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    other => other,
                });
            }
            c if c == quote => {
                let rest = chars.as_str().trim();
                return if rest.is_empty() || rest.starts_with('#') {
                    Ok(value)
                } else {
                    Err(format!("unexpected characters after closing {} quote", quote_name(quote)))
                };
            }
            other => value.push(other),
        }
    }
    Err(format!("unterminated {}-quoted value", quote_name(quote)))
}

fn quote_name(quote: char) -> &'static str {
    if quote == '"' { "double" } else { "single" }
}
