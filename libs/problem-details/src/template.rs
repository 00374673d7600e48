//! Title/detail templates.
//!
//! Placeholders are `{name}` or `{name.path.to.value}`; segments after the first
//! walk into nested JSON objects. `{{` and `}}` produce literal braces.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{ProblemError, ProblemResult};

/// Render `template` against `data`.
///
/// # Errors
/// Returns `ProblemError::MissingTemplateField` naming the first segment that
/// cannot be resolved, or `ProblemError::InvalidTemplate` for unbalanced or
/// empty braces.
pub fn format(template: &str, data: &IndexMap<String, Value>) -> ProblemResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
            continue;
        }
        if tail.starts_with('}') {
            return Err(invalid(template, "single '}' encountered"));
        }

        let Some(close) = tail.find('}') else {
            return Err(invalid(template, "unterminated '{'"));
        };
        let path = &tail[1..close];
        if path.is_empty() {
            return Err(invalid(template, "empty placeholder"));
        }
        if path.contains('{') {
            return Err(invalid(template, "unterminated '{'"));
        }

        match resolve(path, data)? {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn resolve<'a>(path: &str, data: &'a IndexMap<String, Value>) -> ProblemResult<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next().unwrap_or_default();
    let mut current = data.get(first).ok_or_else(|| missing(path, first))?;
    for segment in segments {
        current = current
            .as_object()
            .and_then(|obj| obj.get(segment))
            .ok_or_else(|| missing(path, segment))?;
    }
    Ok(current)
}

fn missing(path: &str, segment: &str) -> ProblemError {
    tracing::debug!(path, segment, "template field not found");
    ProblemError::MissingTemplateField {
        field: segment.to_owned(),
    }
}

fn invalid(template: &str, reason: &str) -> ProblemError {
    ProblemError::InvalidTemplate {
        template: template.to_owned(),
        reason: reason.to_owned(),
    }
}
