// Detection and rewriting of serialized-object fragments leaked into
// narrative text. A fragment is found by a balanced-delimiter scan and
// rewritten into plain `Key: value.` sentences; markdown fences and
// residual delimiter pairs are stripped. Rewritten output contains no
// braces or quoted keys, so the pass is idempotent.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Quoted-key / quoted-or-bare-value pair, for fragments that are not
/// valid JSON and for pairs leaked outside any delimiter.
static KEY_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([A-Za-z0-9_ .\-]+)"\s*:\s*(?:"([^"]*)"|([^,;{}\[\]\n]+))"#).unwrap()
});

/// Markdown code fence line (``` or ```lang), alone on its line.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*```[a-zA-Z]*\s*$").unwrap());

/// True when the text still contains serialization artifacts a narrative
/// field must not carry.
pub fn has_artifacts(text: &str) -> bool {
    text.contains('{')
        || text.contains('}')
        || text.contains("```")
        || KEY_VALUE_RE.is_match(text)
}

/// Remove markdown fence lines only, leaving the fenced content intact.
/// For callers that still want to parse the interior as JSON.
pub fn strip_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").trim().to_string()
}

/// Rewrite every serialized fragment in `text` into plain sentences and
/// strip fences and residual delimiters. Text without artifacts passes
/// through unchanged apart from whitespace collapsing around removals.
pub fn rewrite_fragments(text: &str) -> String {
    let mut out = FENCE_RE.replace_all(text, "").into_owned();

    // Balanced-brace regions first: valid JSON objects flatten directly,
    // anything else falls back to the key/value pattern.
    while let Some((start, end)) = find_balanced(&out, '{', '}') {
        let region = &out[start..end];
        let replacement = fragment_to_sentences(region).unwrap_or_else(|| {
            // Unparseable region: drop the delimiters, keep interior text.
            region[1..region.len() - 1].trim().to_string()
        });
        out.replace_range(start..end, &replacement);
    }

    // Leaked arrays become comma-joined text.
    while let Some((start, end)) = find_balanced(&out, '[', ']') {
        let region = &out[start..end];
        match serde_json::from_str::<Value>(region) {
            Ok(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .map(value_text)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                out.replace_range(start..end, &joined);
            }
            _ => break,
        }
    }

    // Residual pairs leaked outside any delimiter.
    out = KEY_VALUE_RE
        .replace_all(&out, |caps: &regex::Captures<'_>| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().trim())
                .unwrap_or("");
            format!("{}: {}.", humanize_key(&caps[1]), value)
        })
        .into_owned();

    // Stray delimiters that survived (unbalanced leftovers).
    out = out.replace(['{', '}'], "");
    out = out.replace("[]", "");

    collapse_spaces(&out)
}

/// First balanced `open`..`close` region, inclusive of the delimiters.
/// Returns byte offsets `(start, end)` with `end` past the closing char.
fn find_balanced(text: &str, open: char, close: char) -> Option<(usize, usize)> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    for (i, c) in text[start..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((start, start + i + close.len_utf8()));
            }
        }
    }
    None
}

/// Flatten one serialized object region into `Key: value. Key2: value2.`
/// sentences. Returns `None` when no key/value pairs can be recovered.
fn fragment_to_sentences(region: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(region) {
        let parts: Vec<String> = map
            .iter()
            .filter_map(|(k, v)| {
                let text = value_text(v);
                if text.is_empty() {
                    None
                } else {
                    Some(format!("{}: {}.", humanize_key(k), text))
                }
            })
            .collect();
        if parts.is_empty() {
            // Valid but empty object: rewrite to nothing.
            return Some(String::new());
        }
        return Some(parts.join(" "));
    }

    // Not valid JSON: recover what the key/value pattern can find.
    let mut parts = Vec::new();
    for caps in KEY_VALUE_RE.captures_iter(region) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().trim())
            .unwrap_or("");
        if !value.is_empty() {
            parts.push(format!("{}: {}.", humanize_key(&caps[1]), value));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Plain-text rendering of a JSON value, recursing through containers.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{} {}", humanize_key(k), value_text(v)))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

/// `snake_case`/`camelCase` key → capitalized human label.
pub fn humanize_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for c in key.chars() {
        if c == '_' || c == '-' {
            spaced.push(' ');
            prev_lower = false;
        } else if c.is_uppercase() && prev_lower {
            spaced.push(' ');
            spaced.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            spaced.push(c);
            prev_lower = c.is_lowercase();
        }
    }
    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn collapse_spaces(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            lines.push(collapsed);
        }
    }
    lines.join("\n")
}
