//! Placeholder normalization for serialized resources
//!
//! OpenShift templates reference parameters as `${NAME}`. The release system
//! substitutes `{NAME}`-style tokens in a later text pass, so every string
//! scalar is rewritten from the shell form to the bare brace form before a
//! resource is written out.

use regex::{Captures, Regex};
use serde_yaml::{Mapping, Value};
use serde_yaml::value::TaggedValue;
use std::borrow::Cow;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w*)\}").expect("valid regex"));

/// Strip the `$` sigil from every `${token}` in `input`
///
/// Strings containing at least one placeholder are also trimmed of
/// surrounding whitespace; any other string is returned untouched.
///
/// ```
/// use darpack_core::normalize_placeholders;
///
/// assert_eq!(normalize_placeholders("catalog:${APP_VERSION}"), "catalog:{APP_VERSION}");
/// assert_eq!(normalize_placeholders(" plain "), " plain ");
/// ```
pub fn normalize_placeholders(input: &str) -> Cow<'_, str> {
    if !PLACEHOLDER_RE.is_match(input) {
        return Cow::Borrowed(input);
    }
    let replaced =
        PLACEHOLDER_RE.replace_all(input, |caps: &Captures<'_>| format!("{{{}}}", &caps[1]));
    Cow::Owned(replaced.trim().to_string())
}

/// Copy of `value` with [`normalize_placeholders`] applied to every string scalar
///
/// Mapping keys are strings too and get the same treatment. When two keys
/// normalize to the same string the later entry wins and a warning is logged.
pub fn normalize_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_placeholders(s).into_owned()),
        Value::Sequence(seq) => Value::Sequence(seq.iter().map(normalize_value).collect()),
        Value::Mapping(map) => {
            let mut normalized = Mapping::with_capacity(map.len());
            for (k, v) in map {
                let key = normalize_value(k);
                if normalized.insert(key.clone(), normalize_value(v)).is_some() {
                    tracing::warn!("Keys collide after placeholder normalization: {:?}", key);
                }
            }
            Value::Mapping(normalized)
        }
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: normalize_value(&tagged.value),
        })),
        other => other.clone(),
    }
}
