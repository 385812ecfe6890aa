//! `{{variable}}` placeholder substitution for node templates.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder regex is valid"));

/// Substitute every `{{identifier}}` placeholder in `text`.
///
/// Resolution order per placeholder: an entry in `variables` with that
/// exact name, else an entry in `node_outputs` keyed by that name, else
/// the placeholder is left verbatim (braces included) so unresolved
/// references surface visibly downstream instead of vanishing.
///
/// Total: never fails.
pub fn resolve_variables(
    text: &str,
    variables: &BTreeMap<String, String>,
    node_outputs: &BTreeMap<String, String>,
) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            if let Some(value) = variables.get(name) {
                value.clone()
            } else if let Some(output) = node_outputs.get(name) {
                output.clone()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn resolves_from_variables() {
        let out = resolve_variables("{{x}}", &map(&[("x", "hello")]), &BTreeMap::new());
        assert_eq!(out, "hello");
    }

    #[test]
    fn unresolved_placeholder_is_left_verbatim() {
        let out = resolve_variables("{{y}}", &BTreeMap::new(), &BTreeMap::new());
        assert_eq!(out, "{{y}}");
    }

    #[test]
    fn variables_take_priority_over_node_outputs() {
        let out = resolve_variables(
            "{{x}}",
            &map(&[("x", "from-vars")]),
            &map(&[("x", "from-outputs")]),
        );
        assert_eq!(out, "from-vars");
    }

    #[test]
    fn falls_back_to_node_outputs() {
        let out = resolve_variables(
            "Summary of {{step1}}",
            &BTreeMap::new(),
            &map(&[("step1", "the report")]),
        );
        assert_eq!(out, "Summary of the report");
    }

    #[test]
    fn multiple_placeholders_in_one_template() {
        let out = resolve_variables(
            "{{a}} and {{b}} and {{missing}}",
            &map(&[("a", "1")]),
            &map(&[("b", "2")]),
        );
        assert_eq!(out, "1 and 2 and {{missing}}");
    }

    #[test]
    fn identifier_is_word_characters_only() {
        // A hyphen breaks the match, so the text is untouched.
        let out = resolve_variables("{{not-a-var}}", &map(&[("not", "x")]), &BTreeMap::new());
        assert_eq!(out, "{{not-a-var}}");
    }

    #[test]
    fn empty_value_substitutes_to_empty() {
        let out = resolve_variables("[{{x}}]", &map(&[("x", "")]), &BTreeMap::new());
        assert_eq!(out, "[]");
    }
}
