//! The template renderer (C2, spec §4.2): single-pass, non-recursive
//! substitution of `$dotted.path$` / `$dotted.path[i]$` references.

use crate::error::GatewayError;
use crate::models::ExtractedMap;

struct VarRef {
    path: Vec<String>,
    index: Option<usize>,
}

fn is_ident_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | '[' | ']' | '$' | ',' | '.')
}

/// Parse the text between a pair of `$` delimiters as a variable reference.
/// Returns `None` when the text doesn't match `IDENT(\.IDENT)*(\[INT\])?`,
/// in which case the caller emits the original text (with delimiters)
/// verbatim.
fn parse_var_ref(inner: &str) -> Option<VarRef> {
    let (path_part, index) = match inner.rfind('[') {
        Some(bracket_pos) if inner.ends_with(']') => {
            let digits = &inner[bracket_pos + 1..inner.len() - 1];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let index: usize = digits.parse().ok()?;
            (&inner[..bracket_pos], Some(index))
        }
        Some(_) => return None,
        None => (inner, None),
    };

    if path_part.is_empty() {
        return None;
    }
    let segments: Vec<&str> = path_part.split('.').collect();
    if segments
        .iter()
        .any(|seg| seg.is_empty() || !seg.chars().all(is_ident_char))
    {
        return None;
    }

    Some(VarRef {
        path: segments.into_iter().map(str::to_owned).collect(),
        index,
    })
}

fn lookup(var_ref: &VarRef, map: &ExtractedMap) -> String {
    let key = var_ref.path.join(".");
    match map.get(&key) {
        None => String::new(),
        Some(value) => match var_ref.index {
            Some(idx) => value.render_index(idx),
            None => value.render(),
        },
    }
}

/// Render `template` against `map`. Fails with `BadTemplate` only when the
/// template contains an odd number of `$` delimiters.
pub fn render(template: &str, map: &ExtractedMap) -> Result<String, GatewayError> {
    let dollar_positions: Vec<usize> = template
        .char_indices()
        .filter(|(_, c)| *c == '$')
        .map(|(i, _)| i)
        .collect();

    if dollar_positions.len() % 2 != 0 {
        return Err(GatewayError::BadTemplate(
            "template contains an odd number of '$' delimiters".into(),
        ));
    }

    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;
    let mut i = 0;
    while i < dollar_positions.len() {
        let open = dollar_positions[i];
        let close = dollar_positions[i + 1];
        out.push_str(&template[cursor..open]);
        let inner = &template[open + 1..close];
        match parse_var_ref(inner) {
            Some(var_ref) => out.push_str(&lookup(&var_ref, map)),
            None => out.push_str(&template[open..=close]),
        }
        cursor = close + 1;
        i += 2;
    }
    out.push_str(&template[cursor..]);
    Ok(out)
}

/// Cheap validity check used at config-write time (spec §4.3): a template
/// "parses" under C2 precisely when its `$` delimiters are balanced.
pub fn validate(template: &str) -> Result<(), GatewayError> {
    render(template, &ExtractedMap::new()).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract, parse_fields};
    use serde_json::json;

    fn render_pipeline(fields: &str, template: &str, payload: serde_json::Value) -> String {
        let patterns = parse_fields(fields).unwrap();
        let map = extract(&payload, &patterns);
        render(template, &map).unwrap()
    }

    #[test]
    fn odd_dollar_count_is_bad_template() {
        let map = ExtractedMap::new();
        assert!(render("unterminated $var", &map).is_err());
    }

    #[test]
    fn unknown_variable_renders_empty() {
        let map = ExtractedMap::new();
        assert_eq!(render("value=[$missing$]", &map).unwrap(), "value=[]");
    }

    #[test]
    fn non_variable_dollar_text_emitted_verbatim() {
        let map = ExtractedMap::new();
        assert_eq!(
            render("cost is $5, right$?", &map).unwrap(),
            "cost is $5, right$?"
        );
    }

    #[test]
    fn idempotent_under_empty_map() {
        let map = ExtractedMap::new();
        let template = "$a.b$ and $c[2]$ stay empty";
        let once = render(template, &map).unwrap();
        let twice = render(&once, &map).unwrap();
        assert_eq!(once, "$a.b$ and $c[2]$ stay empty".replace("$a.b$", "").replace("$c[2]$", ""));
        assert_eq!(once, twice, "output must not be re-scanned for substitution");
    }

    #[test]
    fn scenario_source_control_pr() {
        let msg = render_pipeline(
            "action,pull_request{title,user{login}},repository{name}",
            r#"PR $action$ on $repository.name$: "$pull_request.title$" by $pull_request.user.login$"#,
            json!({
                "action": "opened",
                "pull_request": {"title": "T", "user": {"login": "u"}},
                "repository": {"name": "R"}
            }),
        );
        assert_eq!(msg, r#"PR opened on R: "T" by u"#);
    }

    #[test]
    fn scenario_array_fan_out() {
        let msg = render_pipeline(
            "locations{search_id,asset_type}",
            "IDs: $locations.search_id$ | Types: $locations.asset_type$",
            json!({"locations": [
                {"search_id": "a", "asset_type": "cpe"},
                {"search_id": "b", "asset_type": "node"},
            ]}),
        );
        assert_eq!(msg, "IDs: a, b | Types: cpe, node");
    }

    #[test]
    fn scenario_indexed_access() {
        let msg = render_pipeline(
            "locations{search_id,asset_type}",
            "First: $locations.asset_type[0]$ Second: $locations.asset_type[1]$",
            json!({"locations": [
                {"search_id": "a", "asset_type": "cpe"},
                {"search_id": "b", "asset_type": "node"},
            ]}),
        );
        assert_eq!(msg, "First: cpe Second: node");
    }

    #[test]
    fn index_out_of_range_renders_empty() {
        let msg = render_pipeline(
            "tags",
            "third: $tags[5]$",
            json!({"tags": ["a", "b"]}),
        );
        assert_eq!(msg, "third: ");
    }
}
