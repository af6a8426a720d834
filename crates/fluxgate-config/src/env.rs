use std::sync::OnceLock;

use regex::Regex;

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// An optional fallback may be given as `{{ env.VAR | default("value") }}`;
/// it is used when the variable is unset. A placeholder without a fallback
/// whose variable is unset is an error. TOML comment lines are passed
/// through untouched so commented-out config never fails expansion.
pub(crate) fn expand_env(raw: &str) -> Result<String, String> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER.get_or_init(|| {
        Regex::new(
            r#"\{\{\s*env\.(?P<var>[A-Za-z0-9_]+)\s*(?:\|\s*default\("(?P<default>[^"]*)"\))?\s*\}\}"#,
        )
        .expect("placeholder pattern is valid")
    });

    let mut out = String::with_capacity(raw.len());

    for (idx, line) in raw.lines().enumerate() {
        if idx > 0 {
            out.push('\n');
        }

        if line.trim_start().starts_with('#') {
            out.push_str(line);
            continue;
        }

        let mut cursor = 0;
        for caps in re.captures_iter(line) {
            let matched = caps.get(0).expect("group 0 always present");
            out.push_str(&line[cursor..matched.start()]);

            let var = &caps["var"];
            match std::env::var(var) {
                Ok(value) => out.push_str(&value),
                Err(_) => match caps.name("default") {
                    Some(fallback) => out.push_str(fallback.as_str()),
                    None => return Err(format!("environment variable not found: `{var}`")),
                },
            }

            cursor = matched.end();
        }
        out.push_str(&line[cursor..]);
    }

    if raw.ends_with('\n') {
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_unchanged() {
        let input = "model = \"black-forest-labs/FLUX.1-schnell\"";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_set_variable() {
        temp_env::with_var("FLUXGATE_TEST_TOKEN", Some("hf_abc"), || {
            let out = expand_env("token = \"{{ env.FLUXGATE_TEST_TOKEN }}\"").unwrap();
            assert_eq!(out, "token = \"hf_abc\"");
        });
    }

    #[test]
    fn missing_variable_errors() {
        temp_env::with_var_unset("FLUXGATE_TEST_MISSING", || {
            let err = expand_env("token = \"{{ env.FLUXGATE_TEST_MISSING }}\"").unwrap_err();
            assert!(err.contains("FLUXGATE_TEST_MISSING"));
        });
    }

    #[test]
    fn default_applies_when_unset() {
        temp_env::with_var_unset("FLUXGATE_TEST_OPT", || {
            let out =
                expand_env("token = \"{{ env.FLUXGATE_TEST_OPT | default(\"\") }}\"").unwrap();
            assert_eq!(out, "token = \"\"");
        });
    }

    #[test]
    fn default_ignored_when_set() {
        temp_env::with_var("FLUXGATE_TEST_OPT2", Some("real"), || {
            let out = expand_env("token = \"{{ env.FLUXGATE_TEST_OPT2 | default(\"x\") }}\"")
                .unwrap();
            assert_eq!(out, "token = \"real\"");
        });
    }

    #[test]
    fn comment_lines_skip_expansion() {
        temp_env::with_var_unset("FLUXGATE_TEST_MISSING", || {
            let input = "# token = \"{{ env.FLUXGATE_TEST_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
