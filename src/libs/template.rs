use crate::libs::error::LoaderError;

/// The default per-table block. The three placeholders are the whole
/// template vocabulary: table name, primary key (empty string when absent),
/// and the space-joined column list.
pub const DEFAULT_TABLE_TEMPLATE: &str = "\
install_table [% table %] => schema {
    pk '[% pk %]';
    columns qw/[% columns %]/;
};
";

/// Substitute `[% name %]` placeholders against a closed key set.
///
/// Plain text is copied through untouched. A placeholder whose name is not
/// in `bindings` is an error rather than silent corruption; a binding the
/// template never mentions is simply unused. No expression evaluation, no
/// escaping.
pub fn render(template: &str, bindings: &[(&str, &str)]) -> Result<String, LoaderError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("[%") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let Some(end) = tail.find("%]") else {
            // No closing marker: the remainder is literal text.
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let token = tail[..end].trim();
        match bindings.iter().find(|(name, _)| *name == token) {
            Some((_, value)) => out.push_str(value),
            None => {
                return Err(LoaderError::UnknownPlaceholder {
                    token: token.to_string(),
                });
            }
        }
        rest = &tail[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Normalize a free-text block: trim trailing whitespace, keep everything
/// else verbatim.
pub fn trim_block(text: &str) -> &str {
    text.trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_known_placeholder() {
        let rendered = render(
            DEFAULT_TABLE_TEMPLATE,
            &[
                ("table", "books"),
                ("pk", "id"),
                ("columns", "id author_id name"),
            ],
        )
        .unwrap();
        assert_eq!(
            rendered,
            "install_table books => schema {\n    pk 'id';\n    columns qw/id author_id name/;\n};\n"
        );
    }

    #[test]
    fn empty_pk_renders_as_empty_string() {
        let rendered = render(
            DEFAULT_TABLE_TEMPLATE,
            &[("table", "genders"), ("pk", ""), ("columns", "name")],
        )
        .unwrap();
        assert!(rendered.contains("pk '';"));
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let err = render("hello [% world %]", &[("table", "books")]).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::UnknownPlaceholder { token } if token == "world"
        ));
    }

    #[test]
    fn template_missing_a_token_just_omits_that_datum() {
        let rendered = render(
            "table: [% table %]",
            &[("table", "books"), ("pk", "id"), ("columns", "id name")],
        )
        .unwrap();
        assert_eq!(rendered, "table: books");
    }

    #[test]
    fn unterminated_placeholder_is_literal_text() {
        let rendered = render("a [% b", &[("b", "x")]).unwrap();
        assert_eq!(rendered, "a [% b");
    }
}
