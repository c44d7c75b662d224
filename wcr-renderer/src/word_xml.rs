//! WordprocessingML clean-up applied to template parts before compiling.
//!
//! Word splits typed text into runs freely, so a tag such as `{{ wo_no }}`
//! often reaches us as `{{ </w:t></w:r><w:r><w:t>wo_no }}`. This pass:
//!
//! 1. rejoins delimiters broken across runs (`{` … `{` → `{{`);
//! 2. strips XML markup inside `{{ … }}` and `{% … %}`;
//! 3. unescapes entities and typographic quotes inside tags;
//! 4. replaces the enclosing `<w:tr>` of every `{%tr … %}` tag and the
//!    enclosing `<w:p>` of every `{%p … %}` tag with the plain tag, so whole
//!    table rows and paragraphs can be conditional.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static SPLIT_OPEN_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(?:<[^>]*>)+\{").expect("SPLIT_OPEN_VAR regex should compile")
});
static SPLIT_CLOSE_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\}(?:<[^>]*>)+\}").expect("SPLIT_CLOSE_VAR regex should compile")
});
static SPLIT_OPEN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(?:<[^>]*>)+%").expect("SPLIT_OPEN_BLOCK regex should compile")
});
static SPLIT_CLOSE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(?:<[^>]*>)+\}").expect("SPLIT_CLOSE_BLOCK regex should compile")
});
static TAG_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}").expect("TAG_SPAN regex should compile")
});
static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("MARKUP regex should compile"));

/// Prepare one XML part for Tera.
pub fn prepare_part(xml: &str) -> String {
    let xml = SPLIT_OPEN_VAR.replace_all(xml, "{{");
    let xml = SPLIT_CLOSE_VAR.replace_all(&xml, "}}");
    let xml = SPLIT_OPEN_BLOCK.replace_all(&xml, "{%");
    let xml = SPLIT_CLOSE_BLOCK.replace_all(&xml, "%}");
    let xml = TAG_SPAN.replace_all(&xml, |caps: &Captures| clean_tag(&caps[0]));
    let xml = collapse_structural_tags(&xml, "tr");
    collapse_structural_tags(&xml, "p")
}

fn clean_tag(tag: &str) -> String {
    let stripped: Cow<'_, str> = MARKUP.replace_all(tag, "");
    stripped
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace(|c: char| c == '\u{201c}' || c == '\u{201d}', "\"")
        .replace(|c: char| c == '\u{2018}' || c == '\u{2019}', "'")
}

/// Replace the `<w:{element}>` enclosing each `{%{element} … %}` tag with
/// `{% … %}`. Tags with no enclosing element are rewritten in place.
fn collapse_structural_tags(xml: &str, element: &str) -> String {
    let marker = format!("{{%{element} ");
    let open_plain = format!("<w:{element}>");
    let open_attr = format!("<w:{element} ");
    let close = format!("</w:{element}>");

    let mut out = xml.to_string();
    while let Some(tag_start) = out.find(&marker) {
        let Some(offset) = out[tag_start..].find("%}") else {
            break;
        };
        let tag_end = tag_start + offset + 2;
        let inner = out[tag_start + marker.len()..tag_end - 2].trim().to_string();
        let replacement = format!("{{% {inner} %}}");

        let before = &out[..tag_start];
        let start = [before.rfind(&open_plain), before.rfind(&open_attr)]
            .into_iter()
            .flatten()
            .max();
        let end = out[tag_end..]
            .find(&close)
            .map(|off| tag_end + off + close.len());

        match (start, end) {
            (Some(s), Some(e)) => out.replace_range(s..e, &replacement),
            _ => out.replace_range(tag_start..tag_end, &replacement),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_variable_is_rejoined() {
        let xml = "<w:t>{</w:t></w:r><w:r><w:t>{ wo_no }</w:t></w:r><w:r><w:t>}</w:t>";
        let out = prepare_part(xml);
        assert!(out.contains("{{ wo_no }}"), "{out}");
    }

    #[test]
    fn markup_inside_tag_is_removed() {
        let xml = "<w:t>{{ Site_</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>Name }}</w:t>";
        let out = prepare_part(xml);
        assert!(out.contains("{{ Site_Name }}"), "{out}");
    }

    #[test]
    fn quote_entities_are_unescaped_inside_tags() {
        let xml = "<w:t>{{ x | default(value=&quot;&quot;) }} &quot;kept&quot;</w:t>";
        let out = prepare_part(xml);
        assert!(out.contains(r#"{{ x | default(value="") }}"#), "{out}");
        assert!(out.contains("&quot;kept&quot;"), "{out}");
    }

    #[test]
    fn typographic_quotes_are_straightened() {
        let out = prepare_part("<w:t>{{ x | default(value=\u{201c}\u{201d}) }}</w:t>");
        assert!(out.contains(r#"default(value="")"#), "{out}");
    }

    #[test]
    fn paragraph_tag_replaces_its_paragraph() {
        let xml = concat!(
            "<w:p><w:r><w:t>before</w:t></w:r></w:p>",
            "<w:p w:rsidR=\"1\"><w:pPr/><w:r><w:t>{%p if item_sr_no_1 %}</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>body</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>{%p endif %}</w:t></w:r></w:p>",
        );
        let out = prepare_part(xml);
        assert_eq!(
            out,
            concat!(
                "<w:p><w:r><w:t>before</w:t></w:r></w:p>",
                "{% if item_sr_no_1 %}",
                "<w:p><w:r><w:t>body</w:t></w:r></w:p>",
                "{% endif %}",
            )
        );
    }

    #[test]
    fn row_tag_replaces_its_row() {
        let xml = concat!(
            "<w:tbl>",
            "<w:tr><w:tc><w:p><w:r><w:t>{%tr if item_sr_no_2 %}</w:t></w:r></w:p></w:tc></w:tr>",
            "<w:tr><w:tc><w:p><w:r><w:t>{{ item_sr_no_2 }}</w:t></w:r></w:p></w:tc></w:tr>",
            "<w:tr><w:tc><w:p><w:r><w:t>{%tr endif %}</w:t></w:r></w:p></w:tc></w:tr>",
            "</w:tbl>",
        );
        let out = prepare_part(xml);
        assert_eq!(
            out,
            concat!(
                "<w:tbl>",
                "{% if item_sr_no_2 %}",
                "<w:tr><w:tc><w:p><w:r><w:t>{{ item_sr_no_2 }}</w:t></w:r></w:p></w:tc></w:tr>",
                "{% endif %}",
                "</w:tbl>",
            )
        );
    }

    #[test]
    fn plain_text_is_untouched() {
        let xml = "<w:p><w:r><w:t>Work Completion Report</w:t></w:r></w:p>";
        assert_eq!(prepare_part(xml), xml);
    }
}
