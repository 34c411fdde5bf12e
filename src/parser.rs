use chrono::{DateTime, Local, Utc};

use crate::models::{Category, InputParam, Param, Template, TreeItem, TreeTarget};

pub(crate) const HIGHLIGHT_OPEN: &str = "<span class=\"focus\">";
pub(crate) const HIGHLIGHT_CLOSE: &str = "</span>";
const UNCATEGORIZED: &str = "Uncategorized";
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Token(&'a str),
}

/// Splits content into literal text and `{token}` segments.
///
/// A token is `{`, one or more characters other than `{` and `}`, then `}`.
/// For `{a{b}}` only `{b}` is a token; `{}` and unclosed braces stay text.
/// This is stricter than the `{[^}]+}` pattern the browser version matched
/// with, which would read `{a{b}` as one token.
pub(crate) fn tokenize(content: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut index = 0;
    while let Some(open_rel) = content[index..].find('{') {
        let open = index + open_rel;
        let after = &content[open + 1..];
        let Some(rel) = after.find(['{', '}']) else {
            break;
        };
        let stop = open + 1 + rel;
        if after.as_bytes()[rel] == b'{' {
            index = stop;
            continue;
        }
        if rel == 0 {
            index = stop + 1;
            continue;
        }
        if open > text_start {
            segments.push(Segment::Text(&content[text_start..open]));
        }
        segments.push(Segment::Token(&content[open..=stop]));
        text_start = stop + 1;
        index = stop + 1;
    }
    if text_start < content.len() {
        segments.push(Segment::Text(&content[text_start..]));
    }
    segments
}

/// Distinct tokens in order of first appearance.
pub(crate) fn extract_params(content: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for segment in tokenize(content) {
        if let Segment::Token(token) = segment {
            if tokens.iter().any(|known| known == token) {
                continue;
            }
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Rebuilds the param list for a new token list. Entries are matched by
/// literal token text so surviving tokens keep their type.
pub(crate) fn sync_params(tokens: &[String], existing: &[Param]) -> Vec<Param> {
    tokens
        .iter()
        .map(|token| {
            existing
                .iter()
                .find(|param| param.value == *token)
                .cloned()
                .unwrap_or_else(|| Param::new(token))
        })
        .collect()
}

pub(crate) fn sanitize(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#039;"),
            _ => output.push(ch),
        }
    }
    output
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    Text(&'a str),
    Placeholder { token: &'a str, focused: bool },
    Value { text: &'a str, focused: bool },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Rendered {
    pub(crate) display_html: String,
    pub(crate) copy_text: String,
}

/// Substitutes inputs into the content in a single pass. Inserted input is
/// never scanned again. Only the first focused param is highlighted.
pub(crate) fn render_pieces<'a>(content: &'a str, params: &'a [InputParam]) -> Vec<Piece<'a>> {
    let focused = params
        .iter()
        .find(|param| param.is_focus)
        .map(|param| param.value.as_str());
    tokenize(content)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => Piece::Text(text),
            Segment::Token(token) => {
                let is_focus = focused == Some(token);
                match params.iter().find(|param| param.value == token) {
                    Some(param) if !param.input_text.is_empty() => Piece::Value {
                        text: param.input_text.as_str(),
                        focused: is_focus,
                    },
                    _ => Piece::Placeholder {
                        token,
                        focused: is_focus,
                    },
                }
            }
        })
        .collect()
}

pub(crate) fn render_display_html(content: &str, params: &[InputParam]) -> String {
    let mut output = String::with_capacity(content.len());
    for piece in render_pieces(content, params) {
        match piece {
            Piece::Text(text) => output.push_str(text),
            Piece::Placeholder { token, focused } => push_highlighted(&mut output, token, focused),
            Piece::Value { text, focused } => push_highlighted(&mut output, &sanitize(text), focused),
        }
    }
    output
}

pub(crate) fn render_copy_text(content: &str, params: &[InputParam]) -> String {
    let mut output = String::with_capacity(content.len());
    for piece in render_pieces(content, params) {
        match piece {
            Piece::Text(text) => output.push_str(text),
            Piece::Placeholder { token, .. } => output.push_str(token),
            Piece::Value { text, .. } => output.push_str(text),
        }
    }
    output
}

pub(crate) fn render(content: &str, params: &[InputParam]) -> Rendered {
    Rendered {
        display_html: render_display_html(content, params),
        copy_text: render_copy_text(content, params),
    }
}

fn push_highlighted(output: &mut String, text: &str, focused: bool) {
    if focused {
        output.push_str(HIGHLIGHT_OPEN);
        output.push_str(text);
        output.push_str(HIGHLIGHT_CLOSE);
    } else {
        output.push_str(text);
    }
}

fn is_half_width(ch: char) -> bool {
    let code = ch as u32;
    code <= 0x7f || (0xff61..=0xff9f).contains(&code)
}

/// Width in full-width units: half-width characters count 0.5, rounded up.
pub(crate) fn full_width_count(text: &str) -> usize {
    let halves: usize = text
        .chars()
        .map(|ch| if is_half_width(ch) { 1 } else { 2 })
        .sum();
    halves.div_ceil(2)
}

pub(crate) fn byte_size(text: &str) -> usize {
    text.len()
}

pub(crate) fn format_timestamp(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Categories in store order, each followed by its templates. Templates
/// without a known category go under a trailing "Uncategorized" group.
pub(crate) fn build_tree_items(categories: &[Category], templates: &[Template]) -> Vec<TreeItem> {
    let mut items = Vec::new();
    for category in categories {
        items.push(TreeItem {
            label: category.name.clone(),
            depth: 0,
            target: TreeTarget::Category(Some(category.id)),
        });
        push_template_items(
            &mut items,
            templates
                .iter()
                .filter(|template| template.category_id == Some(category.id)),
        );
    }

    let orphans: Vec<&Template> = templates
        .iter()
        .filter(|template| match template.category_id {
            Some(id) => !categories.iter().any(|category| category.id == id),
            None => true,
        })
        .collect();
    if !orphans.is_empty() {
        items.push(TreeItem {
            label: UNCATEGORIZED.to_string(),
            depth: 0,
            target: TreeTarget::Category(None),
        });
        push_template_items(&mut items, orphans.into_iter());
    }
    items
}

fn push_template_items<'a>(items: &mut Vec<TreeItem>, templates: impl Iterator<Item = &'a Template>) {
    for template in templates {
        items.push(TreeItem {
            label: template.title.clone(),
            depth: 1,
            target: TreeTarget::Template(template.id),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParamType;

    fn inputs(content: &str) -> Vec<InputParam> {
        extract_params(content)
            .iter()
            .map(|token| InputParam::from(&Param::new(token)))
            .collect()
    }

    fn set_input(params: &mut [InputParam], token: &str, text: &str) {
        if let Some(param) = params.iter_mut().find(|param| param.value == token) {
            param.input_text = text.to_string();
        }
    }

    #[test]
    fn extracts_distinct_tokens_in_order() {
        assert_eq!(extract_params("Hello {name}, {name}!"), vec!["{name}"]);
        assert_eq!(
            extract_params("{b} then {a} then {b} and {c}"),
            vec!["{b}", "{a}", "{c}"]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let content = "Dear {title} {last},\nsee you at {time} on {date}. {last}";
        assert_eq!(extract_params(content), extract_params(content));
    }

    #[test]
    fn no_tokens_yields_empty_list() {
        assert!(extract_params("").is_empty());
        assert!(extract_params("plain text").is_empty());
        assert!(extract_params("empty {} braces and { unclosed").is_empty());
    }

    #[test]
    fn nested_braces_keep_innermost_pair() {
        assert_eq!(extract_params("{a{b}}"), vec!["{b}"]);
        assert_eq!(
            tokenize("x{a{b}}y"),
            vec![
                Segment::Text("x{a"),
                Segment::Token("{b}"),
                Segment::Text("}y"),
            ]
        );
    }

    #[test]
    fn tokens_may_contain_any_other_characters() {
        assert_eq!(
            extract_params("{a.b} {(x)} {$1} {名前} {multi\nline}"),
            vec!["{a.b}", "{(x)}", "{$1}", "{名前}", "{multi\nline}"]
        );
    }

    #[test]
    fn sync_preserves_type_and_appends_new_tokens() {
        let existing = vec![Param {
            value: "{x}".to_string(),
            kind: ParamType::Date,
        }];
        let tokens = vec!["{x}".to_string(), "{y}".to_string()];
        let synced = sync_params(&tokens, &existing);
        assert_eq!(synced.len(), 2);
        assert_eq!(synced[0].value, "{x}");
        assert_eq!(synced[0].kind, ParamType::Date);
        assert_eq!(synced[1].value, "{y}");
        assert_eq!(synced[1].kind, ParamType::String);
    }

    #[test]
    fn sync_drops_stale_tokens() {
        let existing = vec![
            Param {
                value: "{x}".to_string(),
                kind: ParamType::Tel,
            },
            Param::new("{y}"),
        ];
        let synced = sync_params(&extract_params("only {y} now"), &existing);
        assert_eq!(synced, vec![Param::new("{y}")]);
    }

    #[test]
    fn sync_follows_token_order_not_previous_order() {
        let existing = vec![
            Param::new("{a}"),
            Param {
                value: "{b}".to_string(),
                kind: ParamType::Number,
            },
        ];
        let synced = sync_params(&extract_params("{b} {a}"), &existing);
        assert_eq!(synced[0].value, "{b}");
        assert_eq!(synced[0].kind, ParamType::Number);
        assert_eq!(synced[1].value, "{a}");
    }

    #[test]
    fn replaces_every_occurrence() {
        let content = "{a} and {a}";
        let mut params = inputs(content);
        set_input(&mut params, "{a}", "X");
        assert_eq!(render_copy_text(content, &params), "X and X");
        assert_eq!(render_display_html(content, &params), "X and X");
    }

    #[test]
    fn empty_input_leaves_token_text() {
        let content = "Hi {name}, {greeting}";
        let mut params = inputs(content);
        set_input(&mut params, "{greeting}", "welcome");
        assert_eq!(render_copy_text(content, &params), "Hi {name}, welcome");
    }

    #[test]
    fn focus_highlights_only_focused_token() {
        let content = "{a} {b} {a}";
        let mut params = inputs(content);
        params[0].is_focus = true;
        set_input(&mut params, "{b}", "B");
        assert_eq!(
            render_display_html(content, &params),
            "<span class=\"focus\">{a}</span> B <span class=\"focus\">{a}</span>"
        );
    }

    #[test]
    fn focus_is_exclusive_even_with_several_flags() {
        let content = "{a} {b}";
        let mut params = inputs(content);
        params[0].is_focus = true;
        params[1].is_focus = true;
        assert_eq!(
            render_display_html(content, &params),
            "<span class=\"focus\">{a}</span> {b}"
        );
    }

    #[test]
    fn focused_token_with_input_highlights_the_value() {
        let content = "to {who}";
        let mut params = inputs(content);
        params[0].is_focus = true;
        set_input(&mut params, "{who}", "Ann");
        assert_eq!(
            render_display_html(content, &params),
            "to <span class=\"focus\">Ann</span>"
        );
    }

    #[test]
    fn copy_text_never_contains_highlight_markup() {
        let content = "{a} {b}";
        let mut params = inputs(content);
        params[1].is_focus = true;
        let rendered = render(content, &params);
        assert!(rendered.display_html.contains(HIGHLIGHT_OPEN));
        assert!(!rendered.copy_text.contains(HIGHLIGHT_OPEN));
        assert!(!rendered.copy_text.contains(HIGHLIGHT_CLOSE));
        assert_eq!(rendered.copy_text, "{a} {b}");
    }

    #[test]
    fn input_is_escaped_for_display_but_not_for_copy() {
        let content = "note: {n}";
        let mut params = inputs(content);
        set_input(&mut params, "{n}", "<b>\"Tom\" & 'Jerry'</b>");
        let rendered = render(content, &params);
        assert_eq!(
            rendered.display_html,
            "note: &lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;"
        );
        assert_eq!(rendered.copy_text, "note: <b>\"Tom\" & 'Jerry'</b>");
    }

    #[test]
    fn regex_metacharacters_in_tokens_match_literally() {
        let content = "{a.b} {a+b} {(x)} {$1} axb";
        let mut params = inputs(content);
        set_input(&mut params, "{a.b}", "dot");
        set_input(&mut params, "{a+b}", "plus");
        set_input(&mut params, "{(x)}", "group");
        set_input(&mut params, "{$1}", "dollar");
        assert_eq!(render_copy_text(content, &params), "dot plus group dollar axb");
    }

    #[test]
    fn inserted_input_is_not_substituted_again() {
        let content = "{a} / {b}";
        let mut params = inputs(content);
        set_input(&mut params, "{a}", "{b}");
        set_input(&mut params, "{b}", "B");
        assert_eq!(render_copy_text(content, &params), "{b} / B");
    }

    #[test]
    fn sanitize_escapes_markup_characters() {
        assert_eq!(sanitize("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#039;");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn full_width_count_rounds_half_width_up() {
        assert_eq!(full_width_count(""), 0);
        assert_eq!(full_width_count("abc"), 2);
        assert_eq!(full_width_count("名前"), 2);
        assert_eq!(full_width_count("{名前}"), 3);
        assert_eq!(full_width_count("ｱｲ"), 1);
        assert_eq!(byte_size("名"), 3);
    }

    #[test]
    fn tree_groups_templates_under_categories() {
        let categories = vec![
            Category {
                id: 1,
                name: "mail".to_string(),
            },
            Category {
                id: 2,
                name: "empty".to_string(),
            },
        ];
        let template = |id: u32, category_id: Option<u32>| Template {
            id,
            title: format!("t{id}"),
            content: String::new(),
            params: Vec::new(),
            category_id,
            created_at: None,
            updated_at: None,
        };
        let templates = vec![template(1, Some(1)), template(2, None), template(3, Some(9))];
        let items = build_tree_items(&categories, &templates);
        let targets: Vec<TreeTarget> = items.iter().map(|item| item.target).collect();
        assert_eq!(
            targets,
            vec![
                TreeTarget::Category(Some(1)),
                TreeTarget::Template(1),
                TreeTarget::Category(Some(2)),
                TreeTarget::Category(None),
                TreeTarget::Template(2),
                TreeTarget::Template(3),
            ]
        );
        assert_eq!(items[3].label, UNCATEGORIZED);
        assert_eq!(items[4].depth, 1);
    }
}
