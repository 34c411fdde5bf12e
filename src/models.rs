use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ParamType {
    #[default]
    String,
    Number,
    Date,
    Time,
    Tel,
}

impl ParamType {
    pub(crate) const ALL: [ParamType; 5] = [
        ParamType::String,
        ParamType::Number,
        ParamType::Date,
        ParamType::Time,
        ParamType::Tel,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Date => "date",
            ParamType::Time => "time",
            ParamType::Tel => "tel",
        }
    }

    pub(crate) fn next(self) -> Self {
        let index = Self::ALL.iter().position(|kind| *kind == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub(crate) fn prev(self) -> Self {
        let index = Self::ALL.iter().position(|kind| *kind == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Whether a typed character is allowed in an input of this type.
    pub(crate) fn accepts(self, ch: char) -> bool {
        match self {
            ParamType::String => true,
            ParamType::Number => ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | ','),
            ParamType::Date => ch.is_ascii_digit() || matches!(ch, '-' | '/'),
            ParamType::Time => ch.is_ascii_digit() || ch == ':',
            ParamType::Tel => ch.is_ascii_digit() || matches!(ch, '+' | '-' | '(' | ')' | ' '),
        }
    }

    pub(crate) fn hint(self) -> &'static str {
        match self {
            ParamType::String => "",
            ParamType::Number => "123",
            ParamType::Date => "yyyy-mm-dd",
            ParamType::Time => "hh:mm",
            ParamType::Tel => "+00 000-0000",
        }
    }
}

/// A token of a template together with its input type. `value` is the
/// literal token text, braces included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Param {
    pub(crate) value: String,
    #[serde(rename = "type", default)]
    pub(crate) kind: ParamType,
}

impl Param {
    pub(crate) fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            kind: ParamType::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Template {
    #[serde(default)]
    pub(crate) id: u32,
    pub(crate) title: String,
    pub(crate) content: String,
    #[serde(default)]
    pub(crate) params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) category_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Category {
    #[serde(default)]
    pub(crate) id: u32,
    pub(crate) name: String,
}

/// The store file and the export file share this shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ExportData {
    #[serde(rename = "categorys")]
    pub(crate) categories: Vec<Category>,
    pub(crate) templates: Vec<Template>,
}

/// A param while a template is being filled in. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct InputParam {
    pub(crate) value: String,
    pub(crate) kind: ParamType,
    pub(crate) input_text: String,
    pub(crate) is_focus: bool,
}

impl From<&Param> for InputParam {
    fn from(param: &Param) -> Self {
        Self {
            value: param.value.clone(),
            kind: param.kind,
            input_text: String::new(),
            is_focus: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TreeTarget {
    Category(Option<u32>),
    Template(u32),
}

#[derive(Clone, Debug)]
pub(crate) struct TreeItem {
    pub(crate) label: String,
    pub(crate) depth: usize,
    pub(crate) target: TreeTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_type_cycles_through_all_kinds() {
        let mut kind = ParamType::String;
        for _ in 0..ParamType::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, ParamType::String);
        assert_eq!(ParamType::String.prev(), ParamType::Tel);
        assert_eq!(ParamType::Tel.next(), ParamType::String);
    }

    #[test]
    fn param_type_filters_input() {
        assert!(ParamType::Number.accepts('7'));
        assert!(!ParamType::Number.accepts('a'));
        assert!(ParamType::Time.accepts(':'));
        assert!(!ParamType::Time.accepts('-'));
        assert!(ParamType::Tel.accepts('('));
        assert!(ParamType::String.accepts('{'));
    }

    #[test]
    fn template_json_uses_browser_export_field_names() {
        let json = r#"{
            "categorys": [{ "id": 1, "name": "mail" }],
            "templates": [{
                "id": 3,
                "title": "hello",
                "content": "Hi {name} on {day}",
                "params": [{ "value": "{name}", "type": "string" }, { "value": "{day}", "type": "date" }],
                "categoryId": 1,
                "createdAt": "2025-01-02T03:04:05.000Z"
            }]
        }"#;
        let data: ExportData = serde_json::from_str(json).unwrap();
        assert_eq!(data.categories[0].name, "mail");
        let template = &data.templates[0];
        assert_eq!(template.category_id, Some(1));
        assert_eq!(template.params[1].kind, ParamType::Date);
        assert!(template.created_at.is_some());
        assert!(template.updated_at.is_none());

        let out = serde_json::to_string(&data).unwrap();
        assert!(out.contains("\"categorys\""));
        assert!(out.contains("\"categoryId\":1"));
        assert!(out.contains("\"type\":\"date\""));
    }

    #[test]
    fn export_data_requires_both_collections() {
        let missing = r#"{ "templates": [] }"#;
        assert!(serde_json::from_str::<ExportData>(missing).is_err());
    }
}
