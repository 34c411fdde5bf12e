use crate::error::{AppError, Result};
use crate::models::{InputParam, Param, ParamType, Template};
use crate::parser::{Piece, Rendered, extract_params, render, render_copy_text, render_pieces, sync_params};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionPhase {
    Idle,
    ParamsInitialized,
    InputChanged,
}

#[derive(Clone, Debug)]
pub(crate) enum SessionCommand {
    Select(Template),
    Input { index: usize, text: String },
    Focus(usize),
    Blur,
    Clear,
}

/// A fill-in session over one template. Owns the transient input state
/// that is rebuilt whenever another template is selected.
#[derive(Clone, Debug, Default)]
pub(crate) struct FillSession {
    template: Option<Template>,
    params: Vec<InputParam>,
    edited: bool,
}

impl FillSession {
    pub(crate) fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Select(template) => self.select(template),
            SessionCommand::Input { index, text } => {
                if index >= self.params.len() {
                    return;
                }
                for (i, param) in self.params.iter_mut().enumerate() {
                    param.is_focus = i == index;
                }
                self.params[index].input_text = text;
                self.edited = true;
            }
            SessionCommand::Focus(index) => {
                if index >= self.params.len() {
                    return;
                }
                for (i, param) in self.params.iter_mut().enumerate() {
                    param.is_focus = i == index;
                }
            }
            SessionCommand::Blur => {
                for param in &mut self.params {
                    param.is_focus = false;
                }
            }
            SessionCommand::Clear => self.init_params(),
        }
    }

    fn select(&mut self, mut template: Template) {
        let tokens = extract_params(&template.content);
        template.params = sync_params(&tokens, &template.params);
        self.template = Some(template);
        self.init_params();
    }

    fn init_params(&mut self) {
        self.params = self
            .template
            .as_ref()
            .map(|template| template.params.iter().map(InputParam::from).collect())
            .unwrap_or_default();
        self.edited = false;
    }

    pub(crate) fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub(crate) fn params(&self) -> &[InputParam] {
        &self.params
    }

    pub(crate) fn focused(&self) -> Option<usize> {
        self.params.iter().position(|param| param.is_focus)
    }

    /// `InputChanged` holds from the first input until the next select or clear,
    /// even when every field has been emptied again.
    pub(crate) fn phase(&self) -> SessionPhase {
        match (&self.template, self.edited) {
            (None, _) => SessionPhase::Idle,
            (Some(_), false) => SessionPhase::ParamsInitialized,
            (Some(_), true) => SessionPhase::InputChanged,
        }
    }

    /// Appends a character to a param's input unless its type rejects it.
    pub(crate) fn push_char(&mut self, index: usize, ch: char) -> bool {
        let Some(param) = self.params.get(index) else {
            return false;
        };
        if !param.kind.accepts(ch) {
            return false;
        }
        let mut text = param.input_text.clone();
        text.push(ch);
        self.apply(SessionCommand::Input { index, text });
        true
    }

    pub(crate) fn backspace(&mut self, index: usize) {
        let Some(param) = self.params.get(index) else {
            return;
        };
        let mut text = param.input_text.clone();
        text.pop();
        self.apply(SessionCommand::Input { index, text });
    }

    #[allow(dead_code)]
    pub(crate) fn rendered(&self) -> Rendered {
        match &self.template {
            Some(template) => render(&template.content, &self.params),
            None => Rendered::default(),
        }
    }

    pub(crate) fn copy_text(&self) -> String {
        match &self.template {
            Some(template) => render_copy_text(&template.content, &self.params),
            None => String::new(),
        }
    }

    pub(crate) fn pieces(&self) -> Vec<Piece<'_>> {
        match &self.template {
            Some(template) => render_pieces(&template.content, &self.params),
            None => Vec::new(),
        }
    }
}

/// Editable copy of a template. Params follow the content on every change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TemplateDraft {
    pub(crate) id: Option<u32>,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) params: Vec<Param>,
    pub(crate) category_id: Option<u32>,
}

impl TemplateDraft {
    pub(crate) fn new(category_id: Option<u32>) -> Self {
        Self {
            category_id,
            ..Self::default()
        }
    }

    pub(crate) fn from_template(template: &Template) -> Self {
        let mut draft = Self {
            id: Some(template.id),
            title: template.title.clone(),
            content: String::new(),
            params: template.params.clone(),
            category_id: template.category_id,
        };
        draft.set_content(template.content.clone());
        draft
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
        self.sync();
    }

    pub(crate) fn push_content(&mut self, ch: char) {
        self.content.push(ch);
        self.sync();
    }

    pub(crate) fn pop_content(&mut self) {
        self.content.pop();
        self.sync();
    }

    pub(crate) fn set_param_type(&mut self, index: usize, kind: ParamType) {
        if let Some(param) = self.params.get_mut(index) {
            param.kind = kind;
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        Ok(())
    }

    fn sync(&mut self) {
        let tokens = extract_params(&self.content);
        self.params = sync_params(&tokens, &self.params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(content: &str) -> Template {
        Template {
            id: 7,
            title: "greeting".to_string(),
            content: content.to_string(),
            params: extract_params(content).iter().map(|token| Param::new(token)).collect(),
            category_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn session_walks_through_phases() {
        let mut session = FillSession::default();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.rendered(), Rendered::default());

        session.apply(SessionCommand::Select(template("Hi {name}")));
        assert_eq!(session.phase(), SessionPhase::ParamsInitialized);
        assert_eq!(session.rendered().copy_text, "Hi {name}");

        session.apply(SessionCommand::Input {
            index: 0,
            text: "Ann".to_string(),
        });
        assert_eq!(session.phase(), SessionPhase::InputChanged);
        assert_eq!(session.rendered().copy_text, "Hi Ann");

        session.apply(SessionCommand::Clear);
        assert_eq!(session.phase(), SessionPhase::ParamsInitialized);
        assert_eq!(session.rendered().copy_text, "Hi {name}");
        assert_eq!(session.focused(), None);
    }

    #[test]
    fn emptying_every_field_keeps_the_session_edited() {
        let mut session = FillSession::default();
        session.apply(SessionCommand::Select(template("Hi {name}")));
        assert!(session.push_char(0, 'A'));
        session.backspace(0);
        assert_eq!(session.params()[0].input_text, "");
        assert_eq!(session.phase(), SessionPhase::InputChanged);
        assert_eq!(session.copy_text(), "Hi {name}");

        session.apply(SessionCommand::Clear);
        assert_eq!(session.phase(), SessionPhase::ParamsInitialized);
        session.apply(SessionCommand::Select(template("{x}")));
        assert_eq!(session.phase(), SessionPhase::ParamsInitialized);
    }

    #[test]
    fn input_moves_focus_to_the_edited_param() {
        let mut session = FillSession::default();
        session.apply(SessionCommand::Select(template("{a} {b}")));
        session.apply(SessionCommand::Focus(0));
        session.apply(SessionCommand::Input {
            index: 1,
            text: "B".to_string(),
        });
        assert_eq!(session.focused(), Some(1));
        assert!(!session.params()[0].is_focus);
    }

    #[test]
    fn focus_and_blur_do_not_touch_values() {
        let mut session = FillSession::default();
        session.apply(SessionCommand::Select(template("{a} {b}")));
        session.apply(SessionCommand::Input {
            index: 0,
            text: "A".to_string(),
        });
        session.apply(SessionCommand::Focus(1));
        assert_eq!(
            session.rendered().display_html,
            "A <span class=\"focus\">{b}</span>"
        );
        session.apply(SessionCommand::Blur);
        assert_eq!(session.focused(), None);
        assert_eq!(session.rendered().display_html, "A {b}");
        assert_eq!(session.params()[0].input_text, "A");
    }

    #[test]
    fn out_of_range_commands_are_ignored() {
        let mut session = FillSession::default();
        session.apply(SessionCommand::Select(template("{a}")));
        session.apply(SessionCommand::Focus(5));
        session.apply(SessionCommand::Input {
            index: 5,
            text: "x".to_string(),
        });
        assert_eq!(session.focused(), None);
        assert_eq!(session.phase(), SessionPhase::ParamsInitialized);
        assert!(!session.push_char(5, 'x'));
    }

    #[test]
    fn select_resyncs_drifted_params() {
        let mut stale = template("{new} text");
        stale.params = vec![
            Param::new("{old}"),
            Param {
                value: "{new}".to_string(),
                kind: ParamType::Date,
            },
        ];
        let mut session = FillSession::default();
        session.apply(SessionCommand::Select(stale));
        assert_eq!(session.params().len(), 1);
        assert_eq!(session.params()[0].value, "{new}");
        assert_eq!(session.params()[0].kind, ParamType::Date);
    }

    #[test]
    fn selecting_another_template_resets_inputs() {
        let mut session = FillSession::default();
        session.apply(SessionCommand::Select(template("{a}")));
        session.push_char(0, 'x');
        session.apply(SessionCommand::Select(template("{a} again")));
        assert_eq!(session.params()[0].input_text, "");
        assert_eq!(session.rendered().copy_text, "{a} again");
    }

    #[test]
    fn typed_params_reject_foreign_characters() {
        let mut session = FillSession::default();
        let mut typed = template("call {tel}");
        typed.params[0].kind = ParamType::Tel;
        session.apply(SessionCommand::Select(typed));
        assert!(session.push_char(0, '0'));
        assert!(!session.push_char(0, 'x'));
        assert!(session.push_char(0, '1'));
        session.backspace(0);
        assert_eq!(session.rendered().copy_text, "call 0");
    }

    #[test]
    fn draft_keeps_param_types_across_content_edits() {
        let mut draft = TemplateDraft::from_template(&template("{x}"));
        draft.set_param_type(0, ParamType::Date);
        for ch in " {y".chars() {
            draft.push_content(ch);
        }
        assert_eq!(draft.params.len(), 1);
        draft.push_content('}');
        assert_eq!(draft.params.len(), 2);
        assert_eq!(draft.params[0].kind, ParamType::Date);
        assert_eq!(draft.params[1].kind, ParamType::String);

        draft.set_content("only {y}".to_string());
        assert_eq!(draft.params, vec![Param::new("{y}")]);
    }

    #[test]
    fn draft_requires_a_title() {
        let mut draft = TemplateDraft::new(None);
        assert!(matches!(draft.validate(), Err(AppError::Validation(_))));
        draft.title = "  ".to_string();
        assert!(draft.validate().is_err());
        draft.title = "ok".to_string();
        assert!(draft.validate().is_ok());
    }
}
