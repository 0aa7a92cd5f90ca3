// Template partials shared across handlers

use askama::Template;

use crate::domain::template::{Fragment, Renderable};

#[derive(Template)]
#[template(path = "partials/fragments.html")]
pub struct FragmentsTemplate {
    pub fragments: Vec<FragmentDisplay>,
}

pub struct FragmentDisplay {
    /// Resolved text, or the failing token for errors
    pub text: String,
    pub is_error: bool,
    pub is_json: bool,
    pub code: &'static str,
    pub message: String,
}

impl From<&Fragment> for FragmentDisplay {
    fn from(fragment: &Fragment) -> Self {
        match fragment {
            Fragment::Text { text } => FragmentDisplay {
                text: text.clone(),
                is_error: false,
                is_json: false,
                code: "",
                message: String::new(),
            },
            Fragment::Value { value } => FragmentDisplay {
                text: value.as_str().to_string(),
                is_error: false,
                is_json: matches!(value, Renderable::Json(_)),
                code: "",
                message: String::new(),
            },
            Fragment::Error { token, error } => FragmentDisplay {
                text: token.clone(),
                is_error: true,
                is_json: false,
                code: error.code(),
                message: error.to_string(),
            },
        }
    }
}

/// Render compiled fragments to HTML, unresolved tokens marked inline
pub fn render_fragments(fragments: &[Fragment]) -> askama::Result<String> {
    FragmentsTemplate {
        fragments: fragments.iter().map(FragmentDisplay::from).collect(),
    }
    .render()
}
