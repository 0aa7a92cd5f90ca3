// Template-string compilation into render fragments or plain strings

use serde::Serialize;
use thiserror::Error;

use super::ast::Segment;
use super::context::{LocalScope, VariableContext};
use super::parser::parse_template_string;
use super::resolver::{RefineError, Renderable, VariableResolver};

/// One piece of a compiled template
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Fragment {
    Text {
        text: String,
    },
    Value {
        value: Renderable,
    },
    /// A token that failed to resolve, kept in place for inline highlighting
    Error {
        token: String,
        error: RefineError,
    },
}

impl Fragment {
    pub fn is_error(&self) -> bool {
        matches!(self, Fragment::Error { .. })
    }
}

/// A token that stopped string interpolation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not resolve '{{{{{token}}}}}': {source}")]
pub struct InterpolationError {
    pub token: String,
    pub source: RefineError,
}

impl InterpolationError {
    pub fn code(&self) -> &'static str {
        self.source.code()
    }
}

/// Compiles template strings against one variable context
#[derive(Clone)]
pub struct TemplateCompiler<'a> {
    resolver: VariableResolver<'a>,
}

impl<'a> TemplateCompiler<'a> {
    pub fn new(context: VariableContext<'a>) -> Self {
        Self {
            resolver: VariableResolver::new(context),
        }
    }

    pub fn resolver(&self) -> &VariableResolver<'a> {
        &self.resolver
    }

    /// Compile for display. Every token is resolved on its own; failures
    /// become `Fragment::Error` and never hide the surrounding text.
    pub fn compile_template_to_fragments(
        &self,
        value: &str,
        local: Option<&LocalScope>,
    ) -> Vec<Fragment> {
        parse_template_string(value, |token, _| {
            match self.resolver.as_renderable(token, local) {
                Ok(value) => Fragment::Value { value },
                Err(error) => Fragment::Error {
                    token: token.to_string(),
                    error,
                },
            }
        })
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) if text.is_empty() => None,
            Segment::Text(text) => Some(Fragment::Text { text }),
            Segment::Match(fragment) => Some(fragment),
        })
        .collect()
    }

    /// Interpolate every token into a flat string.
    ///
    /// There is no way to mark a failed token inside plain text, so the first
    /// failure aborts the whole interpolation and later tokens are not resolved.
    pub fn interpolate_to_string(
        &self,
        value: &str,
        local: Option<&LocalScope>,
    ) -> Result<String, InterpolationError> {
        let mut failed = false;
        let segments = parse_template_string(value, |token, _| {
            if failed {
                return None;
            }
            let resolved = self
                .resolver
                .as_string_compatible(token, local)
                .map_err(|source| InterpolationError {
                    token: token.to_string(),
                    source,
                });
            failed = resolved.is_err();
            Some(resolved)
        });

        let mut result = String::new();
        for segment in segments {
            match segment {
                Segment::Text(text) => result.push_str(&text),
                Segment::Match(Some(resolved)) => result.push_str(&resolved?),
                Segment::Match(None) => {}
            }
        }

        Ok(result)
    }
}

impl Default for TemplateCompiler<'_> {
    fn default() -> Self {
        Self::new(VariableContext::empty())
    }
}
