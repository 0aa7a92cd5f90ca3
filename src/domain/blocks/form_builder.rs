// Form generation for form blocks

use serde::Serialize;

use super::schema::FormField;
use crate::domain::template::{Fragment, LocalScope, TemplateCompiler};

/// Represents a form field for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormVariable {
    pub name: String,
    pub label: String,
    pub is_required: bool,
    /// Compiled initial value, errors included
    pub fragments: Vec<Fragment>,
    /// Value the user already submitted, if any
    pub current_value: Option<String>,
}

impl FormVariable {
    pub fn has_error(&self) -> bool {
        self.fragments.iter().any(Fragment::is_error)
    }

    /// The text an input should start with: the submitted value if there is one,
    /// otherwise the compiled initial value
    pub fn input_value(&self) -> String {
        if let Some(current) = &self.current_value {
            return current.clone();
        }

        self.fragments
            .iter()
            .map(|fragment| match fragment {
                Fragment::Text { text } => text.as_str(),
                Fragment::Value { value } => value.as_str(),
                Fragment::Error { .. } => "",
            })
            .collect()
    }
}

/// Build form data from field definitions and previously submitted values.
///
/// Field values are compiled with `prefilled` as the `this` scope.
pub fn build_form_data(
    fields: &[FormField],
    compiler: &TemplateCompiler<'_>,
    prefilled: &LocalScope,
) -> Vec<FormVariable> {
    fields
        .iter()
        .map(|field| {
            let fragments = field
                .value
                .as_deref()
                .map(|value| compiler.compile_template_to_fragments(value, Some(prefilled)))
                .unwrap_or_default();

            let current_value = prefilled
                .get(&field.name)
                .and_then(crate::domain::template::stringify_value);

            FormVariable {
                name: field.name.clone(),
                label: field.label.clone().unwrap_or_else(|| field.name.clone()),
                is_required: field.required,
                fragments,
                current_value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::VariableContext;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn field(name: &str, value: Option<&str>, required: bool) -> FormField {
        FormField {
            name: name.to_string(),
            label: None,
            value: value.map(str::to_string),
            required,
        }
    }

    fn scope(value: Value) -> LocalScope {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_build_form_data_simple() {
        let compiler = TemplateCompiler::default();
        let form_data = build_form_data(&[field("page", None, true)], &compiler, &LocalScope::new());

        assert_eq!(form_data.len(), 1);
        assert_eq!(form_data[0].name, "page");
        assert_eq!(form_data[0].label, "page");
        assert!(form_data[0].is_required);
        assert_eq!(form_data[0].input_value(), "");
    }

    #[test]
    fn test_build_form_data_with_query_default() {
        let mut cache = HashMap::new();
        cache.insert("user".to_string(), json!({"name": "John"}));
        let compiler = TemplateCompiler::new(VariableContext::with_queries(&cache));

        let form_data = build_form_data(
            &[field("author", Some("{{query.user.name}}"), false)],
            &compiler,
            &LocalScope::new(),
        );

        assert!(!form_data[0].has_error());
        assert_eq!(form_data[0].input_value(), "John");
    }

    #[test]
    fn test_build_form_data_with_prefill() {
        let compiler = TemplateCompiler::default();
        let prefilled = scope(json!({"page": "test", "count": 3}));

        let form_data = build_form_data(
            &[field("page", None, true), field("summary", Some("{{this.count}} items"), false)],
            &compiler,
            &prefilled,
        );

        assert_eq!(form_data[0].current_value, Some("test".to_string()));
        assert_eq!(form_data[0].input_value(), "test");
        assert_eq!(form_data[1].input_value(), "3 items");
    }

    #[test]
    fn test_build_form_data_keeps_errors() {
        let compiler = TemplateCompiler::default();
        let form_data = build_form_data(
            &[field("author", Some("by {{query.user.name}}"), false)],
            &compiler,
            &LocalScope::new(),
        );

        assert!(form_data[0].has_error());
        assert_eq!(form_data[0].input_value(), "by ");
    }
}
