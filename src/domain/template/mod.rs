// Template module for `{{namespace.id.pointer}}` variable templating
//
// This module provides parsing of template strings, resolution of variable
// references against layered data sources, and compilation into render
// fragments or fully interpolated strings.

mod ast;
mod compiler;
mod context;
mod json_path;
mod parser;
mod resolver;

pub use ast::{Namespace, Segment, VariableReference};
pub use compiler::{Fragment, InterpolationError, TemplateCompiler};
pub use context::{LocalScope, LoopStore, NoQueries, QueryCache, QueryState, Registration, VariableContext};
pub use json_path::{get_value_from_json_path, JsonPathError};
pub use parser::{parse_template_string, parse_variable, variable_tokens};
pub use resolver::{stringify_value, RefineError, Renderable, ResolveVariableError, VariableResolver};
