// Block compiler for declarative pages
//
// Pages are lists of text, loop, table and form blocks. Loops and tables
// register their data in the `loop` namespace and expose the current element
// to their children through the `item` namespace.

mod compiler;
mod error;
mod form_builder;
mod schema;

pub use compiler::{BlockCompiler, RenderedBlock};
pub(crate) use compiler::data_reference;
pub use error::{FormError, PageError};
pub use form_builder::{build_form_data, FormVariable};
pub use schema::{Block, FormField, Page, TableColumn};
