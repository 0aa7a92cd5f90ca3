// Domain model: template variables and the blocks that consume them

pub mod blocks;
pub mod template;

pub use blocks::{Block, BlockCompiler, Page, RenderedBlock};
pub use template::{TemplateCompiler, VariableContext, VariableResolver};
