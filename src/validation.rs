// Validation functions for page definitions
// Rejects pages the block compiler cannot render safely

use std::collections::HashSet;

use crate::domain::blocks::{data_reference, Block, Page, PageError};
use crate::domain::template::{parse_variable, variable_tokens, Namespace};

/// Validate a page before it is rendered
///
/// - block ids are unique across the whole page and usable as a variable id
/// - the `this` namespace only appears inside form blocks
/// - form blocks sit at the top level of the page
pub fn validate_page(page: &Page) -> Result<(), PageError> {
    let mut seen = HashSet::new();
    validate_blocks(&page.blocks, &mut seen, true)
}

fn validate_blocks<'p>(
    blocks: &'p [Block],
    seen: &mut HashSet<&'p str>,
    top_level: bool,
) -> Result<(), PageError> {
    for block in blocks {
        if let Some(id) = block.id() {
            if !is_valid_block_id(id) {
                return Err(PageError::InvalidBlockId(id.to_string()));
            }
            if !seen.insert(id) {
                return Err(PageError::DuplicateBlockId(id.to_string()));
            }
        }

        match block {
            Block::Text { content } => reject_local_scope(content)?,
            Block::Loop { data, blocks, .. } => {
                reject_local_reference(data_reference(data))?;
                validate_blocks(blocks, seen, false)?;
            }
            Block::Table { data, columns, .. } => {
                reject_local_reference(data_reference(data))?;
                for column in columns {
                    reject_local_scope(&column.header)?;
                    reject_local_scope(&column.cell)?;
                }
            }
            Block::Form { id, .. } => {
                if !top_level {
                    return Err(PageError::NestedForm(id.clone()));
                }
            }
        }
    }

    Ok(())
}

/// Check if a block id can be addressed as `namespace.id`
fn is_valid_block_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('.') && !id.chars().any(|c| c.is_whitespace() || c == '{' || c == '}')
}

// Outside forms nothing supplies a local scope, so a `this` reference there
// would be an integration bug at render time
fn reject_local_scope(template: &str) -> Result<(), PageError> {
    variable_tokens(template)
        .into_iter()
        .try_for_each(reject_local_reference)
}

fn reject_local_reference(reference: &str) -> Result<(), PageError> {
    if parse_variable(reference).namespace == Some(Namespace::This) {
        return Err(PageError::LocalScopeOutsideForm {
            token: reference.to_string(),
        });
    }
    Ok(())
}
