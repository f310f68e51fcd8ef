//! Dot-notation decoding.
//!
//! Turns flat keys such as `Filter.1.Name` / `Filter.1.Value.2` into a nested
//! [`Document`]. Numeric segments address sequence elements (1-based on the
//! command line), every other segment addresses a mapping entry.

use super::document::Document;
use super::errors::{ParamsError, ParamsResult};
use super::flat::FlatParams;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Name(&'a str),
    /// Zero-based.
    Index(usize),
}

impl<'a> Token<'a> {
    fn parse(segment: &'a str, key: &str) -> ParamsResult<Self> {
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Token::Name(segment));
        }

        let position: u64 = segment
            .parse()
            .map_err(|_| ParamsError::malformed(key))?;
        if position == 0 {
            return Err(ParamsError::InvalidListIndex(0));
        }

        usize::try_from(position - 1)
            .map(Token::Index)
            .map_err(|_| ParamsError::malformed(key))
    }
}

/// Decodes flat parameters into a nested document.
///
/// Keys are processed in ascending order of the full key string, so
/// `Param.1` is placed before `Param.2` regardless of how the map was built.
/// The order is lexicographic: `Param.10` sorts before `Param.2` and fails to
/// place because index 10 is not the next free slot.
pub fn decode(flat: &FlatParams) -> ParamsResult<Document> {
    let mut root = Document::empty();

    for (key, value) in flat.iter() {
        trace!(key, "placing parameter");
        let tokens: Vec<&str> = key.split('.').collect();
        place(&mut root, &tokens, value, key)?;
    }

    Ok(root)
}

fn place(node: &mut Document, tokens: &[&str], value: &str, key: &str) -> ParamsResult<()> {
    let Some((head, rest)) = tokens.split_first() else {
        *node = Document::string(value);
        return Ok(());
    };

    let child = match Token::parse(head, key)? {
        Token::Name(name) => match node {
            Document::Mapping(map) => map
                .entry(name.to_string())
                .or_insert_with(Document::empty),
            _ => return Err(ParamsError::malformed(key)),
        },
        Token::Index(index) => {
            if node.is_empty_mapping() {
                *node = Document::Sequence(Vec::new());
            }
            match node {
                Document::Sequence(items) => {
                    if index == items.len() {
                        items.push(Document::empty());
                    } else if index > items.len() {
                        return Err(ParamsError::malformed(key));
                    }
                    &mut items[index]
                }
                _ => return Err(ParamsError::malformed(key)),
            }
        }
    };

    place(child, rest, value, key)
}
