//! Turning a comma/pipe expression into sequence sections.

use parsegen::SequenceSection;

use crate::error::Result;
use crate::parser::{self, Class};

/// Build the sections described by `text`, e.g. `a,b|&c,d/Opt/Rep`.
///
/// Commas start a new section and pipes separate alternatives within one.
/// A leading `&` or `@` forces the class of an alternative, otherwise
/// `classify` decides. A section is optional or repeating when any of its
/// alternatives carries `/Opt` or `/Rep`.
pub fn build_sections<F>(text: &str, classify: F) -> Result<Vec<SequenceSection>>
where
    F: Fn(&str) -> Class,
{
    let (_, parsed) = parser::sections(text)?;

    let sections = parsed
        .into_iter()
        .map(|(item, alternatives)| {
            let mut section = SequenceSection {
                ebnf_item: item.to_owned(),
                ..Default::default()
            };
            for alt in alternatives {
                section.is_optional |= alt.optional;
                section.is_repeating |= alt.repeating;
                match alt.forced.unwrap_or_else(|| classify(&alt.name)) {
                    Class::Token => section.tokens.push(alt.name),
                    Class::Sequence => section.sequences.push(alt.name),
                }
            }
            section
        })
        .collect();

    Ok(sections)
}
