//! Person-name list parser using nom
//!
//! Grammar (each list must consume the whole, trimmed input):
//! ```text
//! last_first_list  := last_first (AND last_first)*
//! first_last_and   := first_last (AND first_last)*
//! first_last_list  := first_last (',' first_last)*
//!
//! last_first       := component ',' component (',' component)?
//! first_last       := word ws+ component   (word not followed by AND)
//! component        := (word | ws+ not starting an AND)*
//! word             := non-blank characters except ','
//! AND              := ws+ "and" ws+          (case-insensitive)
//! ```
//!
//! The three lists are tried in the order above and the first one that matches
//! the whole text wins. A `last_first` with three components is
//! "Last, von, First"; with two components it is "Last, First". No component
//! spans an AND, so a text holding AND is only ever read as an AND-joined list.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, not, opt, recognize},
    error::{Error as NomError, ErrorKind},
    multi::{many0, separated_list1},
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::error::{NameError, Result};

/// Characters that start a new word in [`format_name_for_display`].
const NAME_DELIMITERS: [char; 9] = [
    ' ', '\u{00A0}', '\t', '\n', '\r', '\u{000C}', '.', '-', '_',
];

/// One person name recognized in a name list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameFragment<'a> {
    pub first_name: &'a str,
    pub von_particle: Option<&'a str>,
    pub last_name: &'a str,
    /// Zero-based rank among the names reported for the same text
    pub position: usize,
}

/// Untrimmed name components as matched by the grammar
#[derive(Debug, Clone, Copy)]
struct RawName<'a> {
    first: &'a str,
    von: Option<&'a str>,
    last: &'a str,
}

/// Parse a list of person names, invoking `on_name` once per recognized name.
///
/// Returns the number of reported names. Empty text reports nothing. Names whose
/// first or last name is blank are skipped and not counted. Parsing is
/// all-or-nothing: when the text matches none of the grammars, the callback is
/// never invoked.
pub fn parse_names<'a, F>(text: &'a str, mut on_name: F) -> Result<usize>
where
    F: FnMut(NameFragment<'a>),
{
    let names = parse_name_list(text)?;
    let count = names.len();
    for name in names {
        on_name(name);
    }
    Ok(count)
}

/// Parse a list of person names into fragments.
pub fn parse_name_list(text: &str) -> Result<Vec<NameFragment<'_>>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let raw_names =
        recognize_names(text).ok_or_else(|| NameError::InvalidFormat(text.to_string()))?;

    let mut names = Vec::with_capacity(raw_names.len());
    for raw in raw_names {
        let first_name = raw.first.trim();
        let last_name = raw.last.trim();
        if first_name.is_empty() || last_name.is_empty() {
            continue;
        }
        names.push(NameFragment {
            first_name,
            von_particle: raw.von.map(str::trim).filter(|von| !von.is_empty()),
            last_name,
            position: names.len(),
        });
    }
    Ok(names)
}

/// Extract the first name from a single "First Last" or "Last, First" name.
pub fn parse_first_name(full_name: &str) -> Option<&str> {
    let name = full_name.trim();
    let first = match name.split_once(',') {
        Some((_, first)) => first.trim(),
        None => split_first_word(name).0,
    };
    (!first.is_empty()).then_some(first)
}

/// Extract the last name from a single "First Last" or "Last, First" name.
pub fn parse_last_name(full_name: &str) -> Option<&str> {
    let name = full_name.trim();
    let last = match name.split_once(',') {
        Some((last, _)) => last.trim(),
        None => split_first_word(name).1,
    };
    (!last.is_empty()).then_some(last)
}

/// Capitalize every word of a name, e.g. "jean-pierre DUPONT" -> "Jean-Pierre Dupont".
pub fn format_name_for_display(name: &str) -> String {
    let name = name.trim();
    let mut formatted = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if NAME_DELIMITERS.contains(&c) {
            formatted.push(c);
            at_word_start = true;
        } else if at_word_start {
            formatted.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            formatted.extend(c.to_lowercase());
        }
    }
    formatted
}

/// Split at the first whitespace run.
fn split_first_word(name: &str) -> (&str, &str) {
    match name.find(char::is_whitespace) {
        Some(index) => (&name[..index], name[index..].trim()),
        None => (name, ""),
    }
}

fn recognize_names(text: &str) -> Option<Vec<RawName<'_>>> {
    last_first_list(text)
        .or_else(|_| first_last_and_list(text))
        .or_else(|_| first_last_comma_list(text))
        .ok()
        .map(|(_, names)| names)
}

fn last_first_list(input: &str) -> IResult<&str, Vec<RawName<'_>>> {
    all_consuming(separated_list1(and_separator, last_first))(input)
}

fn first_last_and_list(input: &str) -> IResult<&str, Vec<RawName<'_>>> {
    all_consuming(separated_list1(and_separator, first_last))(input)
}

fn first_last_comma_list(input: &str) -> IResult<&str, Vec<RawName<'_>>> {
    all_consuming(separated_list1(
        delimited(multispace0, char(','), multispace0),
        first_last,
    ))(input)
}

/// `ws+ "and" ws+`, case-insensitive
fn and_separator(input: &str) -> IResult<&str, &str> {
    recognize(tuple((multispace1, tag_no_case("and"), multispace1)))(input)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ',' && !is_blank(c))(input)
}

/// Everything up to the next comma or AND separator
///
/// An AND is only looked for where a blank run starts.
fn component(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((
        word,
        preceded(not(and_separator), multispace1),
    ))))(input)
}

/// "Last, First" or "Last, von, First"
fn last_first(input: &str) -> IResult<&str, RawName<'_>> {
    let (input, leading) = component(input)?;
    let (input, middle) = preceded(char(','), component)(input)?;
    let (input, trailing) = opt(preceded(char(','), component))(input)?;

    let name = match trailing {
        Some(first) => RawName {
            first,
            von: Some(middle),
            last: leading,
        },
        None => RawName {
            first: middle,
            von: None,
            last: leading,
        },
    };
    Ok((input, name))
}

/// "First Last", split at the first whitespace run
fn first_last(input: &str) -> IResult<&str, RawName<'_>> {
    let (input, first) = preceded(multispace0, word)(input)?;
    not(and_separator)(input)?;
    let (input, _) = multispace1(input)?;
    let (rest, last) = component(input)?;
    if last.trim().is_empty() {
        return Err(nom::Err::Error(NomError::new(input, ErrorKind::Verify)));
    }
    Ok((
        rest,
        RawName {
            first,
            von: None,
            last,
        },
    ))
}
