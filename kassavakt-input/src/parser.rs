//! Line tokenizer built on nom.

use nom::character::complete::{digit1, multispace0, multispace1};
use nom::combinator::{all_consuming, map_res};
use nom::multi::separated_list1;
use nom::sequence::delimited;
use nom::{IResult, Parser};

use kassavakt_core::Units;

use crate::error::InputError;

/// One non-blank record and the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    pub number: usize,
    pub values: Vec<Units>,
}

fn integers(input: &str) -> IResult<&str, Vec<Units>> {
    delimited(
        multispace0,
        separated_list1(multispace1, map_res(digit1, str::parse::<Units>)),
        multispace0,
    )
    .parse(input)
}

/// Splits the input into records, dropping comments and blank lines.
pub(crate) fn records(input: &str) -> Result<Vec<Line>, InputError> {
    let mut lines = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let number = index + 1;
        let content = raw.split_once('#').map_or(raw, |(before, _)| before);
        if content.trim().is_empty() {
            continue;
        }

        let (_, values) = all_consuming(integers)
            .parse(content)
            .map_err(|_| InputError::InvalidInteger {
                line: number,
                token: first_bad_token(content),
            })?;
        lines.push(Line { number, values });
    }
    Ok(lines)
}

fn first_bad_token(content: &str) -> String {
    content
        .split_whitespace()
        .find(|token| token.parse::<Units>().is_err())
        .unwrap_or(content.trim())
        .to_string()
}
