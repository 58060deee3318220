//! Line parser for the `printSchema()` tree.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, space0},
    combinator::{map, value},
    multi::many1,
    sequence::{delimited, preceded, tuple},
};

use crate::SparkSchemaError;

/// One printed field with its nested lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PrintedField {
    pub name: String,
    pub type_name: String,
    /// `nullable` / `containsNull` / `valueContainsNull`; `None` for map keys.
    pub nullable: Option<bool>,
    pub children: Vec<PrintedField>,
    pub line: usize,
}

pub(crate) fn parse_print_schema(text: &str) -> Result<Vec<PrintedField>, SparkSchemaError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end()))
        .filter(|(_, line)| !line.trim().is_empty());

    match lines.next() {
        Some((_, "root")) => {}
        Some((line, found)) => {
            return Err(SparkSchemaError::MissingRoot {
                line,
                found: found.trim().to_string(),
            });
        }
        None => {
            return Err(SparkSchemaError::MissingRoot {
                line: 1,
                found: String::new(),
            });
        }
    }

    let mut roots = Vec::new();
    let mut stack: Vec<PrintedField> = Vec::new();

    for (line_no, line) in lines {
        let (depth, field) = parse_field_line(line, line_no)?;

        while stack.len() >= depth {
            close_innermost(&mut stack, &mut roots);
        }
        if depth != stack.len() + 1 {
            return Err(SparkSchemaError::InvalidLine {
                line: line_no,
                detail: format!("unexpected indentation depth {depth}"),
            });
        }
        if let Some(parent) = stack.last() {
            if !matches!(parent.type_name.as_str(), "struct" | "array" | "map") {
                return Err(SparkSchemaError::InvalidLine {
                    line: line_no,
                    detail: format!(
                        "field '{}' of type {} cannot have nested fields",
                        parent.name, parent.type_name
                    ),
                });
            }
        }
        stack.push(field);
    }
    while !stack.is_empty() {
        close_innermost(&mut stack, &mut roots);
    }

    Ok(roots)
}

fn close_innermost(stack: &mut Vec<PrintedField>, roots: &mut Vec<PrintedField>) {
    if let Some(field) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(field),
            None => roots.push(field),
        }
    }
}

/// ` |    |-- name: type (nullable = true)` → (depth, field)
fn parse_field_line(line: &str, line_no: usize) -> Result<(usize, PrintedField), SparkSchemaError> {
    let invalid = |detail: String| SparkSchemaError::InvalidLine {
        line: line_no,
        detail,
    };

    let (rest, bars) = tree_prefix(line).map_err(|_| {
        invalid(format!(
            "expected a ' |-- name: type' field line, found '{}'",
            line.trim()
        ))
    })?;
    let (body, nullable) = split_nullability_suffix(rest);
    let (name, type_name) = body
        .rsplit_once(": ")
        .or_else(|| body.rsplit_once(':'))
        .ok_or_else(|| invalid(format!("missing ':' between name and type in '{body}'")))?;

    let type_name = type_name.trim();
    if type_name.is_empty() {
        return Err(invalid(format!("missing type for field '{}'", name.trim())));
    }

    Ok((
        bars,
        PrintedField {
            name: name.to_string(),
            type_name: type_name.to_ascii_lowercase(),
            nullable,
            children: Vec::new(),
            line: line_no,
        },
    ))
}

/// Leading ` |` markers followed by `-- `; returns the marker count.
fn tree_prefix(input: &str) -> IResult<&str, usize> {
    map(
        tuple((many1(preceded(space0, char('|'))), tag("-- "))),
        |(bars, _)| bars.len(),
    )(input)
}

/// Strip a trailing `(nullable = bool)`-style attribute.
fn split_nullability_suffix(body: &str) -> (&str, Option<bool>) {
    if let Some(open) = body.rfind(" (") {
        if let Ok((rest, flag)) = nullability_attribute(&body[open + 1..]) {
            if rest.trim().is_empty() {
                return (&body[..open], Some(flag));
            }
        }
    }
    (body, None)
}

fn nullability_attribute(input: &str) -> IResult<&str, bool> {
    delimited(
        char('('),
        map(
            tuple((
                take_while1(|c: char| c.is_ascii_alphabetic()),
                space0,
                char('='),
                space0,
                alt((value(true, tag("true")), value(false, tag("false")))),
            )),
            |(_, _, _, _, flag)| flag,
        ),
        char(')'),
    )(input)
}
