//! `CREATE TABLE` adapter.

use std::collections::BTreeMap;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0, multispace1},
    combinator::opt,
    multi::separated_list1,
    sequence::tuple,
};
use schemadiff_core::{RawNode, RawSchema, RequiredPathSet};
use tracing::debug;

use crate::{
    SqlSourceError,
    types::{identifier, sql_type},
};

/// Which table of a DDL script to read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DdlOptions {
    /// Table name, matched case-insensitively on its last dotted segment.
    /// Required when the script defines more than one table.
    pub table: Option<String>,
}

/// One `CREATE TABLE` statement: qualified name and column list body.
struct TableDef<'a> {
    name: String,
    body: &'a str,
}

/// Read one table of a DDL script.
///
/// Columns declared `NOT NULL` or `PRIMARY KEY`, and columns named by a
/// `PRIMARY KEY (...)` table constraint, are required.
pub fn ddl_to_schema(text: &str, options: &DdlOptions) -> Result<RawSchema, SqlSourceError> {
    let text = strip_comments(text);
    let tables: Vec<TableDef<'_>> = split_statements(&text)
        .into_iter()
        .filter_map(table_def)
        .collect();
    debug!(tables = tables.len(), "parsed DDL statements");

    let table = select_table(tables, options.table.as_deref())?;
    let mut fields = BTreeMap::new();
    let mut required = RequiredPathSet::new();

    for item in split_top_level(table.body, ',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if is_table_constraint(item) {
            required.extend(primary_key_columns(item));
            continue;
        }

        let (rest, (name, _, ty)) = tuple((identifier, multispace0, sql_type))(item).map_err(
            |e| SqlSourceError::InvalidStatement {
                table: table.name.clone(),
                detail: format!("cannot parse column '{item}': {e}"),
            },
        )?;
        if has_keywords(rest, &["NOT", "NULL"]) || has_keywords(rest, &["PRIMARY", "KEY"]) {
            required.insert(name.clone());
        }
        let node = ty.to_raw(&name, &mut required);
        fields.insert(name, node);
    }

    if fields.is_empty() {
        return Err(SqlSourceError::InvalidStatement {
            table: table.name,
            detail: "no columns".to_string(),
        });
    }
    Ok(RawSchema::new(RawNode::Object(fields), required, table.name))
}

fn select_table<'a>(
    mut tables: Vec<TableDef<'a>>,
    wanted: Option<&str>,
) -> Result<TableDef<'a>, SqlSourceError> {
    let candidates = || tables.iter().map(|t| t.name.clone()).collect::<Vec<_>>();

    let Some(wanted) = wanted else {
        return match tables.len() {
            0 => Err(SqlSourceError::NoTables),
            1 => Ok(tables.remove(0)),
            _ => Err(SqlSourceError::AmbiguousTable {
                candidates: candidates(),
            }),
        };
    };
    if tables.is_empty() {
        return Err(SqlSourceError::NoTables);
    }

    let matching: Vec<usize> = tables
        .iter()
        .enumerate()
        .filter(|(_, t)| last_segment(&t.name).eq_ignore_ascii_case(last_segment(wanted)))
        .map(|(i, _)| i)
        .collect();
    let exact = matching
        .iter()
        .copied()
        .find(|&i| tables[i].name.eq_ignore_ascii_case(wanted));

    let single = match matching.as_slice() {
        [i] => Some(*i),
        _ => None,
    };
    if let Some(i) = exact.or(single) {
        return Ok(tables.swap_remove(i));
    }
    if matching.is_empty() {
        Err(SqlSourceError::TableNotFound {
            table: wanted.to_string(),
            candidates: candidates(),
        })
    } else {
        Err(SqlSourceError::AmbiguousTable {
            candidates: matching.iter().map(|&i| tables[i].name.clone()).collect(),
        })
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `CREATE [OR REPLACE] [TEMP|TEMPORARY] TABLE [IF NOT EXISTS] name (`
fn create_table_header(input: &str) -> IResult<&str, Vec<String>> {
    let (input, _) = tuple((multispace0, tag_no_case("create"), multispace1))(input)?;
    let (input, _) = opt(tuple((
        tag_no_case("or"),
        multispace1,
        tag_no_case("replace"),
        multispace1,
    )))(input)?;
    let (input, _) = opt(tuple((
        alt((tag_no_case("temporary"), tag_no_case("temp"))),
        multispace1,
    )))(input)?;
    let (input, _) = tuple((tag_no_case("table"), multispace1))(input)?;
    let (input, _) = opt(tuple((
        tag_no_case("if"),
        multispace1,
        tag_no_case("not"),
        multispace1,
        tag_no_case("exists"),
        multispace1,
    )))(input)?;
    let (input, name) = separated_list1(char('.'), identifier)(input)?;
    let (input, _) = tuple((multispace0, char('(')))(input)?;
    Ok((input, name))
}

fn table_def(statement: &str) -> Option<TableDef<'_>> {
    let (rest, name) = create_table_header(statement).ok()?;
    let end = matching_close(rest)?;
    Some(TableDef {
        name: name.join("."),
        body: &rest[..end],
    })
}

/// Byte offset of the `)` closing an already opened parenthesis.
fn matching_close(input: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_table_constraint(item: &str) -> bool {
    let first = item
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    matches!(
        first.as_str(),
        "PRIMARY" | "CONSTRAINT" | "UNIQUE" | "FOREIGN" | "CHECK" | "INDEX" | "KEY" | "EXCLUDE"
    ) || first.starts_with("PRIMARY(")
}

/// Columns listed by a `[CONSTRAINT name] PRIMARY KEY (a, b)` clause.
fn primary_key_columns(item: &str) -> Vec<String> {
    let upper = item.to_ascii_uppercase();
    let Some(at) = upper.find("PRIMARY KEY") else {
        return Vec::new();
    };
    let rest = &item[at + "PRIMARY KEY".len()..];
    let Some(open) = rest.find('(') else {
        return Vec::new();
    };
    let inner = &rest[open + 1..];
    let Some(close) = matching_close(inner) else {
        return Vec::new();
    };
    split_top_level(&inner[..close], ',')
        .into_iter()
        .filter_map(|column| identifier(column.trim()).ok().map(|(_, name)| name))
        .collect()
}

fn has_keywords(text: &str, keywords: &[&str]) -> bool {
    let words: Vec<String> = text
        .split(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')')
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_uppercase)
        .collect();
    words
        .windows(keywords.len())
        .any(|window| window.iter().zip(keywords).all(|(w, k)| w == k))
}

/// Split on `separator` outside quotes and brackets.
///
/// `<` only opens a bracket right after a word (`ARRAY<`, `STRUCT<`), so
/// comparisons in `CHECK` clauses do not unbalance the split.
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut open: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut prev = ' ';
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(' | '[') => open.push(c),
            (None, '<') if prev.is_ascii_alphanumeric() => open.push(c),
            (None, '>') if open.last() == Some(&'<') => {
                open.pop();
            }
            (None, ')' | ']') => {
                while let Some(opener) = open.pop() {
                    if opener != '<' {
                        break;
                    }
                }
            }
            (None, c) if c == separator && open.is_empty() => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
        prev = c;
    }
    parts.push(&input[start..]);
    parts
}

fn split_statements(text: &str) -> Vec<&str> {
    split_top_level(text, ';')
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Remove `-- ...` and `/* ... */` comments outside quoted text.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}
