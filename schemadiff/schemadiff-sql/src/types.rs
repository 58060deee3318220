//! SQL type expressions and their canonical mapping.
//!
//! Type expressions are parsed with `nom`. Supported forms:
//!
//! - named types with optional arguments: `VARCHAR(20)`, `DECIMAL(10, 2)`,
//!   `DOUBLE PRECISION`, `TIMESTAMP(3) WITH TIME ZONE`, `INT UNSIGNED`
//! - `ARRAY<T>` and the `T[]` suffix (repeatable)
//! - `STRUCT<name T, ...>` / `STRUCT<name: T, ...>`, fields optionally `NOT NULL`

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag_no_case, take_while, take_while1},
    character::complete::{char, digit0, multispace0, multispace1},
    combinator::{map, opt, recognize},
    error::{Error, ErrorKind},
    multi::{many0, separated_list1},
    sequence::{delimited, preceded, terminated, tuple},
};
use schemadiff_core::{RawNode, RequiredPathSet, Tag};
use tracing::warn;

use crate::SqlSourceError;

/// Parsed SQL column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    /// Scalar type name, lowercased, whitespace-normalized, arguments stripped.
    Named(String),
    Array(Box<SqlType>),
    Struct(Vec<StructField>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: SqlType,
    pub not_null: bool,
}

impl SqlType {
    /// Convert to a raw node rooted at `path`, recording `NOT NULL` struct
    /// fields in `required`.
    pub fn to_raw(&self, path: &str, required: &mut RequiredPathSet) -> RawNode {
        match self {
            SqlType::Named(name) => RawNode::tag(map_sql_type(name)),
            SqlType::Array(element) => RawNode::List(vec![element.to_raw(path, required)]),
            SqlType::Struct(fields) => RawNode::object(fields.iter().map(|field| {
                let field_path = format!("{path}.{}", field.name);
                if field.not_null {
                    required.insert(field_path.clone());
                }
                (field.name.as_str(), field.ty.to_raw(&field_path, required))
            })),
        }
    }
}

/// Map a scalar SQL type name to its canonical tag.
///
/// Unknown names map to `any` and are logged.
pub fn map_sql_type(name: &str) -> Tag {
    let name = name.trim().to_ascii_lowercase();
    let first = name
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    match first {
        "int" | "integer" | "int2" | "int4" | "int8" | "int16" | "int32" | "int64" | "smallint"
        | "bigint" | "tinyint" | "mediumint" | "serial" | "smallserial" | "bigserial"
        | "byteint" | "long" | "short" | "byte" => Tag::Int,
        "decimal" | "numeric" | "number" | "bignumeric" | "bigdecimal" | "float" | "float4"
        | "float8" | "float32" | "float64" | "double" | "real" | "money" | "smallmoney" => {
            Tag::Float
        }
        "char" | "character" | "national" | "varchar" | "nchar" | "nvarchar" | "varchar2"
        | "nvarchar2" | "text" | "tinytext" | "mediumtext" | "longtext" | "ntext" | "string"
        | "clob" | "nclob" | "citext" | "uuid" | "uniqueidentifier" | "bytea" | "bytes"
        | "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" | "enum"
        | "inet" | "cidr" | "xml" => Tag::Str,
        "bool" | "boolean" | "bit" => Tag::Bool,
        "date" | "time" | "timetz" | "datetime" | "datetime2" | "smalldatetime"
        | "datetimeoffset" | "timestamp" | "timestamptz" | "timestamp_tz" | "timestamp_ntz"
        | "timestamp_ltz" => Tag::Timestamp,
        "json" | "jsonb" | "variant" | "map" | "object" | "struct" | "record" | "super"
        | "hstore" => Tag::Object,
        "array" => Tag::Array,
        _ => {
            warn!(sql_type = %name, "unknown SQL type mapped to any");
            Tag::Any
        }
    }
}

/// Parse a complete SQL type expression.
pub fn parse_sql_type(text: &str) -> Result<SqlType, SqlSourceError> {
    let input = text.trim();
    match sql_type(input) {
        Ok((rest, ty)) if rest.trim().is_empty() => Ok(ty),
        Ok((rest, _)) => Err(SqlSourceError::InvalidType {
            input: input.to_string(),
            detail: format!("unexpected trailing text '{}'", rest.trim()),
        }),
        Err(e) => Err(SqlSourceError::InvalidType {
            input: input.to_string(),
            detail: e.to_string(),
        }),
    }
}

/// Parse a type expression at the start of `input`, leaving what follows it
/// (column constraints, a struct separator, ...).
pub(crate) fn sql_type(input: &str) -> IResult<&str, SqlType> {
    let (input, base) = alt((array_type, struct_type, named_type))(input)?;
    let (input, dims) = many0(preceded(
        multispace0,
        tuple((char('['), multispace0, digit0, multispace0, char(']'))),
    ))(input)?;
    let ty = dims
        .into_iter()
        .fold(base, |ty, _| SqlType::Array(Box::new(ty)));
    Ok((input, ty))
}

/// ARRAY<T>
fn array_type(input: &str) -> IResult<&str, SqlType> {
    map(
        tuple((
            tag_no_case("array"),
            multispace0,
            char('<'),
            multispace0,
            sql_type,
            multispace0,
            char('>'),
        )),
        |(_, _, _, _, element, _, _)| SqlType::Array(Box::new(element)),
    )(input)
}

/// STRUCT<a T, b U>
fn struct_type(input: &str) -> IResult<&str, SqlType> {
    map(
        tuple((
            tag_no_case("struct"),
            multispace0,
            char('<'),
            multispace0,
            separated_list1(tuple((multispace0, char(','), multispace0)), struct_field),
            multispace0,
            char('>'),
        )),
        |(_, _, _, _, fields, _, _)| SqlType::Struct(fields),
    )(input)
}

fn struct_field(input: &str) -> IResult<&str, StructField> {
    map(
        tuple((
            identifier,
            alt((
                recognize(tuple((multispace0, char(':'), multispace0))),
                multispace1,
            )),
            sql_type,
            opt(tuple((
                multispace1,
                tag_no_case("not"),
                multispace1,
                tag_no_case("null"),
            ))),
        )),
        |(name, _, ty, not_null)| StructField {
            name,
            ty,
            not_null: not_null.is_some(),
        },
    )(input)
}

/// A scalar type name: one word, optional arguments, then the modifier words
/// some dialects allow (`DOUBLE PRECISION`, `WITH TIME ZONE`, `UNSIGNED`).
fn named_type(input: &str) -> IResult<&str, SqlType> {
    map(
        tuple((
            word,
            opt(preceded(multispace0, type_arguments)),
            many0(preceded(multispace1, type_modifier)),
            opt(preceded(multispace0, type_arguments)),
        )),
        |(first, _, modifiers, _)| {
            let mut name = first.to_ascii_lowercase();
            for modifier in modifiers {
                name.push(' ');
                name.push_str(&modifier.to_ascii_lowercase());
            }
            SqlType::Named(name)
        },
    )(input)
}

fn type_arguments(input: &str) -> IResult<&str, &str> {
    delimited(char('('), take_while(|c| c != ')'), char(')'))(input)
}

fn type_modifier(input: &str) -> IResult<&str, &str> {
    terminated(
        alt((
            tag_no_case("precision"),
            tag_no_case("varying"),
            tag_no_case("without"),
            tag_no_case("with"),
            tag_no_case("local"),
            tag_no_case("time"),
            tag_no_case("zone"),
            tag_no_case("unsigned"),
            tag_no_case("signed"),
        )),
        keyword_boundary,
    )(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(is_ident_continue)(input)
}

/// A column or field name, bare or quoted with `"`, `` ` `` or `[]`.
pub(crate) fn identifier(input: &str) -> IResult<&str, String> {
    alt((
        map(delimited(char('"'), take_while(|c| c != '"'), char('"')), String::from),
        map(delimited(char('`'), take_while(|c| c != '`'), char('`')), String::from),
        map(delimited(char('['), take_while(|c| c != ']'), char(']')), String::from),
        map(word, String::from),
    ))(input)
}

fn keyword_boundary(input: &str) -> IResult<&str, ()> {
    if input.chars().next().is_some_and(is_ident_continue) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
    }
    Ok((input, ()))
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
