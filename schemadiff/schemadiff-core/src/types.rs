//! Canonical type vocabulary and union combinators.
//!
//! Internally a type is a sorted set of [`Tag`]s. The `union(a|b)` string form
//! only exists at the adapter and report boundary; the free functions at the
//! bottom of this module operate on that form.

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::SchemaError;

const UNION_PREFIX: &str = "union(";
const UNION_SUFFIX: &str = ")";
const UNION_SEPARATOR: char = '|';

/// One member of the canonical type vocabulary.
///
/// Variants are declared in lexical order of their names so the derived
/// `Ord` sorts union members the same way their rendered form does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Any,
    Array,
    Bool,
    Float,
    Int,
    Missing,
    Object,
    Str,
    Timestamp,
}

impl Tag {
    pub const ALL: [Tag; 9] = [
        Tag::Any,
        Tag::Array,
        Tag::Bool,
        Tag::Float,
        Tag::Int,
        Tag::Missing,
        Tag::Object,
        Tag::Str,
        Tag::Timestamp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tag::Any => "any",
            Tag::Array => "array",
            Tag::Bool => "bool",
            Tag::Float => "float",
            Tag::Int => "int",
            Tag::Missing => "missing",
            Tag::Object => "object",
            Tag::Str => "str",
            Tag::Timestamp => "timestamp",
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl FromStr for Tag {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .iter()
            .copied()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| SchemaError::MalformedType {
                input: s.to_string(),
                detail: "unknown type tag".to_string(),
            })
    }
}

/// A canonical type: one tag, or a union of at least two distinct tags.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalType(BTreeSet<Tag>);

impl CanonicalType {
    pub fn scalar(tag: Tag) -> Self {
        Self(BTreeSet::from([tag]))
    }

    pub fn missing() -> Self {
        Self::scalar(Tag::Missing)
    }

    /// Build a type from any number of tags, applying `any` absorption.
    ///
    /// Returns `None` for an empty tag list.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Option<Self> {
        let mut set: BTreeSet<Tag> = tags.into_iter().collect();
        if set.is_empty() {
            return None;
        }
        if set.len() > 1 {
            set.remove(&Tag::Any);
        }
        Some(Self(set))
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_union(&self) -> bool {
        self.0.len() > 1
    }

    pub fn is_nullable(&self) -> bool {
        self.contains(Tag::Missing)
    }

    /// Union of `self` and `other`.
    pub fn merge(&self, other: &CanonicalType) -> CanonicalType {
        Self::from_tags(self.tags().chain(other.tags())).unwrap_or_else(|| self.clone())
    }

    pub fn with_missing(&self) -> CanonicalType {
        self.merge(&Self::missing())
    }

    /// Strip `missing`, returning the remaining base type and whether it was present.
    ///
    /// The degenerate all-missing type returns itself with `true`.
    pub fn split_nullability(&self) -> (CanonicalType, bool) {
        if !self.is_nullable() {
            return (self.clone(), false);
        }
        match Self::from_tags(self.tags().filter(|t| *t != Tag::Missing)) {
            Some(base) => (base, true),
            None => (self.clone(), true),
        }
    }
}

impl Display for CanonicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if !self.is_union() {
            if let Some(tag) = self.0.first() {
                return f.write_str(tag.name());
            }
        }
        f.write_str(UNION_PREFIX)?;
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{UNION_SEPARATOR}")?;
            }
            f.write_str(tag.name())?;
        }
        f.write_str(UNION_SUFFIX)
    }
}

impl FromStr for CanonicalType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !is_union(s) {
            return s.parse::<Tag>().map(Self::scalar);
        }

        let malformed = |detail: &str| SchemaError::MalformedType {
            input: s.to_string(),
            detail: detail.to_string(),
        };
        let members = union_parts(s)
            .iter()
            .map(|part| part.trim().parse::<Tag>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        if members.len() < 2 {
            return Err(malformed("a union needs at least two distinct members"));
        }
        Self::from_tags(members).ok_or_else(|| malformed("empty union"))
    }
}

impl From<Tag> for CanonicalType {
    fn from(tag: Tag) -> Self {
        Self::scalar(tag)
    }
}

impl From<CanonicalType> for String {
    fn from(value: CanonicalType) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for CanonicalType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Outcome of comparing two types once nullability is factored out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeClass {
    pub has_type_change: bool,
    pub has_nullability_change: bool,
    pub old_base: CanonicalType,
    pub new_base: CanonicalType,
    pub old_nullable: bool,
    pub new_nullable: bool,
}

impl ChangeClass {
    pub fn new(old: &CanonicalType, new: &CanonicalType) -> Self {
        let (old_base, old_nullable) = old.split_nullability();
        let (new_base, new_nullable) = new.split_nullability();
        Self {
            has_type_change: old_base != new_base,
            has_nullability_change: old_nullable != new_nullable,
            old_base,
            new_base,
            old_nullable,
            new_nullable,
        }
    }

    /// Only the nullability differs.
    pub fn is_presence_issue(&self) -> bool {
        self.has_nullability_change && !self.has_type_change
    }
}

/// True iff `s` has the `union(...)` form.
pub fn is_union(s: &str) -> bool {
    s.len() >= UNION_PREFIX.len() + UNION_SUFFIX.len()
        && s.starts_with(UNION_PREFIX)
        && s.ends_with(UNION_SUFFIX)
}

/// Members of a union string, or the string itself for a non-union.
pub fn union_parts(s: &str) -> Vec<String> {
    if !is_union(s) {
        return vec![s.to_string()];
    }
    s[UNION_PREFIX.len()..s.len() - UNION_SUFFIX.len()]
        .split(UNION_SEPARATOR)
        .map(str::to_string)
        .collect()
}

/// Sort, dedupe and absorb `any`; render a bare tag when one member remains.
///
/// Parts may themselves be unions; their members are flattened in.
pub fn build_union<I, S>(parts: I) -> Result<String, SchemaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags = Vec::new();
    for part in parts {
        let ty: CanonicalType = part.as_ref().parse()?;
        tags.extend(ty.tags());
    }
    CanonicalType::from_tags(tags)
        .map(|ty| ty.to_string())
        .ok_or(SchemaError::EmptyUnion)
}

/// String form of [`CanonicalType::split_nullability`].
pub fn split_nullability(ty: &str) -> Result<(String, bool), SchemaError> {
    let (base, nullable) = ty.parse::<CanonicalType>()?.split_nullability();
    Ok((base.to_string(), nullable))
}

/// String form of [`ChangeClass::new`].
pub fn classify_change(old: &str, new: &str) -> Result<ChangeClass, SchemaError> {
    Ok(ChangeClass::new(&old.parse()?, &new.parse()?))
}
