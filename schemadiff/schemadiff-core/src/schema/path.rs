use std::fmt::{Display, Formatter, Result};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Field(String),
    /// Any element of an array.
    Element,
}

/// Structured location of a node inside a [`SchemaTree`](super::SchemaTree).
///
/// Rendered as dotted notation only when it leaves the core: fields are joined
/// with `.`, an element step is appended as `[]` (`items[].sku`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.into()));
        Self(segments)
    }

    pub fn element(&self) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Element);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Last field name on the path, skipping element steps.
    pub fn leaf_name(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|segment| match segment {
            PathSegment::Field(name) => Some(name.as_str()),
            PathSegment::Element => None,
        })
    }

    /// Dotted field names without element markers, the form used by
    /// [`RequiredPathSet`](crate::RequiredPathSet).
    pub fn required_key(&self) -> String {
        self.0
            .iter()
            .filter_map(|segment| match segment {
                PathSegment::Field(name) => Some(name.as_str()),
                PathSegment::Element => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut first = true;
        for segment in &self.0 {
            match segment {
                PathSegment::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Element => f.write_str("[]")?,
            }
            first = false;
        }
        Ok(())
    }
}
