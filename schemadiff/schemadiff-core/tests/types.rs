use schemadiff_core::{
    CanonicalType, ChangeClass, SchemaError, Tag, build_union, classify_change, is_union,
    split_nullability, union_parts,
};

#[test]
fn is_union_detects_union_form_only() {
    assert!(is_union("union(int|str)"));
    assert!(!is_union("int"));
    assert!(!is_union("union"));
    assert!(!is_union("missing"));
}

#[test]
fn union_parts_decomposes_union_and_scalar() {
    assert_eq!(union_parts("union(int|missing)"), vec!["int", "missing"]);
    assert_eq!(union_parts("str"), vec!["str"]);
}

#[test]
fn build_union_sorts_and_dedupes() -> Result<(), SchemaError> {
    assert_eq!(build_union(["str", "int", "str"])?, "union(int|str)");
    assert_eq!(build_union(["int", "int"])?, "int");
    Ok(())
}

#[test]
fn build_union_absorbs_any_next_to_concrete_members() -> Result<(), SchemaError> {
    assert_eq!(build_union(["any", "int"])?, "int");
    assert_eq!(build_union(["any", "int", "missing"])?, "union(int|missing)");
    assert_eq!(build_union(["any"])?, "any");
    Ok(())
}

#[test]
fn build_union_absorbs_any_next_to_missing() -> Result<(), SchemaError> {
    assert_eq!(build_union(["any", "missing"])?, "missing");
    assert_eq!(
        CanonicalType::scalar(Tag::Any).with_missing(),
        CanonicalType::missing()
    );
    assert_eq!(split_nullability("missing")?, ("missing".to_string(), true));
    Ok(())
}

#[test]
fn build_union_flattens_nested_unions() -> Result<(), SchemaError> {
    assert_eq!(
        build_union(["union(int|str)", "union(bool|missing)"])?,
        "union(bool|int|missing|str)"
    );
    Ok(())
}

#[test]
fn build_union_rejects_empty_and_unknown_members() {
    assert_eq!(build_union(Vec::<&str>::new()), Err(SchemaError::EmptyUnion));
    assert!(matches!(
        build_union(["varchar"]),
        Err(SchemaError::MalformedType { .. })
    ));
}

#[test]
fn parse_rejects_degenerate_unions() {
    assert!("union(int)".parse::<CanonicalType>().is_err());
    assert!("union(int|int)".parse::<CanonicalType>().is_err());
    assert!("union()".parse::<CanonicalType>().is_err());
    assert!("union(int|)".parse::<CanonicalType>().is_err());
}

#[test]
fn parse_canonicalizes_member_order() -> Result<(), SchemaError> {
    let ty: CanonicalType = "union(str|int)".parse()?;
    assert_eq!(ty.to_string(), "union(int|str)");
    Ok(())
}

#[test]
fn split_nullability_strips_missing() -> Result<(), SchemaError> {
    assert_eq!(split_nullability("union(int|missing)")?, ("int".to_string(), true));
    assert_eq!(
        split_nullability("union(int|missing|str)")?,
        ("union(int|str)".to_string(), true)
    );
    assert_eq!(split_nullability("float")?, ("float".to_string(), false));
    Ok(())
}

#[test]
fn split_nullability_of_missing_alone_is_missing_and_nullable() -> Result<(), SchemaError> {
    assert_eq!(split_nullability("missing")?, ("missing".to_string(), true));
    Ok(())
}

#[test]
fn classify_change_separates_type_and_nullability() -> Result<(), SchemaError> {
    let class = classify_change("union(int|missing)", "int")?;
    assert!(!class.has_type_change);
    assert!(class.has_nullability_change);
    assert!(class.old_nullable);
    assert!(!class.new_nullable);
    assert!(class.is_presence_issue());

    let class = classify_change("union(int|missing)", "str")?;
    assert!(class.has_type_change);
    assert!(class.has_nullability_change);
    assert!(!class.is_presence_issue());
    assert_eq!(class.old_base, CanonicalType::scalar(Tag::Int));
    assert_eq!(class.new_base, CanonicalType::scalar(Tag::Str));
    Ok(())
}

#[test]
fn int_and_float_are_never_compatible() {
    let class = ChangeClass::new(&Tag::Int.into(), &Tag::Float.into());
    assert!(class.has_type_change);
    assert!(!class.has_nullability_change);
}

#[test]
fn canonical_type_serializes_as_string() -> Result<(), serde_json::Error> {
    let ty = CanonicalType::scalar(Tag::Str).with_missing();
    assert_eq!(serde_json::to_string(&ty)?, "\"union(missing|str)\"");
    let back: CanonicalType = serde_json::from_str("\"union(str|missing)\"")?;
    assert_eq!(back, ty);
    assert!(serde_json::from_str::<CanonicalType>("\"decimal\"").is_err());
    Ok(())
}
