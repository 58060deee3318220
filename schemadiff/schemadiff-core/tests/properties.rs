use std::collections::BTreeMap;

use proptest::{collection, prelude::*, sample};
use schemadiff_core::{
    CanonicalType, CompareOptions, FieldPath, RequiredPathSet, SchemaNode, SchemaTree, Tag,
    build_union, compare, diff_trees, filter_tree, inject_presence, union_parts,
};

const NAMES: [&str; 5] = ["a", "b", "id", "name", "x"];

fn arb_type() -> impl Strategy<Value = CanonicalType> {
    sample::subsequence(Tag::ALL.to_vec(), 1..=3)
        .prop_filter_map("non-empty tag set", CanonicalType::from_tags)
}

fn arb_node() -> impl Strategy<Value = SchemaNode> {
    let leaf = arb_type().prop_map(SchemaNode::Scalar);
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), any::<bool>()).prop_map(|(element, optional)| SchemaNode::Array {
                element: Box::new(element),
                optional,
            }),
            collection::btree_map(sample::select(NAMES.to_vec()), inner, 0..4)
                .prop_map(|fields| SchemaNode::Object(named(fields))),
        ]
    })
}

fn arb_tree() -> impl Strategy<Value = SchemaTree> {
    collection::btree_map(sample::select(NAMES.to_vec()), arb_node(), 0..5).prop_map(named)
}

/// Objects and scalars only, so every scalar has a plain dotted path.
fn arb_plain_tree() -> impl Strategy<Value = SchemaTree> {
    let leaf = arb_type().prop_map(SchemaNode::Scalar);
    let node = leaf.prop_recursive(3, 24, 4, |inner| {
        collection::btree_map(sample::select(NAMES.to_vec()), inner, 0..4)
            .prop_map(|fields| SchemaNode::Object(named(fields)))
    });
    collection::btree_map(sample::select(NAMES.to_vec()), node, 1..5).prop_map(named)
}

fn named(fields: BTreeMap<&'static str, SchemaNode>) -> SchemaTree {
    fields
        .into_iter()
        .map(|(name, node)| (name.to_string(), node))
        .collect()
}

/// Rendered union strings, including ones with `any` and `missing` members.
fn arb_type_string() -> impl Strategy<Value = String> {
    sample::subsequence(Tag::ALL.to_vec(), 1..=4).prop_map(|tags| {
        let names: Vec<&str> = tags.iter().map(Tag::name).collect();
        match names.as_slice() {
            [single] => single.to_string(),
            _ => format!("union({})", names.join("|")),
        }
    })
}

fn scalar_paths(tree: &SchemaTree, prefix: &[String], out: &mut Vec<Vec<String>>) {
    for (name, node) in tree.iter() {
        let mut path = prefix.to_vec();
        path.push(name.clone());
        match node {
            SchemaNode::Scalar(_) => out.push(path),
            SchemaNode::Object(fields) => scalar_paths(fields, &path, out),
            SchemaNode::Array { .. } => {}
        }
    }
}

fn replace_at(tree: &SchemaTree, path: &[String], replacement: &SchemaNode) -> SchemaTree {
    tree.iter()
        .map(|(name, node)| {
            let node = match (path.split_first(), node) {
                (Some((first, [])), _) if first == name => replacement.clone(),
                (Some((first, rest)), SchemaNode::Object(fields)) if first == name => {
                    SchemaNode::Object(replace_at(fields, rest, replacement))
                }
                _ => node.clone(),
            };
            (name.clone(), node)
        })
        .collect()
}

fn on_pattern_line(path: &FieldPath, pattern: &str) -> bool {
    let key = path.required_key();
    key == pattern
        || pattern.starts_with(&format!("{key}."))
        || key.starts_with(&format!("{pattern}."))
}

fn arb_patterns() -> impl Strategy<Value = Vec<String>> {
    collection::vec(
        collection::vec(sample::select(NAMES.to_vec()), 1..3).prop_map(|parts| parts.join(".")),
        1..4,
    )
}

proptest! {
    #[test]
    fn union_merge_is_idempotent_and_commutative(a in arb_type(), b in arb_type()) {
        prop_assert_eq!(a.merge(&a), a.clone());
        prop_assert_eq!(a.merge(&b), b.merge(&a));
    }

    #[test]
    fn union_canonicalization_is_idempotent(t in arb_type_string()) {
        let once = build_union(union_parts(&t)).unwrap();
        let twice = build_union(union_parts(&once)).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn rendered_types_parse_back(a in arb_type()) {
        prop_assert_eq!(a.to_string().parse::<CanonicalType>().unwrap(), a);
    }

    #[test]
    fn presence_injection_is_idempotent(tree in arb_tree()) {
        let required = RequiredPathSet::new();
        let once = inject_presence(&tree, &required);
        prop_assert_eq!(inject_presence(&once, &required), once);
    }

    #[test]
    fn presence_injection_touches_only_listed_paths(tree in arb_tree(), name in sample::select(NAMES.to_vec())) {
        let all: RequiredPathSet = tree.keys().cloned().collect();
        let mut partial = all.clone();
        partial.remove(name);

        let with_all = inject_presence(&tree, &all);
        let with_partial = inject_presence(&tree, &partial);
        for (key, node) in with_all.iter() {
            if key != name {
                prop_assert_eq!(Some(node), with_partial.get(key));
            }
        }
    }

    #[test]
    fn diff_of_tree_with_itself_is_empty(tree in arb_tree()) {
        prop_assert!(diff_trees(&tree, &tree).is_empty());
    }

    #[test]
    fn diff_swaps_sides(left in arb_tree(), right in arb_tree()) {
        let forward = diff_trees(&left, &right);
        let backward = diff_trees(&right, &left);

        prop_assert_eq!(forward.only_left(), backward.only_right());
        prop_assert_eq!(forward.only_right(), backward.only_left());
        prop_assert_eq!(forward.common().len(), backward.common().len());
        for (path, change) in forward.common() {
            let other = &backward.common()[path];
            prop_assert_eq!(&change.old, &other.new);
            prop_assert_eq!(&change.new, &other.old);
        }
    }

    #[test]
    fn filter_with_no_patterns_is_identity(tree in arb_tree()) {
        prop_assert_eq!(filter_tree::<&str>(&tree, &[]), tree);
    }

    #[test]
    fn filter_is_idempotent(tree in arb_tree(), patterns in arb_patterns()) {
        let once = filter_tree(&tree, &patterns);
        prop_assert_eq!(filter_tree(&once, &patterns), once);
    }

    #[test]
    fn filtering_before_diff_matches_discarding_after(
        left in arb_plain_tree(),
        pick in any::<sample::Index>(),
        cut in any::<sample::Index>(),
        ty in arb_type(),
    ) {
        let mut paths = Vec::new();
        scalar_paths(&left, &[], &mut paths);
        prop_assume!(!paths.is_empty());

        // The right side turns into a scalar somewhere along the pattern.
        let target = pick.get(&paths);
        let depth = cut.index(target.len()) + 1;
        let right = replace_at(&left, &target[..depth], &SchemaNode::Scalar(ty));
        let pattern = target.join(".");

        let filtered = diff_trees(
            &filter_tree(&left, &[&pattern]),
            &filter_tree(&right, &[&pattern]),
        );
        let full = diff_trees(&left, &right);

        let only_left: BTreeMap<_, _> = full
            .only_left()
            .iter()
            .filter(|(path, _)| on_pattern_line(path, &pattern))
            .map(|(path, ty)| (path.clone(), ty.clone()))
            .collect();
        let only_right: BTreeMap<_, _> = full
            .only_right()
            .iter()
            .filter(|(path, _)| on_pattern_line(path, &pattern))
            .map(|(path, ty)| (path.clone(), ty.clone()))
            .collect();
        let common: BTreeMap<_, _> = full
            .common()
            .iter()
            .filter(|(path, _)| on_pattern_line(path, &pattern))
            .map(|(path, change)| (path.clone(), change.clone()))
            .collect();

        prop_assert_eq!(filtered.only_left(), &only_left);
        prop_assert_eq!(filtered.only_right(), &only_right);
        prop_assert_eq!(filtered.common(), &common);
    }

    #[test]
    fn comparison_is_deterministic(left in arb_tree(), right in arb_tree()) {
        let options = CompareOptions::default();
        prop_assert_eq!(compare(&left, &right, &options), compare(&left, &right, &options));
    }

    #[test]
    fn report_sections_are_sorted(left in arb_tree(), right in arb_tree()) {
        let report = compare(&left, &right, &CompareOptions::default());
        prop_assert!(report.only_in_left().is_sorted());
        prop_assert!(report.only_in_right().is_sorted());
        prop_assert!(report.common_fields().is_sorted());
        prop_assert!(report.type_mismatches().is_sorted_by_key(|m| m.path.clone()));
    }
}
