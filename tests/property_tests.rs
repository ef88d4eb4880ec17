use langsheet::{
    IgnoreSet, Key, PluralGroup, ResourceNode, ResourceTree, Row, Scalar, SplitPlan, SplitRange,
    StringArray, Table, build_index, split, write_language,
};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone)]
enum NodeShape {
    Scalar { cdata: bool },
    Plural(BTreeSet<&'static str>),
    Array(usize),
}

const QUANTITIES: [&str; 6] = ["zero", "one", "two", "few", "many", "other"];

fn shape_strategy() -> impl Strategy<Value = NodeShape> {
    prop_oneof![
        any::<bool>().prop_map(|cdata| NodeShape::Scalar { cdata }),
        prop::collection::btree_set(prop::sample::select(QUANTITIES.to_vec()), 1..4)
            .prop_map(NodeShape::Plural),
        (0usize..4).prop_map(NodeShape::Array),
    ]
}

fn dataset_strategy() -> impl Strategy<Value = Vec<(String, NodeShape)>> {
    prop::collection::btree_map(
        proptest::string::string_regex("[a-z][a-z0-9_]{0,8}").expect("valid name regex"),
        shape_strategy(),
        1..12,
    )
    .prop_map(|map| map.into_iter().collect())
}

fn build_tree(shapes: &[(String, NodeShape)], tag: &str) -> ResourceTree {
    ResourceTree::new(
        shapes
            .iter()
            .map(|(name, shape)| match shape {
                NodeShape::Scalar { cdata: false } => {
                    ResourceNode::Scalar(Scalar::new(name, format!("{tag}:{name}")))
                }
                NodeShape::Scalar { cdata: true } => {
                    ResourceNode::Scalar(Scalar::cdata(name, format!("{tag}:{name}")))
                }
                NodeShape::Plural(quantities) => ResourceNode::Plural(PluralGroup::new(
                    name,
                    quantities.iter().map(|q| (*q, format!("{tag}:{name}#{q}"))),
                )),
                NodeShape::Array(n) => ResourceNode::Array(StringArray::new(
                    name,
                    (0..*n).map(|i| format!("{tag}:{name}[{i}]")),
                )),
            })
            .collect(),
    )
}

fn leaf_count(shapes: &[(String, NodeShape)]) -> usize {
    shapes
        .iter()
        .map(|(_, shape)| match shape {
            NodeShape::Scalar { .. } => 1,
            NodeShape::Plural(q) => q.len(),
            NodeShape::Array(n) => *n,
        })
        .sum()
}

fn tree_keys(tree: &ResourceTree) -> HashSet<Key> {
    tree.nodes
        .iter()
        .flat_map(|n| n.units().unwrap())
        .map(|u| u.key)
        .collect()
}

fn table_with_rows(n: usize) -> Table {
    let tree = ResourceTree::new(
        (0..n)
            .map(|i| ResourceNode::Scalar(Scalar::new(format!("k{i}"), format!("v{i}"))))
            .collect(),
    );
    let (_, table) = build_index(&tree, &IgnoreSet::empty()).unwrap();
    table
}

proptest! {
    #[test]
    fn prop_index_has_one_key_per_leaf(shapes in dataset_strategy()) {
        let tree = build_tree(&shapes, "en");
        let (index, table) = build_index(&tree, &IgnoreSet::empty()).unwrap();
        prop_assert_eq!(index.len(), leaf_count(&shapes));
        prop_assert_eq!(table.len(), leaf_count(&shapes) + 1);
        let rows: HashSet<usize> = index.iter().map(|(_, row)| row).collect();
        prop_assert_eq!(rows.len(), index.len());
    }

    #[test]
    fn prop_missing_is_index_minus_visited(
        shapes in dataset_strategy(),
        mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let ignore = IgnoreSet::empty();
        let default = build_tree(&shapes, "en");
        let (index, mut table) = build_index(&default, &ignore).unwrap();

        let kept: Vec<_> = shapes
            .iter()
            .zip(mask.iter())
            .filter(|(_, keep)| **keep)
            .map(|(s, _)| s.clone())
            .collect();
        let partial = build_tree(&kept, "cs");
        let report = write_language(&mut table, &index, &ignore, "cs", &[partial.clone()]).unwrap();

        let visited = tree_keys(&partial);
        let expected: HashSet<Key> = index.keys().filter(|k| !visited.contains(*k)).cloned().collect();
        let missing: HashSet<Key> = report.missing_keys.iter().cloned().collect();
        prop_assert_eq!(missing, expected);
        prop_assert!(report.unknown_keys.is_empty());

        let full = write_language(&mut table, &index, &ignore, "en", &[default]).unwrap();
        prop_assert!(full.missing_keys.is_empty());
    }

    #[test]
    fn prop_rows_are_stable_across_languages(shapes in dataset_strategy()) {
        let ignore = IgnoreSet::empty();
        let (index, mut table) = build_index(&build_tree(&shapes, "en"), &ignore).unwrap();
        let mut reversed = shapes.clone();
        reversed.reverse();

        write_language(&mut table, &index, &ignore, "cs", &[build_tree(&shapes, "cs")]).unwrap();
        write_language(&mut table, &index, &ignore, "de", &[build_tree(&reversed, "de")]).unwrap();

        for (key, row) in index.iter() {
            let row = table.row(row).unwrap();
            prop_assert_eq!(row.value(0), key.as_str());
            let cs = row.value(2).strip_prefix("cs:").unwrap();
            let de = row.value(3).strip_prefix("de:").unwrap();
            prop_assert_eq!(cs, de);
        }
    }

    #[test]
    fn prop_split_reproduces_data_rows(
        rows in 0usize..40,
        starts in prop::collection::btree_set(1usize..45, 0..6),
    ) {
        let table = table_with_rows(rows);
        let plan = SplitPlan::new(
            std::iter::once(0)
                .chain(starts)
                .map(|start| SplitRange::new(start, format!("part{start}.xlsx"))),
        )
        .unwrap();

        let parts = split(&table, &plan);
        prop_assert_eq!(parts.len(), plan.len());
        let joined: Vec<Row> = parts
            .iter()
            .flat_map(|p| p.table.data_rows().to_vec())
            .collect();
        prop_assert_eq!(joined.as_slice(), table.data_rows());
        for part in &parts {
            prop_assert_eq!(part.table.header(), table.header());
        }
    }
}
