use collatz_tree::*;
use proptest::prelude::*;

proptest! {
    /// 系列は必ず 1 で終わる
    #[test]
    fn prop_sequence_ends_at_one(n in 1u64..1_000_000) {
        let mut seq = SequenceGenerator::new(n).unwrap();
        prop_assert_eq!(seq.by_ref().last(), Some(1));
        prop_assert!(!seq.overflowed());
        prop_assert_eq!(seq.history().first().copied(), Some(n));
    }

    /// 隣接する (child, parent) は全て正しい逆ステップ
    #[test]
    fn prop_consecutive_pairs_valid(n in 1u64..1_000_000) {
        let values: Vec<u64> = SequenceGenerator::new(n).unwrap().collect();
        for w in values.windows(2) {
            prop_assert!(is_valid_edge(w[1], w[0]));
            prop_assert_eq!(collatz_step(w[0]), Some(w[1]));
        }
    }

    /// 正しい辺は前進1ステップと一致する
    #[test]
    fn prop_valid_edge_is_forward_step(parent in 1u64..100_000, child in 1u64..300_000) {
        prop_assert_eq!(is_valid_edge(parent, child), collatz_step(child) == Some(parent));
    }

    /// build(n) 後は [1, n) の全てが根から辿れる
    #[test]
    fn prop_build_connected(n in 1u64..800) {
        let mut tree = MergeTree::new();
        tree.build(n).unwrap();
        let reachable = tree.reachable();
        for x in 1..n {
            prop_assert!(reachable.contains(&x));
        }
        prop_assert!(tree.is_connected());
    }

    /// 任意の順で追加しても、マージ済みの系列の再追加は木を変えない
    #[test]
    fn prop_readd_is_noop(starts in prop::collection::vec(1u64..5_000, 1..40)) {
        let mut tree = MergeTree::new();
        for &s in &starts {
            tree.add_sequence(s).unwrap();
        }
        let before = tree.clone();
        for &s in &starts {
            prop_assert_eq!(tree.add_sequence(s), Ok(MergeOutcome::Absorbed));
        }
        prop_assert_eq!(tree, before);
    }

    /// 幅優先走査は深さの昇順
    #[test]
    fn prop_bfs_level_order(n in 2u64..400) {
        let mut tree = MergeTree::new();
        tree.build(n).unwrap();
        let depths: Vec<usize> = tree
            .traverse(TraversalOrder::BreadthFirst)
            .map(|node| tree.depth_of(node).unwrap_or(0))
            .collect();
        prop_assert!(depths.windows(2).all(|w| w[0] <= w[1]));
    }
}
