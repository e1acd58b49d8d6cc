use std::collections::{HashSet, VecDeque};
use std::iter::FusedIterator;

use crate::tree::{MergeTree, Node};

/// 走査順
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// 幅優先（レベル順）。子は記録順
    #[default]
    BreadthFirst,
    /// 深さ優先の先行順。子は記録順
    DepthFirst,
}

/// キューによる木の走査イテレータ。
///
/// 開始ノードから子リストを辿れる範囲だけを列挙する。浮いたノードは現れない。
/// 同じ子が複数の親に記録されていても一度しか返さない。
/// キーの無いノードは葉として扱う。
#[derive(Debug, Clone)]
pub struct Traverse<'a> {
    tree: &'a MergeTree,
    order: TraversalOrder,
    pending: VecDeque<Node>,
    seen: HashSet<Node>,
}

impl<'a> Traverse<'a> {
    pub(crate) fn new(tree: &'a MergeTree, start: Node, order: TraversalOrder) -> Self {
        Traverse {
            tree,
            order,
            pending: VecDeque::from([start]),
            seen: HashSet::from([start]),
        }
    }

    pub fn order(&self) -> TraversalOrder {
        self.order
    }
}

impl Iterator for Traverse<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let node = match self.order {
            TraversalOrder::BreadthFirst => self.pending.pop_front()?,
            TraversalOrder::DepthFirst => self.pending.pop_back()?,
        };
        let children = self.tree.children(node).unwrap_or(&[]);
        match self.order {
            TraversalOrder::BreadthFirst => {
                for &child in children {
                    if self.seen.insert(child) {
                        self.pending.push_back(child);
                    }
                }
            }
            TraversalOrder::DepthFirst => {
                // スタックなので逆順に積むと記録順で取り出せる
                for &child in children.iter().rev() {
                    if self.seen.insert(child) {
                        self.pending.push_back(child);
                    }
                }
            }
        }
        Some(node)
    }
}

impl FusedIterator for Traverse<'_> {}
