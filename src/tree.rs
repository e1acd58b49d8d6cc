//! 逆コラッツ木（辞書形式）
//!
//! 各ノードをキー、その子（1ステップで自分に到達する数）のリストを値として持つ。
//! ノードは正整数そのものなので、ラッパー型やポインタは使わない。
//! 木は常に根 1 とその子 2 から始まる。葉の値は空リスト。
//!
//! 注意: 通常の木と違い、連結であることは保証しない。
//! 系列の追加が途中で中断されると、根から辿れない「浮いた」ノード/枝が残る。
//! 全ノードを列挙したい場合は [`MergeTree::nodes`] を使い、
//! 浮いたノードは [`MergeTree::floating_nodes`] で確認すること。

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use log::{debug, info, trace, warn};

use crate::error::{CollatzError, Result};
use crate::sequence::{collatz_step, is_valid_edge, SequenceGenerator};
use crate::traverse::{Traverse, TraversalOrder};

/// 木のノード（正整数）
pub type Node = u64;

/// 根ノード
pub const ROOT: Node = 1;

/// `add_sequence` 1回分の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// 既にある辺に当たって終了。
    /// 2 のキーがまだ無い木では、1 → 2 の辺に当たるまでにキーが作られることがある
    Absorbed,
    /// 既存ノード `attached_to` に新しい子をつないで終了。
    /// `added` はこの呼び出しで新しく作られたキーの数
    Extended { attached_to: Node, added: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeTree {
    nodes: BTreeMap<Node, Vec<Node>>,
}

impl Default for MergeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeTree {
    /// `{1: [2]}` で初期化する。2 のキーは最初に出会った時点で作られる。
    pub fn new() -> Self {
        MergeTree {
            nodes: BTreeMap::from([(ROOT, vec![2])]),
        }
    }

    /// 親に子を追加する。辺の正当性を検査し、既に子なら何もせず false を返す。
    fn link_child(&mut self, parent: Node, child: Node) -> Result<bool> {
        if !is_valid_edge(parent, child) {
            return Err(CollatzError::InvalidEdge { parent, child });
        }
        let children = self.nodes.entry(parent).or_default();
        if children.contains(&child) {
            return Ok(false);
        }
        children.push(child);
        self.nodes.entry(child).or_default();
        Ok(true)
    }

    /// n から 1 へのコラッツ系列を木に追加する。
    /// 既に木にある数に最初に出会った時点で止める。
    ///
    /// 失敗してもそれまでの変更は巻き戻さない。`Overflow` や `InvalidEdge` で
    /// 中断された場合、この呼び出しで作られたノードは浮いたまま残る。
    pub fn add_sequence(&mut self, n: Node) -> Result<MergeOutcome> {
        let mut seq = SequenceGenerator::new(n)?;
        let Some(mut child) = seq.next() else {
            return Ok(MergeOutcome::Absorbed);
        };

        let mut added = 0usize;
        if !self.nodes.contains_key(&child) {
            self.nodes.insert(child, Vec::new());
            added += 1;
        }

        for parent in seq.by_ref() {
            if self.nodes.contains_key(&parent) {
                return if self.link_child(parent, child)? {
                    debug!("sequence {}: attached {} under {} ({} new nodes)", n, child, parent, added);
                    Ok(MergeOutcome::Extended { attached_to: parent, added })
                } else {
                    debug!("sequence {}: {} already a child of {}", n, child, parent);
                    Ok(MergeOutcome::Absorbed)
                };
            }
            // 既知の構造に出会うまでは浮いた枝として伸びる
            trace!("sequence {}: floating {} -> {}", n, parent, child);
            self.link_child(parent, child)?;
            added += 1;
            child = parent;
        }

        if let Some(err) = seq.overflow_error() {
            warn!("sequence {} interrupted, {} floating nodes left: {}", n, added, err);
            return Err(err);
        }
        Ok(MergeOutcome::Absorbed)
    }

    /// 1 から n-1 までの系列を順に追加する（n は含まない）。
    /// 最初のエラーで打ち切る。
    pub fn build(&mut self, n: Node) -> Result<()> {
        for x in 1..n {
            self.add_sequence(x)?;
        }
        info!("built collatz tree for [1, {}): {} nodes", n, self.len());
        Ok(())
    }

    /// 根からの走査
    pub fn traverse(&self, order: TraversalOrder) -> Traverse<'_> {
        Traverse::new(self, ROOT, order)
    }

    /// 任意のノードからの走査（浮いた枝の中身を見る用）
    pub fn traverse_from(&self, start: Node, order: TraversalOrder) -> Traverse<'_> {
        Traverse::new(self, start, order)
    }

    /// 全キーについて `(child, parent)` の組を列挙する。
    /// キーは昇順、子は追加順。浮いた枝の辺も含む。
    pub fn export_edges(&self) -> impl Iterator<Item = (Node, Node)> + '_ {
        self.nodes
            .iter()
            .flat_map(|(&parent, children)| children.iter().map(move |&child| (child, parent)))
    }

    pub fn contains(&self, node: Node) -> bool {
        self.nodes.contains_key(&node)
    }

    /// キーが無ければ None
    pub fn children(&self, node: Node) -> Option<&[Node]> {
        self.nodes.get(&node).map(Vec::as_slice)
    }

    /// キーの数
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 全キー（昇順）
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.nodes.keys().copied()
    }

    /// 根から辿れるノードの集合
    pub fn reachable(&self) -> HashSet<Node> {
        self.traverse(TraversalOrder::BreadthFirst).collect()
    }

    /// キーとして存在するが根から辿れないノード（昇順）
    pub fn floating_nodes(&self) -> Vec<Node> {
        let reachable = self.reachable();
        self.nodes().filter(|n| !reachable.contains(n)).collect()
    }

    pub fn is_connected(&self) -> bool {
        self.floating_nodes().is_empty()
    }

    /// 記録済みの辺に沿った根からの深さ。
    /// 途中の辺が欠けている（浮いている・未登録）なら None。
    pub fn depth_of(&self, node: Node) -> Option<usize> {
        let mut current = node;
        let mut depth = 0usize;
        while current != ROOT {
            if depth > self.nodes.len() {
                return None;
            }
            let parent = collatz_step(current)?;
            if !self.children(parent)?.contains(&current) {
                return None;
            }
            current = parent;
            depth += 1;
        }
        Some(depth)
    }
}

/// 辞書形式のダンプ `{1: [2], 2: [4], ...}`
impl fmt::Display for MergeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (node, children)) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", node, children)?;
        }
        write!(f, "}}")
    }
}
