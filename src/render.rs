//! 外部の描画ツール（graphviz の dot など）に渡すテキスト出力。
//! ファイル書き出しや画像化はここでは扱わない。

use std::fmt::Write as FmtWrite;

use crate::tree::Node;

/// グラフ名
pub const GRAPH_NAME: &str = "collatzTree";

/// `(child, parent)` の列から有向グラフ記述を作る。1行1辺、child → parent。
pub fn to_dot<I>(edges: I) -> String
where
    I: IntoIterator<Item = (Node, Node)>,
{
    let mut out = format!("digraph {} {{", GRAPH_NAME);
    for (child, parent) in edges {
        write!(out, "\n\t{} -> {};", child, parent).ok();
    }
    out.push_str("\n}\n");
    out
}
