//! コラッツ系列のマージ木
//!
//! 各開始値のコラッツ系列（偶数は半分、奇数は 3n+1、1 で終了）を生成し、
//! 根 1 を持つ1本の有向木にまとめる。木は「ノード → 1ステップで自分に
//! 到達する数のリスト」という辞書で持つ。
//!
//! 系列の追加が途中で中断されると、根から辿れない「浮いた」枝が残りうる。
//! 連結性は保証しない。

pub mod error;
pub mod render;
pub mod sequence;
pub mod traverse;
pub mod tree;
pub mod verify;

pub use error::{CollatzError, Result};
pub use render::to_dot;
pub use sequence::{collatz_step, is_valid_edge, stopping_time, CollatzInt, SequenceGenerator};
pub use traverse::{Traverse, TraversalOrder};
pub use tree::{MergeOutcome, MergeTree, Node, ROOT};
pub use verify::{check_trajectory, verify_range, verify_range_parallel, VerifyResult};
