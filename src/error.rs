use thiserror::Error;

/// クレート共通の Result 型
pub type Result<T> = std::result::Result<T, CollatzError>;

/// 系列生成・木マージで発生するエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollatzError {
    /// 開始値が 1 未満
    #[error("initial number must be greater than 0, got {0}")]
    InvalidArgument(String),

    /// 親子の組が逆コラッツ1ステップになっていない（生成とマージの不整合）
    #[error("child {child} does not precede parent {parent} in a collatz sequence")]
    InvalidEdge { parent: u64, child: u64 },

    /// 次の値が整数型に収まらず、系列が途中で打ち切られた
    #[error("collatz sequence from {start} overflowed after {last}")]
    Overflow { start: String, last: String },
}
