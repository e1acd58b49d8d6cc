use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;
use rayon::prelude::*;

use crate::error::{CollatzError, Result};
use crate::sequence::{is_valid_edge, SequenceGenerator};
use crate::tree::Node;

/// 範囲検証の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyResult {
    /// 検証した数の総数
    pub total_checked: u64,
    /// 全て 1 に到達し、全ての隣接組が正しい辺だったか
    pub all_converged: bool,
    /// 最大停止時間
    pub max_stopping_time: u64,
    /// 最大停止時間を持つ数（同値なら小さい方）
    pub max_stopping_time_number: Node,
    /// 軌道中の最大値
    pub peak_value: Node,
    /// 最大値を通る開始値（同値なら小さい方）
    pub peak_value_number: Node,
    /// 検証に失敗した数（昇順）
    pub failures: Vec<Node>,
}

impl VerifyResult {
    fn empty() -> Self {
        VerifyResult {
            total_checked: 0,
            all_converged: true,
            max_stopping_time: 0,
            max_stopping_time_number: 0,
            peak_value: 0,
            peak_value_number: 0,
            failures: Vec::new(),
        }
    }

    fn record(&mut self, n: Node, outcome: Result<(u64, Node)>) {
        self.total_checked += 1;
        match outcome {
            Ok((steps, peak)) => {
                if steps > self.max_stopping_time || self.max_stopping_time_number == 0 {
                    self.max_stopping_time = steps;
                    self.max_stopping_time_number = n;
                }
                if peak > self.peak_value {
                    self.peak_value = peak;
                    self.peak_value_number = n;
                }
            }
            Err(err) => {
                warn!("verification failed for {}: {}", n, err);
                self.failures.push(n);
                self.all_converged = false;
            }
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.total_checked += other.total_checked;
        self.all_converged &= other.all_converged;
        let better_time = other.max_stopping_time > self.max_stopping_time
            || (other.max_stopping_time == self.max_stopping_time
                && other.max_stopping_time_number != 0
                && (self.max_stopping_time_number == 0
                    || other.max_stopping_time_number < self.max_stopping_time_number));
        if better_time {
            self.max_stopping_time = other.max_stopping_time;
            self.max_stopping_time_number = other.max_stopping_time_number;
        }
        let better_peak = other.peak_value > self.peak_value
            || (other.peak_value == self.peak_value
                && other.peak_value_number != 0
                && (self.peak_value_number == 0 || other.peak_value_number < self.peak_value_number));
        if better_peak {
            self.peak_value = other.peak_value;
            self.peak_value_number = other.peak_value_number;
        }
        self.failures.extend(other.failures);
        self.failures.sort_unstable();
        self
    }
}

/// 1つの開始値の軌道を検証し、(停止時間, 最大値) を返す
pub fn check_trajectory(n: Node) -> Result<(u64, Node)> {
    let mut seq = SequenceGenerator::new(n)?;
    let mut prev: Option<Node> = None;
    let mut steps = 0u64;
    let mut peak = n;

    for value in seq.by_ref() {
        if let Some(child) = prev {
            if !is_valid_edge(value, child) {
                return Err(CollatzError::InvalidEdge { parent: value, child });
            }
            steps += 1;
        }
        peak = peak.max(value);
        prev = Some(value);
    }

    if let Some(err) = seq.overflow_error() {
        return Err(err);
    }
    Ok((steps, peak))
}

/// [start, end] の全整数を検証する（シングルスレッド版）。
/// start が 0 なら 1 から始める。
/// progress_callback: (完了数, 総数) を定期的に呼ぶ。
pub fn verify_range(start: Node, end: Node, progress_callback: impl Fn(u64, u64)) -> VerifyResult {
    let start = start.max(1);
    let mut result = VerifyResult::empty();
    if start > end {
        return result;
    }
    let total = end - start + 1;

    for n in start..=end {
        result.record(n, check_trajectory(n));
        if result.total_checked % 1000 == 0 {
            progress_callback(result.total_checked, total);
        }
    }

    progress_callback(result.total_checked, total);
    result
}

/// [start, end] の全整数を検証する（並列版）。
/// Rayon でチャンク分割し、チャンクごとの結果をまとめる。
/// progress_callback: (完了数, 総数) を定期的に呼ぶ（スレッドセーフ）。
pub fn verify_range_parallel(
    start: Node,
    end: Node,
    progress_callback: impl Fn(u64, u64) + Sync,
) -> VerifyResult {
    let start = start.max(1);
    if start > end {
        return VerifyResult::empty();
    }

    let total = end - start + 1;
    // チャンク分割: 各チャンク10000個
    let chunk_size: u64 = 10_000;
    let num_chunks = total.div_ceil(chunk_size);
    let global_done = AtomicU64::new(0);

    (0..num_chunks)
        .into_par_iter()
        .map(|chunk_idx| {
            let chunk_start = start + chunk_idx * chunk_size;
            let chunk_end = std::cmp::min(chunk_start.saturating_add(chunk_size - 1), end);

            let mut local = VerifyResult::empty();
            let mut unreported = 0u64;
            for n in chunk_start..=chunk_end {
                local.record(n, check_trajectory(n));
                unreported += 1;

                // チャンク内でも定期的に進捗報告
                if unreported >= 100 {
                    let done = global_done.fetch_add(unreported, Ordering::Relaxed) + unreported;
                    progress_callback(done, total);
                    unreported = 0;
                }
            }
            if unreported > 0 {
                let done = global_done.fetch_add(unreported, Ordering::Relaxed) + unreported;
                progress_callback(done, total);
            }
            local
        })
        .reduce(VerifyResult::empty, VerifyResult::merge)
}
