use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use collatz_tree::*;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

/// コラッツ系列マージ木
#[derive(Parser, Debug)]
#[command(name = "collatz-tree", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// ログレベル (RUST_LOG が優先)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// [1, n) の系列をマージして木を作る
    Build {
        /// 開始値の上限（含まない）
        n: Node,

        /// output/ に graphviz 用の .gv ファイルを書き出す
        #[arg(long)]
        dot: bool,

        /// 辞書形式で木全体を表示する
        #[arg(long)]
        dump: bool,

        /// 走査順
        #[arg(long, value_enum, default_value_t = Order::Bfs)]
        order: Order,

        /// 走査結果を先頭から何個表示するか
        #[arg(long, default_value_t = 50)]
        show: usize,
    },
    /// n から 1 までの軌道を表示する
    Trace {
        n: Node,
    },
    /// [start, end] の全整数の軌道を並列に検証する
    Verify {
        start: Node,
        end: Node,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    Bfs,
    Dfs,
}

impl From<Order> for TraversalOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Bfs => TraversalOrder::BreadthFirst,
            Order::Dfs => TraversalOrder::DepthFirst,
        }
    }
}

fn init_logging(max_level: &str) {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(max_level));
}

fn output_dir() -> Result<PathBuf> {
    let dir = PathBuf::from("output");
    std::fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;
    Ok(dir)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Command::Build { n, dot, dump, order, show } => cmd_build(n, dot, dump, order.into(), show),
        Command::Trace { n } => cmd_trace(n),
        Command::Verify { start, end } => cmd_verify(start, end),
    }
}

fn cmd_build(n: Node, dot: bool, dump: bool, order: TraversalOrder, show: usize) -> Result<()> {
    println!("マージ木の構築: [1, {})", n);

    let timer = Instant::now();
    let mut tree = MergeTree::new();
    tree.build(n).with_context(|| format!("failed to build tree for [1, {})", n))?;
    let elapsed = timer.elapsed();

    let floating = tree.floating_nodes();
    println!();
    println!("--- 結果 ---");
    println!("ノード数        = {}", tree.len());
    println!("辺の数          = {}", tree.export_edges().count());
    println!("浮いたノード数  = {}", floating.len());
    println!("計算時間        = {:?}", elapsed);

    let visited: Vec<Node> = tree.traverse(order).take(show).collect();
    println!();
    println!("--- 走査 ({:?}, 先頭 {} 個) ---", order, visited.len());
    println!("{:?}", visited);

    if dump {
        println!();
        println!("--- 辞書 ---");
        println!("{}", tree);
    }

    if dot {
        let path = output_dir()?.join(format!("collatz_tree_{}.gv", n));
        let file = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        w.write_all(to_dot(tree.export_edges()).as_bytes())?;
        w.flush()?;
        info!("wrote {}", path.display());
        println!("\n保存: {}", path.display());
        println!("画像化: dot {} -Tpng -o collatz_tree_{}.png", path.display(), n);
    }
    Ok(())
}

fn cmd_trace(n: Node) -> Result<()> {
    println!("軌道追跡: n={}", n);
    println!();

    let mut seq = SequenceGenerator::new(n)?;
    let show_limit = 50;
    for (i, value) in seq.by_ref().enumerate() {
        if i < show_limit {
            println!("  {:>6}  {:>20}", i, value);
        } else if i == show_limit {
            println!("  ...");
        }
    }
    if let Some(err) = seq.overflow_error() {
        return Err(err.into());
    }

    let history = seq.history();
    let steps = history.len().saturating_sub(1);
    let max_value = history.iter().copied().max().unwrap_or(n);
    println!();
    println!("--- 統計 ---");
    println!("停止時間 = {}", steps);
    println!("最大値   = {}", max_value);
    Ok(())
}

fn cmd_verify(start: Node, end: Node) -> Result<()> {
    let num_threads = rayon::current_num_threads();
    println!("範囲検証: [{}, {}] ({}スレッド並列)", start, end, num_threads);
    println!();

    let timer = Instant::now();
    let last_print = Mutex::new(Instant::now());
    let result = verify_range_parallel(start, end, |done, total| {
        if total == 0 {
            return;
        }
        if let Ok(mut lp) = last_print.try_lock() {
            let now = Instant::now();
            if now.duration_since(*lp).as_millis() >= 500 {
                let pct = done as f64 / total as f64 * 100.0;
                eprint!(
                    "\x1b[2K\r  [{:.1}s] {}/{} ({:.1}%)",
                    timer.elapsed().as_secs_f64(), done, total, pct
                );
                *lp = now;
            }
        }
    });
    let elapsed = timer.elapsed();
    eprintln!();

    println!("--- 結果 ---");
    println!("検証した数     = {}", result.total_checked);
    println!("全て収束       = {}", if result.all_converged { "はい" } else { "いいえ" });
    println!("最大停止時間   = {} (n={})", result.max_stopping_time, result.max_stopping_time_number);
    println!("最大値         = {} (n={})", result.peak_value, result.peak_value_number);
    println!("計算時間       = {:?}", elapsed);

    if !result.failures.is_empty() {
        println!("失敗した数     = {} 個", result.failures.len());
        for f in &result.failures[..result.failures.len().min(10)] {
            println!("  {}", f);
        }
    }
    Ok(())
}
