use clap::{Parser, Subcommand};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, error, warn};

// 从 lib.rs 导入模块
use gradeflow::config::AppConfig;
use gradeflow::runtime::lifetime;

/// 教务成绩过期清理入口
///
/// 录入与审批操作由外围服务进程调用库接口完成，本二进制只负责
/// INC 过期清理的手动执行与守护模式。
#[derive(Parser)]
#[command(name = "gradeflow", version, about = "Grade lifecycle core - expiration sweep runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 执行一轮过期清理（默认 dry-run，--commit 才真正写入）
    Sweep {
        /// 实际转换过期 INC 记录，而不是只预览候选集
        #[arg(long)]
        commit: bool,
    },
    /// 守护模式：按配置间隔周期性执行 commit 清理
    Daemon,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    // 记录程序启动时间
    let app_start_time = chrono::Utc::now();

    // 启动前预处理 //

    // 初始化配置
    setup_panic!();
    AppConfig::init().expect("Failed to initialize configuration");
    let config = AppConfig::get();

    // 初始化日志
    let stdout_log = std::io::stdout();
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(stdout_log);
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    // 打印信息
    warn!(
        "Starting pre-startup processing...
        Project: {}
        Version: {}
        Authors: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS")
    );

    let cli = Cli::parse();

    let startup = lifetime::startup::prepare_startup().await;
    let sweep = startup.sweep.clone();

    // 输出预处理时间
    debug!(
        "Pre-startup processing completed in {} ms",
        chrono::Utc::now()
            .signed_duration_since(app_start_time)
            .num_milliseconds()
    );

    // 预处理完成 //

    match cli.command {
        Command::Sweep { commit } => {
            let report = sweep
                .sweep_expired_incompletes(!commit)
                .await
                .unwrap_or_else(|e| {
                    error!("Expiration sweep failed: {}", e);
                    std::process::exit(1);
                });

            // 报告输出到 stdout，供运维脚本消费
            println!(
                "{}",
                serde_json::to_string_pretty(&report).expect("Failed to serialize sweep report")
            );
        }
        Command::Daemon => {
            let interval = std::time::Duration::from_secs(config.sweep.interval_secs);
            warn!(
                "Sweep daemon started, interval: {}s",
                config.sweep.interval_secs
            );

            let daemon = async {
                let mut ticker = tokio::time::interval(interval);
                loop {
                    ticker.tick().await;
                    match sweep.sweep_expired_incompletes(false).await {
                        Ok(report) => {
                            if !report.failures.is_empty() {
                                warn!(
                                    converted = report.converted,
                                    failed = report.failures.len(),
                                    "sweep round finished with per-record failures"
                                );
                            }
                        }
                        Err(e) => {
                            // 单轮失败不退出守护进程，等待下一轮
                            error!("Sweep round failed: {}", e);
                        }
                    }
                }
            };

            tokio::select! {
                _ = daemon => {}
                _ = lifetime::shutdown::listen_for_shutdown() => {
                    warn!("Graceful shutdown: sweep daemon stopped");
                }
            }
        }
    }

    Ok(())
}
