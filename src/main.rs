use clap::Parser;
use resource_alloc::domain::report::RunSummary;
use resource_alloc::utils::error::{AllocError, ErrorSeverity};
use resource_alloc::utils::{logger, validation::Validate};
use resource_alloc::{AllocationEngine, AllocationPipeline, CliConfig, LocalStorage, MicroLpSolver};

/// 求解器沒有回傳最佳解時的退出碼
const EXIT_NOT_OPTIMAL: i32 = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting resource-alloc CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲、求解器和管道
    let storage = LocalStorage::default();
    let pipeline = AllocationPipeline::new(storage, config, MicroLpSolver::new());

    let engine = AllocationEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => report_summary(&summary),
        Err(e) => fail(e),
    }

    Ok(())
}

fn report_summary(summary: &RunSummary) {
    println!("Status: {}", summary.status);
    if let Some(objective) = summary.objective {
        println!("Objective: {:.2}", objective);
    }
    println!("📁 Output saved to: {}", summary.output_path);

    if summary.status.is_optimal() {
        tracing::info!("✅ Allocation completed successfully!");
    } else {
        // 不可行時仍有 model.lp 與 diagnostics.json 可供檢查
        tracing::warn!("⚠️ No optimal allocation found ({})", summary.status);
        eprintln!(
            "⚠️ No optimal allocation found ({}). Check diagnostics.json for coverage gaps and shortages.",
            summary.status
        );
        std::process::exit(EXIT_NOT_OPTIMAL);
    }
}

fn fail(e: AllocError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Allocation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
