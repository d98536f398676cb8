use anyhow::Context;
use clap::Parser;
use resource_alloc::adapters::csv_provider::{CsvDataProvider, InputFiles};
use resource_alloc::core::{builder, diagnostics};
use resource_alloc::domain::ports::{ConfigProvider, DataProvider};
use resource_alloc::utils::error::ErrorSeverity;
use resource_alloc::utils::{logger, validation::Validate};
use resource_alloc::{AllocationEngine, AllocationPipeline, LocalStorage, MicroLpSolver, TomlConfig};

const EXIT_NOT_OPTIMAL: i32 = 4;

#[derive(Parser)]
#[command(name = "toml-alloc")]
#[command(about = "Resource allocation driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "alloc-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Load inputs, run diagnostics and build the model without solving
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based allocation tool");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the solver will not be called");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = AllocationPipeline::new(LocalStorage::default(), config, MicroLpSolver::new());
    let engine = AllocationEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            println!("Status: {}", summary.status);
            if let Some(objective) = summary.objective {
                println!("Objective: {:.2}", objective);
            }
            println!("📁 Output saved to: {}", summary.output_path);
            if !summary.status.is_optimal() {
                eprintln!(
                    "⚠️ No optimal allocation found ({}). Check diagnostics.json.",
                    summary.status
                );
                std::process::exit(EXIT_NOT_OPTIMAL);
            }
            tracing::info!("✅ Allocation completed successfully!");
        }
        Err(e) => {
            tracing::error!(
                "❌ Allocation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let capacity = config.capacity();

    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run.name);
    if let Some(description) = &config.run.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_dir());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.formats().join(", "));
    println!(
        "  Capacity: {} h x {} = {} h per person",
        capacity.annual_hours,
        capacity.capacity_factor,
        capacity.person_upper_bound()
    );
    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let storage = LocalStorage::default();
    let files = InputFiles::in_dir(
        config.input_dir(),
        config.projects_file(),
        config.people_file(),
        config.overrides_file(),
        config.roles_file(),
    );

    let input = CsvDataProvider::new(&storage, files)
        .load()
        .await
        .context("failed to load input tables")?;
    let capacity = config.capacity();
    let report = diagnostics::run_diagnostics(&input, &capacity);
    let model = builder::build_model(&input, &capacity);

    println!("🔍 Dry Run Analysis:");
    println!();
    println!("📥 Inputs:");
    println!("  Projects: {}", input.projects().len());
    println!("  People: {}", input.people().len());
    println!("  Overrides: {}", input.overrides().len());

    println!();
    println!("🧮 Model:");
    println!("  Variables: {}", model.variables().len());
    for (kind, count) in model.constraint_counts() {
        println!("  {}: {}", kind, count);
    }

    println!();
    println!("🩺 Diagnostics:");
    if report.coverage_gaps.is_empty() {
        println!("  ✅ Every required role has at least one person");
    }
    for gap in &report.coverage_gaps {
        println!(
            "  ❌ {} needs {} h of {} but nobody has that profile",
            gap.project, gap.required_hours, gap.role
        );
    }
    for balance in report.shortages() {
        println!(
            "  ⚠️ {}: {} h available, {} h required ({} h short)",
            balance.profile,
            balance.available_hours,
            balance.required_hours,
            -balance.surplus
        );
    }
    if report.shortage_count() == 0 {
        println!("  ✅ No profile is over-subscribed");
    }

    println!();
    println!("✅ Dry run analysis complete. Run without --dry-run to solve.");

    Ok(())
}
