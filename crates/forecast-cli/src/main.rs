//! 백테스트 비교 → 미래 예측 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 선택 가능한 설정 목록
//! forecast grid
//!
//! # 두 설정으로 백테스트 후 1개월 예측
//! forecast run SPY -c current_month:2months:80_20 -c current_3months:6months:70_30 --horizon 1month
//!
//! # 다른 서비스 주소, JSON 출력
//! forecast --base-url http://10.0.0.5:8001/api --json run QQQ --all
//!
//! # 모델 학습과 성능 조회
//! forecast train SPY --period 5y
//! forecast performance SPY
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use forecast_cli::commands::{
    run_workflow, show_performance, show_predictions, train_models, RunArgs, TrainArgs,
};
use forecast_cli::output;
use forecast_client::{ComputationClient, HttpComputationClient};
use forecast_core::{
    init_logging, AppConfig, Configuration, Horizon, LogConfig, ModelId, TrainingWindow,
};
use forecast_workflow::PerformanceView;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "Forecast CLI - 설정별 백테스트 비교와 미래 가격 예측", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/forecast.toml, 없으면 환경 변수만 사용)
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,

    /// 연산 서비스 API 주소 (설정 파일보다 우선)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// 결과를 JSON으로 출력
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 선택 가능한 설정 조합 보기
    Grid,

    /// 백테스트 실행 후 (선택) 미래 예측
    Run {
        /// 종목 심볼 (예: SPY, TLT)
        symbol: String,

        /// 설정 (test_period:train_lookback:split, 반복 가능)
        #[arg(short, long = "config")]
        configs: Vec<Configuration>,

        /// 모든 설정 조합 사용
        #[arg(long, default_value = "false")]
        all: bool,

        /// 미래 예측 기간 (1month, 3months)
        #[arg(long)]
        horizon: Option<Horizon>,

        /// 과거 데이터 기간 (기본: 설정 파일의 workflow.period)
        #[arg(short, long)]
        period: Option<String>,

        /// 백테스트 후 모델 성능 비교 조회
        #[arg(long, default_value = "false")]
        performance: bool,
    },

    /// 모델 학습
    Train {
        /// 종목 심볼
        symbol: String,

        /// 과거 데이터 기간 (기본: 설정 파일의 workflow.period)
        #[arg(short, long)]
        period: Option<String>,

        /// 학습 시작일 (YYYY-MM-DD)
        #[arg(long)]
        train_start: Option<NaiveDate>,

        /// 학습 종료일 (YYYY-MM-DD)
        #[arg(long)]
        train_end: Option<NaiveDate>,

        /// 테스트 시작일 (YYYY-MM-DD)
        #[arg(long)]
        test_start: Option<NaiveDate>,

        /// 테스트 종료일 (YYYY-MM-DD)
        #[arg(long)]
        test_end: Option<NaiveDate>,
    },

    /// 학습된 모델의 기간별 예측 조회
    Predictions {
        /// 종목 심볼
        symbol: String,

        /// 모델 이름
        #[arg(short, long, default_value = "ensemble")]
        model: String,
    },

    /// 모델 성능 비교 조회
    Performance {
        /// 종목 심볼
        symbol: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match &cli.config_file {
        Some(path) => AppConfig::load(Some(path.as_path())),
        None => AppConfig::load_default(),
    }
    .context("설정 로드 실패")?;
    if let Some(base_url) = cli.base_url {
        config.client.base_url = base_url;
    }

    init_logging(LogConfig::from_settings(&config.logging).override_from_env())
        .map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    if let Commands::Grid = cli.command {
        let grid = Configuration::grid();
        if cli.json {
            println!("{}", output::to_json(&grid)?);
        } else {
            print!("{}", output::grid_table(&grid));
        }
        return Ok(());
    }

    let client: Arc<dyn ComputationClient> = Arc::new(
        HttpComputationClient::new(&config.client).context("HTTP 클라이언트 생성 실패")?,
    );
    info!(base_url = %config.client.base_url, "Computation service client ready");

    match cli.command {
        Commands::Grid => {}

        Commands::Run {
            symbol,
            configs,
            all,
            horizon,
            period,
            performance,
        } => {
            let mut settings = config.workflow.clone();
            if let Some(period) = period {
                settings.period = period;
            }
            let seed = ModelId::new(settings.seed_model.clone());

            let args = RunArgs {
                symbol,
                configs,
                all,
                horizon,
                with_performance: performance,
            };

            let outcome = match run_workflow(client, settings, &args).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Workflow failed: {:#}", e);
                    return Err(e);
                }
            };

            if cli.json {
                println!("{}", output::to_json(outcome.backtest.as_ref())?);
                if let Some(future) = &outcome.future {
                    println!("{}", output::to_json(future.as_ref())?);
                }
                if let Some(report) = &outcome.performance {
                    println!("{}", output::to_json(report.as_ref())?);
                }
                return Ok(());
            }

            let view = &outcome.backtest;
            println!("\n📊 백테스트 결과: {} ({}개 설정)", view.symbol, view.configs.len());
            println!("\n상위 {}개 (RMSE 오름차순)", outcome.top.len());
            print!("{}", output::ranking_table(&outcome.top));
            println!("\n모델별 최적 설정");
            print!("{}", output::best_per_model_table(&view.best_per_model, &seed));

            if let Some(future) = &outcome.future {
                println!(
                    "\n🔮 미래 예측: {} ({}, 기준 설정 {})",
                    future.symbol, future.horizon, future.config
                );
                print!("{}", output::chart_table(&future.chart));
            }

            if let Some(report) = &outcome.performance {
                println!("\n모델 성능");
                print!("{}", output::performance_table(report));
            }
        }

        Commands::Train {
            symbol,
            period,
            train_start,
            train_end,
            test_start,
            test_end,
        } => {
            let view = PerformanceView::new(client);
            let args = TrainArgs {
                symbol,
                period: period.unwrap_or_else(|| config.workflow.period.clone()),
                window: TrainingWindow {
                    train_start_date: train_start,
                    train_end_date: train_end,
                    test_start_date: test_start,
                    test_end_date: test_end,
                },
            };

            println!("\n🤖 모델 학습 중... ({})", args.symbol);
            let report = train_models(&view, &args).await?;
            if cli.json {
                println!("{}", output::to_json(&report)?);
            } else {
                print!("{}", output::training_summary(&report));
            }
        }

        Commands::Predictions { symbol, model } => {
            let view = PerformanceView::new(client);
            let report = show_predictions(&view, &symbol, &ModelId::new(model)).await?;
            println!("{}", output::to_json(&report)?);
        }

        Commands::Performance { symbol } => {
            let view = PerformanceView::new(client);
            let report = show_performance(&view, &symbol).await?;
            if cli.json {
                println!("{}", output::to_json(report.as_ref())?);
            } else {
                print!("{}", output::performance_table(&report));
            }
        }
    }

    Ok(())
}
