use churn_client::config::Config;
use churn_client::input::{normalize, validate_channel, RawFields, RawValue};
use churn_client::lifecycle::RequestLifecycle;
use churn_client::models::PredictionRequest;
use churn_client::prediction_client::PredictionClient;
use churn_client::report::View;
use churn_client::warmup::{wait_until_healthy, WarmupPolicy};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "churn-client", version, about = "Predict customer churn risk")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit customer attributes and print the risk report
    Predict(PredictArgs),
    /// Check the prediction service
    Health {
        /// Keep checking until the service is ready
        #[arg(long)]
        wait: bool,
    },
}

/// Field flags take raw text; anything unparseable is sent as 0.
#[derive(Args)]
struct PredictArgs {
    /// JSON file with raw form fields; flags override its values
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    avg_order_value: Option<String>,
    #[arg(long)]
    total_purchases: Option<String>,
    #[arg(long)]
    email_open_rate: Option<String>,
    #[arg(long)]
    days_since_last_purchase: Option<String>,
    /// yes/no, true/false or 1/0
    #[arg(long)]
    loyalty_program: Option<String>,
    #[arg(long)]
    website_visits: Option<String>,
    #[arg(long)]
    return_rate: Option<String>,
    #[arg(long)]
    support_tickets: Option<String>,
    /// web, mobile or app
    #[arg(long)]
    channel: Option<String>,
    /// Wait out a cold start before submitting
    #[arg(long)]
    wait_for_service: bool,
    /// Group recommendations by priority
    #[arg(long)]
    grouped: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl PredictArgs {
    /// Starts from the input file (or the blank form's defaults) and layers
    /// the flags on top.
    fn raw_fields(&self) -> anyhow::Result<RawFields> {
        let mut raw: RawFields = match &self.input {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    anyhow::anyhow!("Failed to read input file {}: {}", path.display(), e)
                })?;
                serde_json::from_str(&text)
                    .map_err(|e| anyhow::anyhow!("Invalid input file {}: {}", path.display(), e))?
            }
            None => serde_json::from_value(serde_json::to_value(
                PredictionRequest::form_defaults(),
            )?)?,
        };

        let overrides = [
            (&mut raw.avg_order_value, &self.avg_order_value),
            (&mut raw.total_purchases, &self.total_purchases),
            (&mut raw.email_open_rate, &self.email_open_rate),
            (&mut raw.days_since_last_purchase, &self.days_since_last_purchase),
            (&mut raw.loyalty_program, &self.loyalty_program),
            (&mut raw.website_visits, &self.website_visits),
            (&mut raw.return_rate, &self.return_rate),
            (&mut raw.support_tickets, &self.support_tickets),
        ];
        for (field, flag) in overrides {
            if let Some(text) = flag {
                *field = Some(RawValue::Text(text.clone()));
            }
        }
        if let Some(channel) = &self.channel {
            raw.channel = Some(channel.clone());
        }

        Ok(raw)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churn_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let client = PredictionClient::from_config(&config)?;
    tracing::info!("✓ Prediction client initialized: {}", client.base_url());

    match cli.command {
        Command::Health { wait } => run_health(&client, wait).await,
        Command::Predict(args) => run_predict(&config, client, &args).await,
    }
}

async fn run_health(client: &PredictionClient, wait: bool) -> anyhow::Result<ExitCode> {
    let result = if wait {
        wait_until_healthy(client, &WarmupPolicy::default()).await
    } else {
        client.health().await
    };

    match result {
        Ok(status) => {
            println!(
                "status: {}, model loaded: {}, scaler loaded: {}",
                status.status, status.model_loaded, status.scaler_loaded
            );
            Ok(if status.is_ready() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_predict(
    config: &Config,
    client: PredictionClient,
    args: &PredictArgs,
) -> anyhow::Result<ExitCode> {
    let raw = args.raw_fields()?;
    if let Err(e) = validate_channel(&raw) {
        eprintln!("{}", e.user_message());
        return Ok(ExitCode::from(2));
    }
    let request = normalize(&raw, config.default_channel);
    tracing::debug!("Normalized request: {:?}", request);

    if args.wait_for_service {
        if let Err(e) = wait_until_healthy(&client, &WarmupPolicy::default()).await {
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    }

    let lifecycle = RequestLifecycle::new(Arc::new(client));
    let pending = lifecycle.submit(request);
    if View::from(&lifecycle.state()) == View::Loading {
        eprintln!("Predicting...");
    }
    pending.await?;

    match View::from(&lifecycle.state()) {
        View::Report(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if args.grouped {
                print!("{}", report.grouped());
            } else {
                print!("{}", report);
            }
            Ok(ExitCode::SUCCESS)
        }
        View::Error(error) => {
            eprintln!("{}", error.message);
            Ok(ExitCode::FAILURE)
        }
        View::Idle | View::Loading => {
            anyhow::bail!("Prediction did not settle")
        }
    }
}
