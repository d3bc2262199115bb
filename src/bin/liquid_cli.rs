use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "liquid-cli")]
#[command(about = "Command line client for the LiquidAI API", long_about = None)]
struct Cli {
    /// LiquidAI API server URL
    #[arg(short, long, global = true, default_value = "http://localhost:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query a wallet's native balance
    QueryBalance {
        #[arg(long)]
        wallet: String,
    },
    /// Request a market trend prediction for a wallet
    PredictMarket {
        #[arg(long)]
        wallet: String,
    },
    /// Send native value from the server's account
    SendPayment {
        #[arg(long)]
        to: String,
        /// Amount in wei
        #[arg(long)]
        value_wei: String,
    },
    /// Register a new agent
    RegisterAgent {
        #[arg(long)]
        name: String,
    },
    /// List registered agents
    ListAgents,
    /// Check that the server is up
    Health,
}

/// Settings shared by every command handler.
struct CliConfig {
    server: String,
    client: reqwest::Client,
}

impl CliConfig {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.trim_end_matches('/'), path)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = CliConfig {
        server: cli.server,
        client: reqwest::Client::new(),
    };

    let outcome = match cli.command {
        Commands::QueryBalance { wallet } => query_balance(&config, &wallet).await,
        Commands::PredictMarket { wallet } => predict_market(&config, &wallet).await,
        Commands::SendPayment { to, value_wei } => send_payment(&config, &to, &value_wei).await,
        Commands::RegisterAgent { name } => register_agent(&config, &name).await,
        Commands::ListAgents => get_and_print(&config, "/agent/list").await,
        Commands::Health => get_and_print(&config, "/health").await,
    };

    if let Err(e) = outcome {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn query_balance(config: &CliConfig, wallet: &str) -> Result<()> {
    println!("Querying balance for wallet '{}' at {}...", wallet, config.server);
    let res = config
        .client
        .get(config.url("/balance"))
        .query(&[("address", wallet)])
        .send()
        .await
        .context("failed to reach server")?;
    let body = read_success(res).await?;
    println!("Wallet balance: {}", body["balance"].as_str().unwrap_or("?"));
    Ok(())
}

async fn predict_market(config: &CliConfig, wallet: &str) -> Result<()> {
    println!("Requesting market prediction for wallet '{}' at {}...", wallet, config.server);
    let res = config
        .client
        .get(config.url("/predict"))
        .query(&[("address", wallet)])
        .send()
        .await
        .context("failed to reach server")?;
    let body = read_success(res).await?;
    println!(
        "Predicted trend: {} ({} confidence)",
        body["trend"].as_str().unwrap_or("?"),
        body["confidence"].as_str().unwrap_or("?")
    );
    Ok(())
}

async fn send_payment(config: &CliConfig, to: &str, value_wei: &str) -> Result<()> {
    println!("Sending {} wei to '{}' via {}...", value_wei, to, config.server);
    let res = config
        .client
        .post(config.url("/payments"))
        .json(&json!({ "to": to, "value_wei": value_wei }))
        .send()
        .await
        .context("failed to reach server")?;
    let body = read_success(res).await?;
    println!("Transaction submitted: {}", body["tx_hash"].as_str().unwrap_or("?"));
    Ok(())
}

async fn register_agent(config: &CliConfig, name: &str) -> Result<()> {
    println!("Registering agent '{}' at {}...", name, config.server);
    let res = config
        .client
        .post(config.url("/agent/register"))
        .json(&json!({ "name": name }))
        .send()
        .await
        .context("failed to reach server")?;
    let body = read_success(res).await?;
    println!("Agent registered with id {}", body["id"].as_str().unwrap_or("?"));
    Ok(())
}

async fn get_and_print(config: &CliConfig, path: &str) -> Result<()> {
    let res = config
        .client
        .get(config.url(path))
        .send()
        .await
        .context("failed to reach server")?;
    let body = read_success(res).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Decode a JSON body, turning non-2xx statuses into errors carrying the server's message.
async fn read_success(res: reqwest::Response) -> Result<Value> {
    let status = res.status();
    let text = res.text().await.context("failed to read response body")?;
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

    if !status.is_success() {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());
        anyhow::bail!("server returned {}: {}", status, message);
    }
    Ok(body)
}
