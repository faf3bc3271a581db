use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use alert_router::config::load_config;
use alert_router::http::MatchRequest;
use alert_router::routing::{normalize_route, AlertGroup, Labels, RouteGroupsMatcher};

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Preview notification policy routing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every route of a policy (empty group lists)
    Routes {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Attach alert groups (JSON array) to the routes they reach
    Groups {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        groups: PathBuf,
    },
    /// Match alert instances (JSON array of label maps) locally
    Match {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        instances: PathBuf,
    },
    /// Match alert instances against a running alert-router
    Preview {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
        #[arg(short, long)]
        instances: PathBuf,
    },
    /// Show the policy status of a running alert-router
    Status {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
        #[arg(short, long, env = "ALERT_ROUTER_ADMIN_KEY")]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let matcher = RouteGroupsMatcher::new();

    match cli.command {
        Commands::Routes { config } => {
            let config = load_config(&config)?;
            let root = normalize_route(&config.policy)?;
            print_json(&matcher.get_route_groups_map(&root, &[]))?;
        }
        Commands::Groups { config, groups } => {
            let config = load_config(&config)?;
            let root = normalize_route(&config.policy)?;
            let groups: Vec<AlertGroup> = read_json(&groups)?;
            print_json(&matcher.assign_groups(&root, &groups)?)?;
        }
        Commands::Match { config, instances } => {
            let config = load_config(&config)?;
            let instances: Vec<Labels> = read_json(&instances)?;
            print_json(&matcher.match_instances_to_route(&config.policy, &instances)?)?;
        }
        Commands::Preview { url, instances } => {
            let instances: Vec<Labels> = read_json(&instances)?;
            let res = reqwest::Client::new()
                .post(format!("{}/api/v1/routes/match", url))
                .json(&MatchRequest { instances })
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status { url, key } => {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
            let res = reqwest::Client::new()
                .get(format!("{}/admin/status", url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: alert-router returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    print_json(&json)
}
