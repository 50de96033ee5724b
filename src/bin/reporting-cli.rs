use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use reporting_service::security::basic_header;

#[derive(Parser)]
#[command(name = "reporting-cli")]
#[command(about = "Command-line client for the reporting service", long_about = None)]
struct Cli {
    /// Reporting service base URL.
    #[arg(short, long, default_value = "http://localhost:8090")]
    url: String,

    /// Admin API base URL.
    #[arg(long, default_value = "http://localhost:8092")]
    admin_url: String,

    /// Admin API key.
    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    /// Basic auth user for /reporting.
    #[arg(long)]
    user: Option<String>,

    #[arg(long, default_value = "")]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a business record
    Business {
        id: String,
        #[arg(long, default_value_t = 500)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Check service liveness
    Health,
    /// Show service status (admin)
    Status,
    /// Show per-instance breaker and limiter state (admin)
    Instances,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut admin_headers = HeaderMap::new();
    admin_headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", cli.key))?);

    match cli.command {
        Commands::Business { id, limit, offset } => {
            let mut request = client
                .post(format!("{}/reporting", cli.url))
                .json(&json!({ "business_id": id, "limit": limit, "offset": offset }));
            if let Some(user) = &cli.user {
                request = request.header(AUTHORIZATION, basic_header(user, &cli.password));
            }
            print_response(request.send().await?).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.admin_url))
                .headers(admin_headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Instances => {
            let res = client
                .get(format!("{}/admin/instances", cli.admin_url))
                .headers(admin_headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) if !text.is_empty() => println!("{}", text),
        Err(_) => {}
    }
    Ok(())
}
