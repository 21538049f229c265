use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Operator CLI for the backend proxy", long_about = None)]
struct Cli {
    /// Base URL of the running proxy.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Path of the health endpoint.
    #[arg(long, default_value = "/api/health")]
    health_path: String,

    /// Mount prefix of the proxy route.
    #[arg(long, default_value = "/api/proxy")]
    mount_prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the proxy has an upstream configured
    Health,
    /// Send a request through the proxy
    Call {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,
        /// Upstream path, e.g. users/42
        path: String,
        /// Raw request body
        #[arg(short, long)]
        data: Option<String>,
        /// Bearer token for the Authorization header
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}{}", base, cli.health_path)).send().await?;
            print_response(res).await?;
        }
        Commands::Call {
            method,
            path,
            data,
            token,
        } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let url = format!("{}{}/{}", base, cli.mount_prefix, path.trim_start_matches('/'));

            let mut headers = HeaderMap::new();
            if let Some(token) = token {
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", token))?,
                );
            }

            let mut request = client.request(method, url);
            if let Some(data) = data {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                request = request.body(data);
            }

            let res = request.headers(headers).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if status.is_success() {
        println!("{}", status);
    } else {
        eprintln!("Error: proxy returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
