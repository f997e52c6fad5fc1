//! backchannel: send OAuth provider requests with repaired URLs.
//!
//! ```text
//! backchannel rewrite <URL>          print the repaired URL, send nothing
//! backchannel fetch <URL> [options]  send through the normalizing client
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Method, Request};
use serde_json::Value;

use backchannel::config::load_or_default;
use backchannel::http::{backchannel_sender, normalize_url, OutgoingRequest, Sender};
use backchannel::lifecycle::signals::cancel_on_ctrl_c;
use backchannel::lifecycle::Canceller;
use backchannel::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "backchannel")]
#[command(about = "Repair and send OAuth back-channel requests", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the repaired URL without sending anything
    Rewrite { url: String },
    /// Send a request through the normalizing client
    Fetch {
        url: String,

        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Extra header as "Name: value"; repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    match cli.command {
        Commands::Rewrite { url } => {
            println!("{}", normalize_url(&url)?);
        }
        Commands::Fetch {
            url,
            method,
            headers,
            data,
        } => {
            let request = build_request(&url, &method, &headers, data)?;
            let sender = backchannel_sender(&config.transport)?;

            let canceller = Arc::new(Canceller::new());
            let interrupt = cancel_on_ctrl_c(canceller.clone());
            let result = sender.send(request, canceller.signal()).await;
            interrupt.abort();

            print_response(result?).await?;
        }
    }

    Ok(())
}

fn build_request(
    url: &str,
    method: &str,
    headers: &[String],
    data: Option<String>,
) -> Result<OutgoingRequest, Box<dyn std::error::Error>> {
    let mut builder = Request::builder()
        .method(Method::from_bytes(method.to_ascii_uppercase().as_bytes())?)
        .uri(url);

    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header '{}' is not in 'Name: value' form", header))?;
        builder = builder.header(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }

    let body = data.map(Bytes::from).unwrap_or_default();
    Ok(builder.body(body)?)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: provider returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
