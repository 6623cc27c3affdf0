//! lambda-request - invoke a Lambda function with an HTTP-shaped request
//! and print what it returns.

use clap::Parser;
use lambda_request::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lambda-request", version, about = "Call a Lambda function like an HTTP endpoint")]
struct Cli {
    /// Function name or ARN
    function_name: String,

    /// Request URI, path plus optional query string
    #[arg(short, long, default_value = "/")]
    uri: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request header as `Name: value`; may be repeated
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body
    #[arg(short, long)]
    data: Option<String>,

    /// Ask for a gzip response and inflate it
    #[arg(long)]
    gzip: bool,

    /// Send the body as JSON and parse the response as JSON
    #[arg(long)]
    json: bool,

    /// Print status and headers along with the body
    #[arg(long)]
    full: bool,

    /// Do not treat 4xx/5xx responses as errors
    #[arg(long)]
    no_strict: bool,

    /// Version or alias to invoke
    #[arg(short, long, default_value = lambda_request::translator::DEFAULT_QUALIFIER)]
    qualifier: String,

    /// Log type: None or Tail
    #[arg(long, default_value = "None")]
    log_type: LogType,
}

impl Cli {
    fn request_options(&self) -> Result<RequestOptions, String> {
        let mut options = RequestOptions::new()
            .method(&self.method)
            .uri(&self.uri)
            .gzip(self.gzip)
            .json(self.json)
            .resolve_full_response(self.full)
            .strict(!self.no_strict);

        for header in &self.headers {
            let (name, value) = header
                .split_once(':')
                .ok_or_else(|| format!("invalid header '{}', expected 'Name: value'", header))?;
            options = options.header(name.trim(), value.trim());
        }

        if let Some(data) = &self.data {
            options = if self.json {
                // Send structured JSON as-is rather than as a quoted string.
                match serde_json::from_str::<serde_json::Value>(data) {
                    Ok(value) => options.body(value),
                    Err(_) => options.body(data.as_str()),
                }
            } else {
                options.body(data.as_str())
            };
        }

        Ok(options)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.request_options()?;

    let config = InvocationConfig::new(&cli.function_name)
        .qualifier(&cli.qualifier)
        .log_type(cli.log_type);

    let cache = ClientCache::from_env().await;
    let translator = Translator::configure(&cache, config).await;

    tracing::info!("Invoking {} {} on {}", cli.method, cli.uri, cli.function_name);

    match translator.send(options).await? {
        Resolved::Response(response) => {
            println!("{}", response.status);
            for (name, value) in &response.headers {
                println!("{}: {}", name, value);
            }
            println!();
            if let Some(body) = response.body {
                println!("{}", body.text());
            }
        }
        Resolved::Body(Some(body)) => println!("{}", body.text()),
        Resolved::Body(None) => {}
    }

    Ok(())
}
