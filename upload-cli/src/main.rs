mod config;
mod output;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use config::{AuthConfig, Config, CookieConfig};
use output::{emit, ErrorResponse, Meta, OutputFormat, Response, UploadResult};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use upload_client::{
    FileField, FormField, LocalFs, ReqwestTransport, UploadResponse, UploadSession,
};

#[derive(Parser)]
#[command(name = "fupload")]
#[command(about = "Upload files and form data to an HTTP endpoint", long_about = None)]
struct Cli {
    /// Bootstrap URL that the upload path is appended to
    #[arg(long, global = true)]
    url: Option<String>,
    /// Session cookie
    #[arg(long, global = true, value_name = "NAME=VALUE", value_parser = parse_pair::<'='>)]
    cookie: Option<(String, String)>,
    /// Basic-auth credentials
    #[arg(long, global = true, value_name = "LOGIN:PASSWORD", value_parser = parse_pair::<':'>)]
    user: Option<(String, String)>,
    /// Print transport diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "auto")]
    output: OutputFormat,
    /// Config file [default: <config dir>/fupload/config.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send form fields and files as multipart/form-data
    Send {
        /// Path appended to the bootstrap URL
        uri: String,
        /// Form field
        #[arg(short = 'F', long = "field", value_name = "NAME=VALUE", value_parser = parse_pair::<'='>)]
        fields: Vec<(String, String)>,
        /// File to attach
        #[arg(short, long = "file", value_name = "NAME=PATH", value_parser = parse_pair::<'='>)]
        files: Vec<(String, String)>,
    },
    /// Send a file's bytes as the request body
    Raw {
        /// Path appended to the bootstrap URL
        uri: String,
        /// File to send
        path: PathBuf,
    },
}

/// Split `s` at the first `SEP`
fn parse_pair<const SEP: char>(s: &str) -> Result<(String, String), String> {
    s.split_once(SEP)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected <a>{}<b>, got {:?}", SEP, s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = run(cli)?;
    if code.code() != 0 {
        std::process::exit(code.code());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<output::ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    apply_cli_overrides(&mut config, &cli);

    let mut transport = ReqwestTransport::new();
    if let Some(secs) = config.timeout_secs {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }
    let mut session = UploadSession::with_config(transport, LocalFs, config.session_config());

    if !session.is_configured() {
        let resp: Response<UploadResult> = Response::error(
            ErrorResponse::validation_failed(
                "No bootstrap URL set (use --url or FUPLOAD_BOOTSTRAP_URL)".to_string(),
            ),
            None,
        );
        return emit(&resp, cli.output);
    }

    let sent = match cli.command {
        Commands::Send { uri, fields, files } => {
            let fields: Vec<FormField> = fields.into_iter().map(FormField::from).collect();
            let files: Vec<FileField> = files.into_iter().map(FileField::from).collect();
            session.send_multipart(&uri, &fields, &files).map(|_| ())
        }
        Commands::Raw { uri, path } => session.send_raw(&uri, &path).map(|_| ()),
    };

    let meta = Meta::from_diagnostics(session.diagnostics());
    let resp = match sent {
        Ok(()) => match session.response() {
            Some(UploadResponse::Payload(body)) => Response::ok(
                UploadResult {
                    response: body.clone(),
                },
                meta,
            ),
            Some(UploadResponse::Failed(err)) => {
                Response::error(ErrorResponse::transport(err), meta)
            }
            None => return Err(anyhow!("send completed without a response")),
        },
        Err(err) => {
            tracing::debug!(error = %err, "upload aborted");
            Response::error(ErrorResponse::from(&err), meta)
        }
    };

    emit(&resp, cli.output)
}

/// Command-line flags take precedence over the config file and environment
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.bootstrap_url = Some(url.clone());
    }
    if let Some((name, value)) = &cli.cookie {
        config.cookie = Some(CookieConfig {
            name: name.clone(),
            value: value.clone(),
        });
    }
    if let Some((login, password)) = &cli.user {
        config.auth = Some(AuthConfig {
            login: login.clone(),
            password: password.clone(),
        });
    }
    config.verbose |= cli.verbose;
}
