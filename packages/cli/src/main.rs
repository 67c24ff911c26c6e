//! `scafold` — terminal console for the Scafold passage reference API.
//!
//! Covers the same screens as the web console:
//!
//! - **`token`** — save, show, or remove the access token.
//! - **`search`** — find passages by text, CC label, or source.
//! - **`request`** — ask for a passage that is not registered yet.
//! - **`admin`** — register passages and work the request queue.
//! - **`passage`** — show a passage with its reference, or generate one.
//!
//! Every command reads the token persisted by `scafold token set` and sends
//! it in the configured token header. Text arguments accept `-` to read from
//! stdin.

mod render;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use scafold_api::{SearchType, DEFAULT_API_BASE_URL, TOKEN_HEADER};
use scafold_client::config::{default_token_file, DEFAULT_ORIGIN};
use scafold_client::console::messages;
use scafold_client::{
    ActionError, ApiClient, AuthState, ClientConfig, Console, FileTokenStorage, PassageForm,
    RequestForm, TokenSession,
};
use serde::Serialize;

/// scafold — passage reference console
///
/// Search passages, queue requests, register passages, and generate
/// question/answer references.
#[derive(Parser)]
#[command(name = "scafold", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: Connection,

    /// Print raw JSON instead of formatted text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Connection {
    /// Backend base URL, absolute or relative to --origin.
    #[arg(long, env = "SCAFOLD_API_BASE_URL", default_value = DEFAULT_API_BASE_URL, global = true)]
    base_url: String,

    /// Origin that a relative base URL resolves against.
    #[arg(long, env = "SCAFOLD_ORIGIN", default_value = DEFAULT_ORIGIN, global = true)]
    origin: String,

    /// Header that carries the access token.
    #[arg(long, env = "SCAFOLD_TOKEN_HEADER", default_value = TOKEN_HEADER, global = true)]
    token_header: String,

    /// File holding the persisted access token.
    #[arg(long, env = "SCAFOLD_TOKEN_FILE", value_name = "PATH", global = true)]
    token_file: Option<PathBuf>,
}

impl Connection {
    fn into_config(self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url,
            origin: self.origin,
            token_header: self.token_header,
            token_file: self.token_file.or_else(default_token_file),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Manage the access token.
    #[command(subcommand)]
    Token(TokenCommand),

    /// Search registered passages.
    Search {
        /// Search text.
        query: String,

        /// Field to match: text | cc | source
        #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "text")]
        search_type: SearchType,
    },

    /// Request a passage that is not registered yet.
    Request {
        /// Passage text (or part of it). `-` reads stdin.
        #[arg(long, value_name = "TEXT")]
        text: String,

        /// Source citation, e.g. "2024학년도 6월 모의고사 18번".
        #[arg(short = 's', long, value_name = "SOURCE", default_value = "")]
        source: String,

        /// CC name the passage should be classified under.
        #[arg(long = "cc", value_name = "NAME", default_value = "")]
        cc_name: String,
    },

    /// Passage intake and the request queue.
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Passage detail and reference generation.
    #[command(subcommand)]
    Passage(PassageCommand),
}

#[derive(Subcommand)]
enum TokenCommand {
    /// Save a token. It is sent with every later command.
    Set {
        /// The token, e.g. "admin-test-token". `-` reads stdin.
        token: String,
    },
    /// Show whether a token is set (masked).
    Show,
    /// Remove the saved token.
    Clear,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Register a new passage.
    Register {
        /// Passage body. `-` reads stdin.
        #[arg(long, value_name = "TEXT")]
        text: String,

        #[arg(short = 's', long, value_name = "SOURCE", default_value = "")]
        source: String,

        /// Comma-separated CC labels: "주제, 요지".
        #[arg(long, value_name = "LABELS", default_value = "")]
        cc_labels: String,
    },
    /// List pending passage requests.
    Pending,
    /// Mark a request complete and show the remaining queue.
    Complete {
        /// Request id.
        id: String,
    },
}

#[derive(Subcommand)]
enum PassageCommand {
    /// Show a passage and its reference.
    Show {
        /// Passage id.
        id: String,
    },
    /// Generate (or regenerate) the reference for a passage.
    Generate {
        /// Passage id.
        id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scafold=warn,scafold_client=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.connection.into_config();

    let session = TokenSession::new(FileTokenStorage::from_config(&config));
    session.hydrate();

    let client = ApiClient::new(&config).unwrap_or_else(|e| fatal(&e.to_string()));
    tracing::debug!(base = %client.base_url(), state = ?session.state(), "console ready");
    let console = Console::new(client, session);

    if let Err(e) = run(&console, cli.command, cli.json).await {
        if let ActionError::Unexpected { source, .. } = &e {
            tracing::warn!(error = %source, "action failed");
        }
        eprintln!("scafold: {}", e.user_message());
        process::exit(1);
    }
}

async fn run(console: &Console, command: Command, json: bool) -> Result<(), ActionError> {
    match command {
        Command::Token(TokenCommand::Set { token }) => {
            console.save_token(&read_text(token))?;
            print_token_status(console, json);
        }

        Command::Token(TokenCommand::Show) => print_token_status(console, json),

        Command::Token(TokenCommand::Clear) => {
            console.clear_token();
            print_token_status(console, json);
        }

        Command::Search { query, search_type } => {
            let hits = console.search(&query, search_type).await?;
            emit(json, &hits, || render::render_search_results(&hits));
        }

        Command::Request {
            text,
            source,
            cc_name,
        } => {
            let form = RequestForm {
                text: read_text(text),
                source,
                cc_name,
            };
            let record = console.submit_request(&form).await?;
            emit(json, &record, || format!("{}\n", messages::REQUEST_ACCEPTED));
        }

        Command::Admin(AdminCommand::Register {
            text,
            source,
            cc_labels,
        }) => {
            let form = PassageForm {
                text: read_text(text),
                source,
                cc_labels,
            };
            let passage = console.register_passage(&form).await?;
            emit(json, &passage, || {
                format!("{}\n\n{}", messages::PASSAGE_REGISTERED, render::render_passage(&passage))
            });
        }

        Command::Admin(AdminCommand::Pending) => {
            let queue = console.pending_requests().await?;
            emit(json, &queue, || render::render_requests(&queue));
        }

        Command::Admin(AdminCommand::Complete { id }) => {
            let queue = console.complete_request(&id).await?;
            emit(json, &queue, || render::render_requests(&queue));
        }

        Command::Passage(PassageCommand::Show { id }) => {
            let detail = console.passage_detail(&id).await?;
            let value = serde_json::json!({
                "passage": &detail.passage,
                "reference": &detail.reference,
            });
            emit(json, &value, || {
                format!(
                    "{}\n{}",
                    render::render_passage(&detail.passage),
                    render::render_reference_section(detail.reference.as_ref())
                )
            });
        }

        Command::Passage(PassageCommand::Generate { id }) => {
            let reference = console.generate_reference(&id).await?;
            emit(json, &reference, || render::render_reference(&reference));
        }
    }
    Ok(())
}

fn print_token_status(console: &Console, json: bool) {
    let session = console.session();
    let header = console.client().token_header().as_str();
    let masked = session.masked();
    let value = serde_json::json!({
        "authenticated": session.state() == AuthState::Authenticated,
        "token": masked,
        "header": header,
    });
    emit(json, &value, || match &masked {
        Some(m) => format!("토큰 활성화  {}  ({} 헤더로 전송)\n", m, header),
        None => "토큰이 설정되지 않았습니다.\n".to_string(),
    });
}

/// Print `value` as pretty JSON, or the text `render` produces.
fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce() -> String) {
    if json {
        let text = serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| fatal(&format!("failed to encode output: {}", e)));
        println!("{}", text);
    } else {
        print!("{}", render());
    }
}

/// The argument itself, or all of stdin when it is `"-"`.
fn read_text(arg: String) -> String {
    if arg != "-" {
        return arg;
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
    buf
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("scafold: {}", msg);
    process::exit(2);
}
