//! docbase CLI — documentation tool servers for LLM assistants
//!
//! Commands: serve, add, get, search, update, append, stats, completions

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use rmcp::{transport::stdio, ServiceExt};
use serde_json::{json, Value};

use docbase_core::{DocContent, DocType, Document, CONTENT_KINDS};
use docbase_gemini::GeminiClient;
use docbase_mcp::{Backend, DocsService, NotionService, Session};
use docbase_notion::NotionClient;
use docbase_store::{find_by_id, position_by_id, substring_search, DocStore};

#[derive(Parser)]
#[command(name = "docbase")]
#[command(version)]
#[command(about = "Documentation tool servers for LLM assistants")]
struct Cli {
    /// Path to the JSON store (falls back to DOCBASE_DATA_FILE, then
    /// data/documentation.json)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run an MCP server on stdio
    Serve {
        /// Which tool suite to serve
        #[arg(long, value_enum, default_value_t = ServeBackend::Local)]
        backend: ServeBackend,
        /// Generative API key for the local variant (falls back to
        /// GEMINI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
        /// Notion integration token for the notion variant (falls back to
        /// NOTION_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
    /// Create a document in the store
    Add {
        #[arg(long)]
        title: String,
        /// api_endpoint, feature, bug_report, or general
        #[arg(long)]
        doc_type: String,
        /// Initial content as a JSON object
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        parent_id: Option<String>,
    },
    /// Print one document as JSON
    Get { id: String },
    /// Substring search over the store
    #[command(alias = "s")]
    Search {
        /// Search term; omit to list everything
        query: Option<String>,
        /// Restrict to one document type
        #[arg(long)]
        doc_type: Option<String>,
    },
    /// Merge content fields into a document
    Update {
        id: String,
        /// Content fields to merge, as a JSON object
        #[arg(long)]
        content: String,
    },
    /// Append a content section to a document
    Append {
        id: String,
        /// paragraph, heading, code, list, quote, or example
        #[arg(long)]
        content_type: String,
        #[arg(long)]
        content: String,
    },
    /// Store statistics
    Stats,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ServeBackend {
    /// JSON-file store with optional generative assistance
    Local,
    /// Notion REST proxy
    Notion,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn resolve_data_file(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("DOCBASE_DATA_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data/documentation.json"))
}

fn parse_object(text: Option<&str>) -> anyhow::Result<Value> {
    match text {
        Some(text) => Ok(serde_json::from_str(text)?),
        None => Ok(Value::Object(Default::default())),
    }
}

fn print_doc(doc: &Document) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(doc)?);
    Ok(())
}

async fn serve_local(data_file: PathBuf, api_key: Option<String>) -> anyhow::Result<()> {
    let store = DocStore::open(data_file.clone())?;
    let key = api_key.or_else(|| std::env::var("GEMINI_API_KEY").ok());
    let backend: Option<Backend> = match key {
        Some(key) => Some(Arc::new(GeminiClient::new(key)?)),
        None => None,
    };
    tracing::info!(
        data_file = %data_file.display(),
        generative = backend.is_some(),
        "docbase local server listening on stdio"
    );
    let service = DocsService::new(store, Arc::new(Session::new(backend)));
    let server = service.serve(stdio()).await?;
    server.waiting().await?;
    Ok(())
}

async fn serve_notion(token: Option<String>) -> anyhow::Result<()> {
    let token = token.or_else(|| std::env::var("NOTION_TOKEN").ok());
    let client = token.map(NotionClient::new);
    tracing::info!(
        authenticated = client.is_some(),
        "docbase notion server listening on stdio"
    );
    let service = NotionService::new(Arc::new(Session::new(client)));
    let server = service.serve(stdio()).await?;
    server.waiting().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let data_file = resolve_data_file(cli.data_file);

    match cli.command {
        Some(Commands::Serve {
            backend,
            api_key,
            token,
        }) => match backend {
            ServeBackend::Local => serve_local(data_file, api_key).await?,
            ServeBackend::Notion => serve_notion(token).await?,
        },
        Some(Commands::Add {
            title,
            doc_type,
            content,
            parent_id,
        }) => {
            let doc_type: DocType = doc_type.parse()?;
            let initial = parse_object(content.as_deref())?;
            let content = DocContent::from_user_value(doc_type, &initial)?;
            let store = DocStore::open(data_file)?;
            let doc = Document::new(DocStore::generate_id(), title, content, parent_id);
            let mut docs = store.load().value;
            docs.push(doc.clone());
            store.save(&docs)?;
            print_doc(&doc)?;
        }
        Some(Commands::Get { id }) => {
            let store = DocStore::open(data_file)?;
            let docs = store.load().value;
            match find_by_id(&docs, &id) {
                Some(doc) => print_doc(doc)?,
                None => anyhow::bail!("document {id} not found"),
            }
        }
        Some(Commands::Search { query, doc_type }) => {
            let filter = doc_type.as_deref().map(str::parse::<DocType>).transpose()?;
            let store = DocStore::open(data_file)?;
            let docs = store.load().value;
            let hits = substring_search(&docs, query.as_deref().unwrap_or(""), filter);
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Some(Commands::Update { id, content }) => {
            let store = DocStore::open(data_file)?;
            let mut docs = store.load().value;
            let Some(index) = position_by_id(&docs, &id) else {
                anyhow::bail!("document {id} not found");
            };
            let patch_value: Value = serde_json::from_str(&content)?;
            let patch = DocContent::from_user_value(docs[index].doc_type, &patch_value)?;
            docs[index].content.merge(patch)?;
            docs[index].touch();
            store.save(&docs)?;
            print_doc(&docs[index])?;
        }
        Some(Commands::Append {
            id,
            content_type,
            content,
        }) => {
            if !CONTENT_KINDS.contains(&content_type.as_str()) {
                anyhow::bail!("unsupported content type: {content_type}");
            }
            let store = DocStore::open(data_file)?;
            let mut docs = store.load().value;
            let Some(index) = position_by_id(&docs, &id) else {
                anyhow::bail!("document {id} not found");
            };
            docs[index].content.append_section(&content_type, &content);
            docs[index].touch();
            store.save(&docs)?;
            print_doc(&docs[index])?;
        }
        Some(Commands::Stats) => {
            let store = DocStore::open(data_file)?;
            let docs = store.load().value;
            let count =
                |t: DocType| docs.iter().filter(|d| d.doc_type == t).count();
            let stats = json!({
                "total_documents": docs.len(),
                "by_type": {
                    "api_endpoint": count(DocType::ApiEndpoint),
                    "feature": count(DocType::Feature),
                    "bug_report": count(DocType::BugReport),
                    "general": count(DocType::General),
                },
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "docbase", &mut io::stdout());
        }
        None => {
            println!(
                "docbase v{} — documentation tool servers for LLM assistants",
                env!("CARGO_PKG_VERSION")
            );
            println!("Run `docbase --help` for usage.");
        }
    }
    Ok(())
}
