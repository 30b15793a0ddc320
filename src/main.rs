//! Excaliapp - command line access to the local drawing store
//!
//! Lists, reads, saves, duplicates, and deletes drawings in the same storage
//! directory the desktop application uses.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use excaliapp::{Document, DocumentStore, MalformedPolicy, SaveRequest, StoreConfig};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Excaliapp drawing store
#[derive(Parser, Debug)]
#[command(name = "excaliapp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage directory (defaults to the platform data directory)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Skip malformed metadata files when listing instead of failing
    #[arg(long, global = true)]
    skip_malformed: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every drawing (metadata only)
    List,

    /// Show one drawing
    Get(GetArgs),

    /// Create or update a drawing
    Save(SaveArgs),

    /// Delete a drawing
    Delete {
        /// Drawing id
        id: String,
    },

    /// Copy a drawing under a new id
    Duplicate {
        /// Drawing id
        id: String,

        /// Name of the copy
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print the storage directory
    Path,
}

#[derive(Args, Debug)]
struct GetArgs {
    /// Drawing id
    id: String,

    /// Print only the raw drawing content
    #[arg(long)]
    content_only: bool,
}

#[derive(Args, Debug)]
struct SaveArgs {
    /// Drawing id (a new one is generated when omitted)
    #[arg(long)]
    id: Option<String>,

    /// Owner id
    #[arg(short, long, default_value = "")]
    user: String,

    /// Drawing name
    #[arg(short, long)]
    name: Option<String>,

    /// File holding the drawing content (stdin when omitted)
    #[arg(short, long)]
    content: Option<PathBuf>,

    /// Encoded thumbnail image
    #[arg(long)]
    thumbnail: Option<String>,

    /// Mark the drawing public
    #[arg(long)]
    public: bool,
}

/// Metadata as printed by the CLI
#[derive(Serialize)]
struct Listing<'a> {
    #[serde(flatten)]
    document: &'a Document,
    #[serde(rename = "inStorage")]
    location: excaliapp::Location,
}

impl<'a> From<&'a Document> for Listing<'a> {
    fn from(document: &'a Document) -> Self {
        Self {
            document,
            location: document.location,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing_subscriber::filter::LevelFilter::DEBUG
    } else {
        tracing_subscriber::filter::LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(level)
        .init();

    let mut config = match cli.dir {
        Some(dir) => StoreConfig::with_root(dir),
        None => StoreConfig::resolve().context("Failed to determine storage directory")?,
    };
    if cli.skip_malformed {
        config = config.malformed(MalformedPolicy::Skip);
    }
    let store = DocumentStore::open(config).context("Failed to open storage directory")?;

    match cli.command {
        Commands::List => {
            let documents = store.list().context("Failed to list drawings")?;
            let listing: Vec<Listing> = documents.iter().map(Listing::from).collect();
            print_json(&listing)
        }
        Commands::Get(args) => cmd_get(&store, args),
        Commands::Save(args) => cmd_save(&store, args),
        Commands::Delete { id } => {
            store
                .delete(&id)
                .with_context(|| format!("Failed to delete drawing {id}"))?;
            Ok(())
        }
        Commands::Duplicate { id, name } => {
            let copy = store
                .duplicate(&id, name.as_deref())
                .with_context(|| format!("Failed to duplicate drawing {id}"))?;
            print_json(&Listing::from(&copy))
        }
        Commands::Path => {
            println!("{}", store.root().display());
            Ok(())
        }
    }
}

fn cmd_get(store: &DocumentStore, args: GetArgs) -> Result<()> {
    let document = store
        .get(&args.id)
        .with_context(|| format!("Failed to read drawing {}", args.id))?;

    if args.content_only {
        io::stdout().write_all(document.content.as_bytes())?;
        return Ok(());
    }
    print_json(&Listing::from(&document))
}

fn cmd_save(store: &DocumentStore, args: SaveArgs) -> Result<()> {
    let data = match &args.content {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read content file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read content from stdin")?;
            buf
        }
    };

    let request = SaveRequest {
        id: args.id,
        user_id: args.user,
        name: args.name,
        data: Some(data),
        thumbnail: args.thumbnail,
        is_public: Some(args.public),
    };
    let saved = store
        .save(Document::from(request))
        .context("Failed to save drawing")?;
    print_json(&Listing::from(&saved))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
