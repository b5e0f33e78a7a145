use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use petneed_chat::{AppContext, Delivery, Event, Reply, Source};
use petneed_core::config::{expand_path, Config, Settings};
use petneed_core::traits::{FavoritesStore, Fetcher};
use petneed_core::{Normalizer, Pet, SearchCriteria, Species};
use petneed_http::{GeminiExtractor, HttpFetcher, HttpImageProxy};
use petneed_store::{FileFetcher, JsonFileFavorites, MemoryFavorites, PetStore};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Dog,
    Cat,
}

impl From<Kind> for Species {
    fn from(kind: Kind) -> Self {
        match kind { Kind::Dog => Species::Dog, Kind::Cat => Species::Cat }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "petneed",
    about = "Browse and search adoptable shelter animals from the open-data feed",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Upstream URL or local JSON snapshot; overrides `source.url`
    #[clap(long, global = true)]
    source: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Number of loaded records
    Count,
    /// Next pets in rotation, optionally of one species
    Next {
        #[clap(long, value_enum)]
        kind: Option<Kind>,
        #[clap(long, short = 'n', default_value_t = 1)]
        count: usize,
    },
    /// Look a pet up by identifier
    Get { id: String },
    /// Filter by criteria; color is a substring match on the coat
    Search {
        #[clap(long)]
        kind: Option<String>,
        #[clap(long)]
        sex: Option<String>,
        #[clap(long)]
        body_type: Option<String>,
        #[clap(long)]
        age: Option<String>,
        #[clap(long)]
        color: Option<String>,
    },
    /// Talk to the bot on stdin; `postback <data>` and `unsend` simulate events
    Chat {
        #[clap(long, default_value = "local")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let mut settings = config.settings()?;
    if let Some(source) = cli.source { settings.source.url = source; }
    let timeout = settings.source.timeout_secs.map(Duration::from_secs);

    let store = open_store(&settings, timeout).await?;
    match cli.command {
        Command::Count => {
            println!("📊 {} pets loaded from {}", store.count().await, store.source_url());
        }
        Command::Next { kind, count } => {
            for _ in 0..count {
                let pet = match kind {
                    Some(kind) => store.next_of_species(kind.into()).await?,
                    None => store.next().await?,
                };
                match pet {
                    Some(pet) => print_pet(&pet),
                    None => {
                        println!("🐾 No pet found");
                        break;
                    }
                }
            }
        }
        Command::Get { id } => match store.by_id(&id).await {
            Some(pet) => print_pet(&pet),
            None => println!("🐾 No pet with id {}", id),
        },
        Command::Search { kind, sex, body_type, age, color } => {
            let criteria = SearchCriteria { kind, sex, body_type, age, color };
            let results = store.search(&criteria).await;
            println!("🔍 Found {} pets", results.len());
            for pet in &results { print_pet(pet); }
        }
        Command::Chat { user } => chat(build_context(store, &settings, timeout)?, &user).await?,
    }
    Ok(())
}

async fn open_store(settings: &Settings, timeout: Option<Duration>) -> anyhow::Result<PetStore> {
    let url = settings.source.url.clone();
    let fetcher: Arc<dyn Fetcher> = if FileFetcher::handles(&url) {
        Arc::new(FileFetcher)
    } else {
        Arc::new(HttpFetcher::new(timeout)?)
    };
    info!(url = %url, "loading pets");
    let store = PetStore::new(fetcher, url.clone())
        .with_normalizer(Normalizer::with_schema(settings.source.schema))
        .open()
        .await
        .with_context(|| format!("Failed to load pets from {url}"))?;
    Ok(store)
}

fn build_context(
    store: PetStore,
    settings: &Settings,
    timeout: Option<Duration>,
) -> anyhow::Result<AppContext> {
    let favorites: Arc<dyn FavoritesStore> = match &settings.favorites.path {
        Some(path) => Arc::new(JsonFileFavorites::new(expand_path(path))),
        None => Arc::new(MemoryFavorites::new()),
    };
    let mut ctx = AppContext::new(Arc::new(store), favorites);
    if let Some(server) = settings.images.server.as_deref().filter(|s| !s.is_empty()) {
        ctx = ctx.with_image_proxy(Arc::new(HttpImageProxy::new(server, timeout)?));
    }
    match GeminiExtractor::from_settings(&settings.gemini, timeout)? {
        Some(extractor) => ctx = ctx.with_extractor(Arc::new(extractor)),
        None => info!("gemini.api_key not set, criteria extraction disabled"),
    }
    Ok(ctx)
}

async fn chat(ctx: AppContext, user: &str) -> anyhow::Result<()> {
    println!(
        "💬 petneed chat ({} pets). Try 狗, 貓, 收藏, favorite <id>; Ctrl-D to quit.",
        ctx.store().count().await
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let source = Source::user(user);
        let event = if let Some(data) = line.strip_prefix("postback ") {
            Event::Postback { source, data: data.to_string() }
        } else if line.trim() == "unsend" {
            Event::Unsend { source }
        } else {
            Event::Message { source, text: line }
        };
        match ctx.dispatch(&event).await {
            Some(Delivery::Reply(reply)) => print_reply(&reply),
            Some(Delivery::Push { target, reply }) => {
                println!("📣 push to {}", target);
                print_reply(&reply);
            }
            None => println!("(no reply)"),
        }
    }
    Ok(())
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Pet(pet) => print_pet(pet),
        Reply::Carousel { title, pets } => {
            println!("📚 {} ({})", title, pets.len());
            for pet in pets {
                print_pet(pet);
            }
        }
        Reply::Text(text) => println!("🤖 {}", text),
    }
}

fn print_pet(pet: &Pet) {
    let or_unknown = |v: &str| if v.is_empty() { "不詳".to_string() } else { v.to_string() };
    println!("\n🐾 {}  (id={}, {})", or_unknown(&pet.name), pet.id, pet.species());
    for (label, value) in [
        ("種類", &pet.variety),
        ("性別", &pet.sex),
        ("體型", &pet.build),
        ("毛色", &pet.hair_type),
        ("年紀", &pet.age),
        ("收容所", &pet.resettlement),
        ("聯絡電話", &pet.phone),
    ] {
        println!("   {}: {}", label, or_unknown(value));
    }
    if !pet.image_name.is_empty() { println!("   🖼  {}", pet.image_name); }
}
