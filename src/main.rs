//! `lostfound` command line entry point.
//!
//! Browses listings, reports items and moderates them against the REST
//! service configured in the environment.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use lostfound_client::api::{ApiClient, HistoryApi, ImageResolver, ItemsApi};
use lostfound_client::config::ClientConfig;
use lostfound_client::domain::history::SnapshotEntry;
use lostfound_client::domain::sort::RECENT_FEED_LEN;
use lostfound_client::domain::{
    DiffScope, HistoryAction, HistoryRecord, HistoryView, Item, ItemId, ItemStatus, ItemType,
    ListingFilter, ListingState, ListingStats, NewItem, Pagination, Panel, PhotoUpload, SortOrder,
    StatusFilter, TypeFilter, recent_feed,
};
use lostfound_client::error::ClientError;
use lostfound_client::service::{
    AdminHistoryBrowser, AdminService, FetchOutcome, FilterChange, ItemHistory, ListingService,
    run_listing_driver,
};

#[derive(Parser)]
#[command(name = "lostfound")]
#[command(about = "Browse, report and moderate lost-and-found items")]
struct Cli {
    /// Print records as JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List items matching the given filters.
    List {
        #[arg(long = "type")]
        item_type: Option<ItemType>,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Latest lost and found reports, merged.
    Recent {
        #[arg(long, default_value_t = RECENT_FEED_LEN)]
        limit: usize,
    },
    /// Interactive listing: each stdin line is a search, or `:type`,
    /// `:status`, `:sort`, `:page` followed by a value.
    Browse {
        #[arg(long = "type")]
        item_type: Option<ItemType>,
    },
    /// Show one item.
    Show { id: String },
    /// Change history of one item.
    History {
        id: String,
        /// Only diff keys present before the change.
        #[arg(long, default_value_t = false)]
        before_keys_only: bool,
    },
    /// Admin-wide change history.
    Audit {
        #[arg(long)]
        action: Option<HistoryAction>,
        #[arg(long, default_value = "")]
        changed_by: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Admin item table with counters.
    Admin {
        #[arg(long = "type")]
        item_type: Option<ItemType>,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Move an item to a new status (dicari, ditemukan, diclaim).
    Status { id: String, status: ItemStatus },
    /// Delete an item.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Report a lost or found item.
    Report {
        item_type: ItemType,
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        contact: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        photo: Option<PathBuf>,
        #[arg(long)]
        location_photo: Option<PathBuf>,
    },
    /// Service-wide counters.
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = e
                .downcast_ref::<ClientError>()
                .map_or_else(|| format!("{e:#}"), ClientError::user_message);
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOSTFOUND_LOG_JSON")
        .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(base_url = %config.api_base_url, "configuration loaded");

    let client = ApiClient::new(&config)?;
    let items = ItemsApi::new(client.clone(), config.max_upload_bytes);
    let history = HistoryApi::new(client);
    let images = ImageResolver::new(&config.asset_origin);
    let out = Output { json: cli.json };

    match cli.command {
        Command::List {
            item_type,
            status,
            search,
            sort,
            page,
        } => {
            let filter = ListingFilter {
                item_type: item_type.map_or(TypeFilter::All, TypeFilter::Only),
                status,
                search,
                sort,
            };
            let mut cursor = Pagination::requested(page, config.page_limit);
            let listing = ListingService::new(items);
            let _ = listing.fetch_page(&filter, &mut cursor).await;
            out.listing(&listing.state(), &filter)?;
            if !out.json && cursor.total() > 0 {
                println!("page {} of {}", cursor.page(), cursor.last_page());
            }
        }
        Command::Recent { limit } => {
            let lost = ListingFilter::for_type(ItemType::Lost);
            let found = ListingFilter::for_type(ItemType::Found);
            let (lost, found) =
                futures_util::future::try_join(items.list(&lost, None), items.list(&found, None))
                    .await?;
            let feed = recent_feed(lost.records, found.records, limit);
            out.items(&feed)?;
        }
        Command::Browse { item_type } => {
            let filter = ListingFilter {
                item_type: item_type.map_or(TypeFilter::All, TypeFilter::Only),
                ..ListingFilter::default()
            };
            browse(ListingService::new(items), filter, &config, out).await?;
        }
        Command::Show { id } => {
            let item = items.get(&ItemId::from(id)).await?;
            out.detail(&item, &images)?;
        }
        Command::History { id, before_keys_only } => {
            let scope = if before_keys_only {
                DiffScope::BeforeKeys
            } else {
                DiffScope::AllKeys
            };
            let entries = ItemHistory::new(history, config.item_history_limit)
                .with_scope(scope)
                .load(&ItemId::from(id))
                .await?;
            if entries.is_empty() {
                println!("No history recorded for this item.");
            }
            for entry in entries {
                print_history_header(&entry.record);
                print_history_view(&entry.view);
            }
        }
        Command::Audit {
            action,
            changed_by,
            page,
        } => {
            let mut browser = AdminHistoryBrowser::new(history, config.history_page_limit);
            browser.set_action(action);
            browser.set_changed_by(changed_by);
            browser.request_page(page);
            let records = browser.load().await?;
            if out.json {
                println!("{}", serde_json::to_string_pretty(records)?);
            } else {
                for record in records {
                    print_history_header(record);
                }
                let cursor = browser.pagination();
                println!(
                    "page {} of {} ({} records)",
                    cursor.page(),
                    cursor.last_page(),
                    cursor.total()
                );
            }
        }
        Command::Admin {
            item_type,
            status,
            search,
            page,
        } => {
            let filter = ListingFilter {
                item_type: item_type.map_or(TypeFilter::All, TypeFilter::Only),
                status,
                search,
                sort: SortOrder::Newest,
            };
            let admin = AdminService::new(items, config.admin_page_limit);
            let (outcome, cursor) = admin.load(&filter, page).await;
            if !matches!(outcome, FetchOutcome::Committed { ok: false, .. }) {
                out.stats(&admin.stats())?;
            }
            out.listing(&admin.listing().state(), &filter)?;
            if !out.json && cursor.total() > 0 {
                println!("page {} of {}", cursor.page(), cursor.last_page());
            }
        }
        Command::Status { id, status } => {
            items.update_status(&ItemId::from(id), &status).await?;
            println!("Status updated to {}.", status.label());
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete item {id}? This cannot be undone. [y/N] ")).await? {
                println!("Cancelled.");
                return Ok(());
            }
            items.delete(&ItemId::from(id)).await?;
            println!("Item deleted.");
        }
        Command::Report {
            item_type,
            title,
            location,
            date,
            contact,
            description,
            photo,
            location_photo,
        } => {
            let report = NewItem {
                item_type,
                title,
                location,
                date: Some(date),
                description,
                contact,
                photo: read_photo(photo.as_deref()).await?,
                location_photo: read_photo(location_photo.as_deref()).await?,
            };
            let created = items.create(&report).await?;
            out.detail(&created, &images)?;
        }
        Command::Stats => {
            out.stats(&items.stats().await)?;
        }
    }
    Ok(())
}

/// Runs the listing driver over stdin commands and prints every committed
/// state until stdin closes.
async fn browse(
    listing: ListingService<ItemsApi>,
    filter: ListingFilter,
    config: &ClientConfig,
    out: Output,
) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel(32);
    let pagination = Some(Pagination::new(config.page_limit));
    let driver = run_listing_driver(&listing, filter, pagination, rx, config.search_debounce);

    let reader = async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_change(&line) {
                Ok(change) => {
                    if tx.send(change).await.is_err() {
                        break;
                    }
                }
                Err(e) => eprintln!("{e}"),
            }
        }
    };

    let mut updates = listing.subscribe();
    let render_latest = |updates: &mut watch::Receiver<ListingState>| {
        let state = updates.borrow_and_update().clone();
        if matches!(state, ListingState::Loading | ListingState::Idle) {
            return;
        }
        if let Err(e) = out.listing(&state, &listing.committed_filter()) {
            eprintln!("error: {e}");
        }
    };
    let render = async {
        while updates.changed().await.is_ok() {
            render_latest(&mut updates);
        }
    };

    tokio::select! {
        _ = async { tokio::join!(driver, reader) } => {}
        () = render => {}
    }
    // The driver may commit its last fetch in the same poll that ends it.
    if updates.has_changed().unwrap_or(false) {
        render_latest(&mut updates);
    }
    listing.detach();
    Ok(())
}

fn parse_change(line: &str) -> Result<FilterChange, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(FilterChange::Search(line.to_string()));
    };
    let (name, value) = command.split_once(' ').unwrap_or((command, ""));
    let value = value.trim();
    match name {
        "type" if value.is_empty() || value == "all" => Ok(FilterChange::Type(TypeFilter::All)),
        "type" => value.parse().map(|t| FilterChange::Type(TypeFilter::Only(t))),
        "status" => value.parse().map(FilterChange::Status),
        "sort" => value.parse().map(FilterChange::Sort),
        "page" => value
            .parse()
            .map(FilterChange::Page)
            .map_err(|e| format!("invalid page: {e}")),
        other => Err(format!("unknown command :{other}")),
    }
}

async fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(prompt.as_bytes()).await?;
    stderr.flush().await?;
    let mut answer = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn read_photo(path: Option<&Path>) -> anyhow::Result<Option<PhotoUpload>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        bail!("{} has no usable file name", path.display());
    };
    Ok(Some(PhotoUpload::new(name, bytes)))
}

fn print_history_header(record: &HistoryRecord) {
    let by = if record.changed_by.is_empty() {
        "-"
    } else {
        record.changed_by.as_str()
    };
    println!(
        "{}  {:<15} by {}  {}",
        record.changed_at.as_deref().unwrap_or("-"),
        record.action.label(),
        by,
        record.description.as_deref().unwrap_or_default()
    );
}

fn print_history_view(view: &HistoryView) {
    let print_entries = |title: &str, entries: &[SnapshotEntry]| {
        println!("    {title}:");
        for entry in entries {
            println!("      {}: {}", entry.field, entry.value);
        }
    };
    match view {
        HistoryView::Initial(entries) => print_entries("Initial data", entries),
        HistoryView::Removed(entries) => print_entries("Deleted data", entries),
        HistoryView::Changes(changes) if changes.is_empty() => println!("    (no field changes)"),
        HistoryView::Changes(changes) => {
            for change in changes {
                println!(
                    "    {}: {} -> {}",
                    change.field,
                    change.old_display(),
                    change.new_display()
                );
            }
        }
        HistoryView::Empty => {}
    }
}

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn listing(self, state: &ListingState, filter: &ListingFilter) -> anyhow::Result<()> {
        match state.panel() {
            Panel::Loading => println!("Loading..."),
            Panel::Error(message) => bail!("{message}"),
            Panel::EmptyState if self.json => println!("[]"),
            Panel::EmptyState if filter.is_narrowed() => {
                println!("No items found. Try adjusting your search or filters.");
            }
            Panel::EmptyState => println!("No items have been reported yet."),
            Panel::Feed(items) => self.items(items)?,
        }
        Ok(())
    }

    fn items(self, items: &[Item]) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(items)?);
            return Ok(());
        }
        for item in items {
            let date = item
                .sort_key()
                .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
            println!(
                "{:<8} {:<6} {:<10} {}  {}  @ {}",
                item.id,
                item.item_type.map_or("-", ItemType::as_str),
                item.status.label(),
                date,
                item.title,
                if item.location.is_empty() { "-" } else { item.location.as_str() }
            );
        }
        Ok(())
    }

    fn detail(self, item: &Item, images: &ImageResolver) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(item)?);
            return Ok(());
        }
        println!("{} ({})", item.title, item.item_type.map_or("-", ItemType::label));
        println!("  id:          {}", item.id);
        println!("  status:      {}", item.status.label());
        println!("  location:    {}", item.location);
        println!("  date:        {}", item.date.as_deref().unwrap_or("-"));
        println!("  contact:     {}", item.contact.as_deref().unwrap_or("-"));
        println!("  description: {}", item.description);
        if let Some(url) = images.resolve_item(item) {
            println!("  photo:       {url}");
        }
        if let Some(url) = item.location_photo.as_deref().and_then(|p| images.resolve(p)) {
            println!("  location photo: {url}");
        }
        Ok(())
    }

    fn stats(self, stats: &ListingStats) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(stats)?);
        } else {
            println!(
                "total {}  lost {}  found {}  claimed {}",
                stats.total_items, stats.lost_items, stats.found_items, stats.claimed_items
            );
        }
        Ok(())
    }
}
