use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use vivah_cli::api::ApiClient;
use vivah_cli::compress::{CompressionOptions, SourceFile};
use vivah_cli::config::ClientConfig;
use vivah_cli::upload::{UploadStatus, Uploader};
use vivah_cli::wishes::{DEFAULT_PAGE_SIZE, WishService};
use vivah_common::api::{CreateWishRequest, UpdateWishRequest, Wish};
use vivah_common::cdn::CloudinaryClient;
use vivah_common::cdn::transform;

#[derive(Parser)]
#[command(name = "vivah", version, about = "Guest client for the wedding site")]
struct Cli {
    /// Config file. Defaults to ./vivah.toml when present.
    #[arg(long, global = true, env = "VIVAH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read and write the best-wishes wall
    #[command(subcommand)]
    Wishes(WishesCommand),
    /// Upload and manage gallery photos
    #[command(subcommand)]
    Images(ImagesCommand),
    /// Event details, schedule and guest list
    #[command(subcommand)]
    Event(EventCommand),
}

#[derive(Args)]
struct Page {
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    limit: u64,
    #[arg(long, default_value_t = 0)]
    offset: u64,
}

#[derive(Subcommand)]
enum WishesCommand {
    /// Show approved wishes, newest first
    List(Page),
    /// Show your own wishes
    Mine,
    /// Post a wish, optionally with a photo
    Post {
        #[arg(long)]
        author: String,
        #[arg(long)]
        image: Option<PathBuf>,
        text: String,
    },
    /// Edit one of your wishes
    Edit {
        id: Uuid,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        author: Option<String>,
        /// Remove the attached photo
        #[arg(long)]
        remove_image: bool,
    },
    /// Delete one of your wishes
    Delete { id: Uuid },
    /// Re-read the wall periodically; repeated reads are served from cache
    Watch {
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
        #[command(flatten)]
        page: Page,
    },
}

#[derive(Subcommand)]
enum ImagesCommand {
    /// Compress and upload photos to the gallery
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// CDN folder, overriding upload.folder
        #[arg(long)]
        folder: Option<String>,
    },
    /// List gallery photos
    List {
        #[command(flatten)]
        page: Page,
        /// Only show your own photos
        #[arg(long)]
        mine: bool,
    },
    /// Delete one of your photos
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum EventCommand {
    Info,
    Schedule,
    Guests,
    Countdown,
}

struct Session {
    config: ClientConfig,
    http: reqwest::Client,
    api: ApiClient,
}

impl Session {
    fn wishes(&self) -> WishService<ApiClient> {
        WishService::with_ttl(
            self.api.clone(),
            Duration::from_secs(self.config.cache.wishes_ttl_secs),
        )
    }

    fn uploader(&self) -> Uploader {
        let cdn = Arc::new(CloudinaryClient::new(self.config.cdn.clone(), &self.http));
        Uploader::new(
            cdn,
            CompressionOptions::with_quality_fraction(self.config.upload.quality),
        )
    }

    fn require_sign_in(&self) -> Result<()> {
        if !self.api.is_signed_in() {
            bail!("This command needs a sign-in token; set api.token or VIVAH__API__TOKEN");
        }
        Ok(())
    }
}

fn print_wish(wish: &Wish) {
    println!("{}  {}", wish.id, wish.created_at.format("%Y-%m-%d %H:%M"));
    println!("  {}", wish.text);
    println!("  - {}", wish.author);
    if let Some(url) = &wish.image_url {
        println!("  photo: {}", transform::full_image_url(url));
    }
    if !wish.is_approved {
        println!("  (awaiting approval)");
    }
}

async fn run_wishes(ctx: &Session, command: WishesCommand) -> Result<()> {
    let service = ctx.wishes();
    match command {
        WishesCommand::List(page) => {
            for wish in service.list(page.limit, page.offset).await? {
                print_wish(&wish);
            }
        }
        WishesCommand::Mine => {
            ctx.require_sign_in()?;
            for wish in service.mine().await? {
                print_wish(&wish);
            }
        }
        WishesCommand::Post {
            author,
            image,
            text,
        } => {
            let mut request = CreateWishRequest {
                text: Some(text),
                author: Some(author),
                ..Default::default()
            };
            if let Some(path) = image {
                let source = SourceFile::from_path(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let folder = ctx.config.upload.wishes_folder.as_str();
                let outcome = ctx.uploader().upload(source, Some(folder)).await?;
                request.image_url = Some(outcome.asset.secure_url);
                request.image_filename = Some(outcome.original_name);
                request.image_size = Some(outcome.optimized_size as i64);
            }
            let wish = service.create(request).await?;
            println!("Posted wish {}", wish.id);
            if !wish.is_approved {
                println!("It will appear once a moderator approves it.");
            }
        }
        WishesCommand::Edit {
            id,
            text,
            author,
            remove_image,
        } => {
            ctx.require_sign_in()?;
            let mut request = UpdateWishRequest {
                text,
                author,
                ..Default::default()
            };
            if remove_image {
                request.image_url = Some(None);
                request.image_filename = Some(None);
                request.image_size = Some(None);
            }
            let wish = service.update(id, request).await?;
            print_wish(&wish);
        }
        WishesCommand::Delete { id } => {
            ctx.require_sign_in()?;
            service.delete(id).await?;
            println!("Deleted wish {id}");
        }
        WishesCommand::Watch {
            interval_secs,
            page,
        } => {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
            loop {
                ticker.tick().await;
                match service.list(page.limit, page.offset).await {
                    Ok(wishes) => println!("{} wishes on the wall", wishes.len()),
                    Err(e) => tracing::warn!(error = %e, "Could not refresh wishes"),
                }
            }
        }
    }
    Ok(())
}

async fn run_images(ctx: &Session, command: ImagesCommand) -> Result<()> {
    ctx.require_sign_in()?;
    match command {
        ImagesCommand::Upload { files, folder } => {
            let mut sources = Vec::with_capacity(files.len());
            for path in &files {
                let source = SourceFile::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                sources.push(source);
            }

            let folder = folder.or_else(|| ctx.config.upload.folder.clone());
            let uploader = ctx.uploader().with_metadata(Arc::new(ctx.api.clone()));
            let report = uploader
                .upload_batch_with_progress(sources, folder.as_deref(), &|name, status| {
                    if status != UploadStatus::Pending {
                        println!("{name}: {}", format!("{status:?}").to_lowercase());
                    }
                })
                .await;

            for name in &report.duplicates {
                println!("{name}: skipped (already selected)");
            }
            for item in &report.items {
                match &item.result {
                    Ok(outcome) => println!(
                        "{} -> {} ({} -> {} bytes)",
                        item.file_name,
                        outcome.asset.secure_url,
                        outcome.original_size,
                        outcome.optimized_size
                    ),
                    Err(e) => println!("{} failed: {e}", item.file_name),
                }
            }
            println!(
                "{} uploaded, {} failed",
                report.succeeded(),
                report.failed()
            );
            if report.succeeded() == 0 && report.failed() > 0 {
                bail!("No files were uploaded");
            }
        }
        ImagesCommand::List { page, mine } => {
            let images = ctx.api.list_images(page.limit, page.offset, mine).await?;
            for image in &images {
                println!(
                    "{}  {}  {}",
                    image.id, image.original_name, image.thumbnail_url
                );
            }
            println!("{} images", images.len());
        }
        ImagesCommand::Delete { id } => {
            ctx.api.delete_image(id).await?;
            println!("Deleted image {id}");
        }
    }
    Ok(())
}

async fn run_event(ctx: &Session, command: EventCommand) -> Result<()> {
    match command {
        EventCommand::Info => {
            let event = ctx.api.event().await?;
            println!("{}", event.title);
            println!("{}", event.couple.join(" & "));
            println!("{}", event.starts_at.format("%A, %d %B %Y"));
            println!("{}, {}", event.venue.name, event.venue.address);
        }
        EventCommand::Schedule => {
            for day in ctx.api.schedule().await? {
                println!("{} {}", day.date, day.day);
                for item in day.items {
                    println!("  {:<22} {}", item.time, item.title);
                    if !item.description.is_empty() {
                        println!("  {:<22} {}", "", item.description);
                    }
                }
            }
        }
        EventCommand::Guests => {
            let rsvp = ctx.api.guests().await?;
            for (side, guests) in [("Groom's side", &rsvp.groom), ("Bride's side", &rsvp.bride)] {
                println!("{side} ({})", guests.len());
                for guest in guests {
                    println!("  {} ({})", guest.name, guest.role);
                }
            }
        }
        EventCommand::Countdown => {
            let c = ctx.api.countdown().await?;
            if c.started {
                println!("The celebration has started!");
            } else {
                println!(
                    "{} days, {} hours, {} minutes, {} seconds to go",
                    c.days, c.hours, c.minutes, c.seconds
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let http = reqwest::Client::new();
    let api = ApiClient::new(&config.api, &http);
    let ctx = Session { config, http, api };

    match cli.command {
        Command::Wishes(command) => run_wishes(&ctx, command).await,
        Command::Images(command) => run_images(&ctx, command).await,
        Command::Event(command) => run_event(&ctx, command).await,
    }
}
