//! CLI entry point for postbook

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "postbook")]
#[command(version)]
#[command(about = "Turns one markdown file of posts into a static site", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site
    #[command(alias = "g")]
    Build,

    /// Build, then serve the site locally
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Rebuild when posts, static files or config change
        #[arg(short, long)]
        watch: bool,
    },

    /// Publish the notebook HTML export into the docs directory
    Publish {
        /// Serve the docs directory afterwards
        #[arg(short, long)]
        serve: bool,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Remove the output directory
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "postbook=debug,info"
    } else {
        "postbook=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Build => {
            let site = postbook::Site::new(&base_dir)?;
            tracing::info!("Building blog...");
            let report = build_or_exit(&site);
            println!("Build completed successfully! ({} posts)", report.posts);
        }

        Commands::Server {
            port,
            ip,
            open,
            watch,
        } => {
            let site = postbook::Site::new(&base_dir)?;

            // Build first
            build_or_exit(&site);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            let rebuild = watch.then(|| site.clone());
            postbook::server::start(&site.public_dir, &ip, port, open, rebuild).await?;
        }

        Commands::Publish {
            serve,
            port,
            ip,
            open,
        } => {
            let site = postbook::Site::new(&base_dir)?;
            match site.publish()? {
                Some(report) => {
                    println!(
                        "Published {} pages ({} blog posts) to {:?}",
                        report.pages, report.blog_posts, report.docs_dir
                    );
                    if serve {
                        postbook::server::start(&report.docs_dir, &ip, port, open, None).await?;
                    }
                }
                None => println!("Nothing to publish yet."),
            }
        }

        Commands::Clean => {
            let site = postbook::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("postbook version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Build the site, exiting non-zero with a diagnostic on failure
fn build_or_exit(site: &postbook::Site) -> postbook::commands::build::BuildReport {
    match site.build() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Build failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
