//! sitecfg - Main entry point
//!
//! Evaluates the blog site configuration for a build mode and exposes the
//! template helpers on the command line.

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use sitecfg::cli::{Cli, Commands};
use sitecfg::{article_date, Article, ArticleDate, LogCollaborator, SiteConfig, SiteManifest};

/// Initialize the logger; `RUST_LOG` overrides the default `info` level
fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logger();

    let cli = Cli::parse_args();
    debug!(mode = %cli.mode, "CLI arguments parsed");

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

/// Site for the selected mode, from a manifest or the built-in declarations
fn load_site(cli: &Cli) -> Result<SiteConfig> {
    match &cli.config {
        Some(path) => {
            info!("Loading site manifest: {:?}", path);
            let manifest = SiteManifest::load_from_file(path)?;
            manifest.validate()?;
            Ok(manifest.into_site(cli.mode))
        }
        None => Ok(SiteConfig::blog_default(cli.mode)),
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Show => {
            let site = load_site(&cli)?;
            let json = site.to_json()?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Validate { manifest } => {
            info!("Validating manifest: {:?}", manifest);
            SiteManifest::load_from_file(manifest)?.validate()?;
            println!("✓ Manifest is valid: {:?}", manifest);
        }
        Commands::Init { output } => {
            SiteManifest::blog_default().save_to_file(output)?;
            println!("✓ Wrote {:?}", output);
        }
        Commands::Activate => {
            let site = load_site(&cli)?;
            let mut collaborator = LogCollaborator::default();
            site.activate(&mut collaborator)?;
            println!("{}", collaborator.activated.join("\n"));
        }
        Commands::ArticleDate { published, date } => {
            let parse = |value: &Option<String>| -> Result<Option<ArticleDate>> {
                value
                    .as_deref()
                    .map(|s| {
                        s.parse::<ArticleDate>()
                            .with_context(|| format!("Invalid date {:?}", s))
                    })
                    .transpose()
            };
            let article = Article {
                title: "command line".to_string(),
                published: parse(published)?,
                date: parse(date)?,
                ..Default::default()
            };
            println!("{}", article_date(&article)?);
        }
        Commands::TagPath { tag } => {
            let site = load_site(&cli)?;
            let blog = site
                .blog()
                .context("The blog extension is not activated in this mode")?;
            let path = blog
                .tag_path(tag)
                .with_context(|| format!("Tag {:?} has no URL-safe characters", tag))?;
            println!("{}", path);
        }
    }

    Ok(())
}
