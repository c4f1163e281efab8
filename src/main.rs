use std::sync::Arc;

use chipsbag::api::HttpBagApi;
use chipsbag::config::ConfigError;
use chipsbag::design::DesignField;
use chipsbag::renderer::LogRenderer;
use chipsbag::session::FileStore;
use chipsbag::{AppConfig, BagError, Configurator};
use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Bag(#[from] BagError),
    #[error("{0}")]
    Action(String),
}

#[derive(Parser, Debug)]
#[command(name = "chipsbag", about = "Design, submit and vote on chips bags")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a guest session.
    Guest {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Submit a design. Only one submission per session is accepted.
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        flavor: String,
        /// Overrides the flavor's suggested color.
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    /// List designs by other users.
    Bags,
    /// Vote on a design from the carousel.
    Vote {
        /// Carousel positions to advance before voting.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        skip: isize,
    },
    /// Show the stored session.
    Status,
    /// Forget the stored session.
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        debug!(error = %e, "no .env file loaded");
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let api = HttpBagApi::new(&config.api_base, config.timeouts)?;
    let storage = FileStore::open(config.session_file.clone());
    let mut app = Configurator::from_config(&config, Arc::new(api), Arc::new(LogRenderer), Arc::new(storage));

    match cli.command {
        Command::Guest { name, email } => run_guest(&mut app, &name, &email).await,
        Command::Submit { name, flavor, color, image } => {
            run_submit(&mut app, &name, &flavor, color.as_deref(), image.as_deref()).await
        }
        Command::Bags => run_bags(&mut app).await,
        Command::Vote { skip } => run_vote(&mut app, skip).await,
        Command::Status => {
            print_status(&app);
            Ok(())
        }
        Command::Reset => {
            if !app.reset() {
                return Err(action_error(&app));
            }
            println!("session cleared");
            Ok(())
        }
    }
}

fn action_error(app: &Configurator) -> CliError {
    CliError::Action(app.status().unwrap_or("action failed").to_owned())
}

async fn run_guest(app: &mut Configurator, name: &str, email: &str) -> Result<(), CliError> {
    if !app.authenticate(name, email).await {
        return Err(action_error(app));
    }
    println!("signed in as {} <{}>", app.session().user_name, app.session().user_email);
    Ok(())
}

async fn run_submit(
    app: &mut Configurator,
    name: &str,
    flavor: &str,
    color: Option<&str>,
    image: Option<&str>,
) -> Result<(), CliError> {
    app.set_field(DesignField::Name, name);
    app.apply_flavor_preset(flavor);
    if let Some(color) = color {
        app.set_field(DesignField::Color, color);
    }
    if let Some(image) = image {
        app.set_field(DesignField::Image, image);
    }

    if !app.submit().await {
        return Err(action_error(app));
    }
    let design = app.design();
    println!("submitted {} ({}, {})", design.name, design.flavor, design.color);
    if let Some(status) = app.status() {
        println!("{status}");
    }
    print_carousel(app);
    Ok(())
}

async fn run_bags(app: &mut Configurator) -> Result<(), CliError> {
    if !app.rebuild_carousel().await {
        return Err(action_error(app));
    }
    print_carousel(app);
    Ok(())
}

async fn run_vote(app: &mut Configurator, skip: isize) -> Result<(), CliError> {
    app.session().vote_token()?;
    app.start().await;
    if let Some(status) = app.status() {
        return Err(CliError::Action(status.to_owned()));
    }
    app.step_carousel(skip);
    let voted = app.vote().await;
    let status = app.carousel().status().unwrap_or("nothing to vote on").to_owned();
    if !voted {
        return Err(CliError::Action(status));
    }
    println!("{status}");
    Ok(())
}

fn print_carousel(app: &Configurator) {
    let carousel = app.carousel();
    if carousel.entries().is_empty() {
        println!("no designs to vote on yet");
        return;
    }
    for (i, bag) in carousel.entries().iter().enumerate() {
        let marker = if i == carousel.index() { '>' } else { ' ' };
        println!("{marker} {:<24} {:<20} {:<8} {}", bag.id, bag.display_name(), bag.kleur, bag.smaak);
    }
}

fn print_status(app: &Configurator) {
    let session = app.session();
    match session.token {
        Some(_) => println!("guest: {} <{}>", session.user_name, session.user_email),
        None => println!("guest: not signed in"),
    }
    match &session.my_design_id {
        Some(id) if session.has_submitted => println!("submitted: {id}"),
        _ => println!("submitted: no"),
    }
    let nav = app.nav();
    println!("wizard: step {}/{} ({:?})", nav.position, nav.step_count, nav.step);
}
