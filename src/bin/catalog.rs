// Walks through every pattern in the catalog using one configuration.
//
// Usage: catalog [config.toml]
// Environment: CATALOG_THEME / CATALOG_DIALECT / CATALOG_VENDOR override the
// file, DATABASE_URL / DATABASE_API_KEY feed the process-wide database handle,
// RUST_LOG controls log output.

use colored::Colorize;
use design_patterns::client::{posts_query, render_login_form, unbox_devices};
use design_patterns::components::Theme;
use design_patterns::notify::{notify_users, EmailNotifier, Notification, SmsAdapter, SmsGateway};
use design_patterns::prototype::{Book, Prototype};
use design_patterns::query::Direction;
use design_patterns::singleton::shared_database;
use design_patterns::{Catalog, CatalogConfig, ConfigError};
use rayon::prelude::*;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_config() -> Result<CatalogConfig, ConfigError> {
    let mut config = match std::env::args().nth(1) {
        Some(path) => CatalogConfig::from_file(Path::new(&path))?,
        None => CatalogConfig::default(),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

fn heading(title: &str) {
    println!("\n{}", format!("=== {title} ===").bold().cyan());
}

fn factory_example(catalog: &Catalog) {
    heading("Factory Method");
    println!("{}", render_login_form(catalog.components().as_ref()));

    // Every theme side by side, rendered in parallel off the shared registry.
    let forms: Vec<(Theme, String)> = Theme::ALL
        .par_iter()
        .map(|theme| {
            let factory = catalog.themes().get(theme.selector());
            (*theme, factory.create_button("Sign In").render())
        })
        .collect();
    for (theme, html) in forms {
        println!("{} {}", format!("[{theme}]").yellow(), html.replace('\n', ""));
    }

    let (fallback, resolution) = catalog.themes().resolve("unknown-xyz");
    println!(
        "'unknown-xyz' -> {} ({:?})",
        fallback.theme(),
        resolution
    );
}

fn abstract_factory_example(catalog: &Catalog) {
    heading("Abstract Factory");
    for line in unbox_devices(catalog.devices().as_ref()) {
        println!("  {line}");
    }
}

fn builder_example(catalog: &Catalog) {
    heading("Builder");
    for selector in catalog.dialects().selectors() {
        let mut builder = catalog.dialects().get(selector).new_builder();
        match posts_query(builder.as_mut()) {
            Ok(query) => println!("{} {}", format!("[{selector}]").yellow(), query.render()),
            Err(err) => println!("{} {}", format!("[{selector}]").red(), err),
        }
    }

    let mut builder = catalog.query_builder();
    let filtered = builder
        .table("posts")
        .where_eq("author", "ada".into())
        .order_by("published_at", Direction::Desc)
        .finalize();
    match filtered {
        Ok(query) => println!("configured dialect: {query}"),
        Err(err) => println!("configured dialect: {}", err.to_string().red()),
    }

    let rejected = builder.reset().table("posts").limit(-1).finalize();
    if let Err(err) = rejected {
        println!("limit(-1): {}", err.to_string().red());
    }
}

fn singleton_example(catalog: &Catalog) {
    heading("Singleton");
    match (catalog.database(), catalog.database()) {
        (Ok(a), Ok(b)) => {
            println!("{}", a.connection_info());
            println!("same instance: {}", std::sync::Arc::ptr_eq(&a, &b));
        }
        (Err(err), _) => println!("catalog database: {}", err.to_string().red()),
        (_, Err(err)) => println!("catalog database: {}", err.to_string().red()),
    }

    match shared_database() {
        Ok(db) => println!("process database: {}", db.connection_info()),
        Err(err) => println!("process database: {}", err.to_string().red()),
    }
}

fn adapter_example() {
    heading("Adapter");
    let sms = SmsAdapter::new(SmsGateway::new());
    let email = EmailNotifier::new();
    let senders: [&dyn Notification; 2] = [&sms, &email];

    for sender in senders {
        for result in notify_users(sender, &["+15550100", "ops@example.com"], "deploy finished") {
            match result {
                Ok(receipt) => println!("  {} #{} -> {}", receipt.channel, receipt.id, receipt.recipient),
                Err(err) => println!("  {}", err.to_string().red()),
            }
        }
    }
}

fn prototype_example() {
    heading("Prototype");
    let mut original = Book::new("Design Patterns", 25.0);
    original.load_content("The Book Content");
    let copy = original.prototype();

    println!("original: {}", original.content().unwrap_or("<not loaded>"));
    println!("copy:     {}", copy.content().unwrap_or("<not loaded>"));
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "design_patterns=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    println!("{}", "Polymorphic Construction Catalog".bold());
    println!("================================");

    let catalog = Catalog::from_config(&config);
    factory_example(&catalog);
    abstract_factory_example(&catalog);
    builder_example(&catalog);
    singleton_example(&catalog);
    adapter_example();
    prototype_example();

    ExitCode::SUCCESS
}
