mod config;
mod db;
mod dto;
mod guards;
mod logger;
mod routes;
mod services;


use crate::{
    config::{AppConfig, SessionStoreKind},
    dto::Error,
};
use clap::{Arg, ArgAction, Command, ValueHint};
use const_format::formatcp;
use rocket::{catch, catchers, http::Status, Build, Request, Rocket};
use std::path::Path;
use thiserror::Error;

fn cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(formatcp!(
            "{} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("COMMIT_HASH"),
            env!("COMMIT_DATE")
        ))
        .args_conflicts_with_subcommands(true)
        .arg(
            Arg::new("config")
                .help("Path to the config file")
                .short('c')
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .required(false)
                .allow_hyphen_values(true)
                .num_args(1),
        )
        .subcommand(
            Command::new("generate-config")
                .about("Generate a new config file")
                .long_about("Generate a new config file with the default values.")
                .arg(
                    Arg::new("config")
                        .help("Path to the config file")
                        .short('c')
                        .long("config")
                        .value_name("PATH")
                        .value_hint(ValueHint::FilePath)
                        .required(true)
                        .allow_hyphen_values(true)
                        .num_args(1),
                )
                .arg(
                    Arg::new("overwrite")
                        .help("Overwrite the file if it already exists")
                        .long("overwrite")
                        .action(ArgAction::SetTrue)
                ),
        )
        .subcommand(
            Command::new("test-config")
                .about("Print the config")
                .long_about("Print the config from the given file. This is useful for testing the config file.")
                .arg(
                    Arg::new("config")
                        .help("Path to the config file")
                        .short('c')
                        .long("config")
                        .value_name("PATH")
                        .value_hint(ValueHint::FilePath)
                        .required(false)
                        .allow_hyphen_values(true)
                        .num_args(1),
                ),
        )
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    IOError(#[from] std::io::Error),
    #[error("{0}")]
    DBError(#[from] db::DBError),
    #[error("{0}")]
    RocketError(#[from] rocket::Error),
    #[error("{0}")]
    FigmentError(#[from] figment::Error),
}

#[rocket::main]
async fn main() {
    let cli_matches = cli().get_matches();

    let result = match cli_matches.subcommand() {
        Some(("generate-config", sub_matches)) => {
            // `config` is a required argument, clap rejects the command without it
            match sub_matches.get_one::<String>("config") {
                Some(config_path) => {
                    let overwrite = sub_matches.get_flag("overwrite");
                    generate_config(config_path, overwrite)
                }
                None => Ok(()),
            }
        }
        Some(("test-config", sub_matches)) => {
            let config_path = sub_matches.get_one::<String>("config");
            test_config(config_path)
        }
        _ => {
            let config_path = cli_matches.get_one::<String>("config");
            run_server(config_path).await
        }
    };

    // Humanize the message if it's an error.
    if let Err(err) = result {
        let mut err = err.to_string();

        if let Some(first) = err.chars().next() {
            if first.is_ascii_lowercase() {
                err = first.to_uppercase().to_string() + &err[1..];
            }
        }

        if let Some(last) = err.chars().last() {
            match last {
                '.' | '!' | '?' => {}
                _ => err.push('.'),
            }
        }

        eprintln!("Command failed.");
        eprintln!("{}", err);
    }
}

fn generate_config(config_path: impl AsRef<Path>, overwrite: bool) -> Result<(), AppError> {
    let config_path = config_path.as_ref();

    if config_path.exists() {
        if !overwrite {
            eprintln!("The file already exists. Use the `--overwrite` flag to overwrite it.");
            eprintln!("Configuration is not generated.");
            return Ok(());
        }

        println!("The file already exists. Overwriting it.");
    }

    const JSON_CONFIG: &str = include_str!("./config/default.json");
    const TOML_CONFIG: &str = include_str!("./config/default.toml");
    const YAML_CONFIG: &str = include_str!("./config/default.yaml");

    let (file_type, file_content) = match config_path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("json") => ("JSON", JSON_CONFIG),
        Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
            ("YAML", YAML_CONFIG)
        }
        _ => ("TOML", TOML_CONFIG),
    };

    std::fs::write(config_path, file_content)?;

    let full_config_path = config_path.canonicalize()?;
    println!(
        "{} configuration has been generated at `{}`.",
        file_type,
        full_config_path.display()
    );

    Ok(())
}

fn test_config(config_path: Option<impl AsRef<Path> + Clone>) -> Result<(), AppError> {
    let app_config = AppConfig::load(config_path.clone())?;
    let rocket_config = app_config.make_rocket_config();

    if let Some(config_path) = &config_path {
        let config_path = config_path.as_ref().canonicalize()?;
        println!(
            "Configuration path has been set: `{}`",
            config_path.display()
        );
    }

    println!("Configuration has been loaded successfully.");

    println!("[Loaded Configuration]");
    println!("- address: {}", rocket_config.address);
    println!("- port: {}", rocket_config.port);
    println!("- database_url_base: <hidden>");
    println!("- database_name: {}", app_config.database_name);
    match app_config.database_max_connections {
        Some(max_connections) => println!("- database_max_connections: {}", max_connections),
        None => println!("- database_max_connections: <default>"),
    }
    println!(
        "- session_store: {}",
        match app_config.session_store {
            SessionStoreKind::Database => "database",
            SessionStoreKind::Memory => "memory",
        }
    );
    println!("- secure_cookies: {}", app_config.secure_cookies);

    println!("- limits:");
    for name in ["form", "string", "bytes", "json"] {
        match rocket_config.limits.get(name) {
            Some(limit) => println!("    - {}: {}", name, limit),
            None => println!("    - {}: <default>", name),
        }
    }
    println!("    - image: {}", app_config.image_limit());

    Ok(())
}

async fn run_server(config_path: Option<impl AsRef<Path> + Clone>) -> Result<(), AppError> {
    logger::setup_logger();

    let app_config = AppConfig::load(config_path.clone())?;
    let rocket = create_rocket_instance(&app_config)?;

    if let Some(config_path) = &config_path {
        let config_path = config_path.as_ref().canonicalize()?;
        let config_path = config_path.display().to_string();
        log::info!(target: "init", config_path; "Configuration path has been set.");
    }

    let database_name = &app_config.database_name;
    let session_store = &app_config.session_store;
    log::info!(target: "init", database_name, session_store:serde, secure_cookies = app_config.secure_cookies; "Configuration has been loaded.");

    let rocket = setup_rocket_instance(app_config, rocket).await?;
    let _rocket = rocket.launch().await?;

    Ok(())
}

/// Creates a new Rocket instance from the given configuration.
pub fn create_rocket_instance(app_config: &AppConfig) -> Result<Rocket<Build>, AppError> {
    let rocket_config = app_config.make_rocket_config();
    let rocket = Rocket::custom(rocket_config);
    Ok(rocket)
}

/// Sets up the Rocket instance with the given configuration.
/// This function will run the database migrations and create the database connection pool
/// before registering the session store, services and routes.
pub async fn setup_rocket_instance(
    app_config: AppConfig,
    rocket: Rocket<Build>,
) -> Result<Rocket<Build>, AppError> {
    let database_url_base = &app_config.database_url_base;
    let database_name = &app_config.database_name;

    log::info!(target: "db", database_name; "Running database migrations.");
    if let Err(err) = db::run_migrations(database_url_base, database_name) {
        log::error!(target: "db", database_name, err:err; "Failed to run database migrations.");
        return Err(err.into());
    }

    log::info!(target: "db", database_name; "Creating database connection pool.");
    let db_pool = db::create_database_connection_pool(
        database_url_base,
        database_name,
        app_config.database_max_connections,
    );
    let db_pool = match db_pool {
        Ok(db_pool) => db_pool,
        Err(err) => {
            log::error!(target: "db", database_name, err:err; "Failed to create database connection pool.");
            return Err(err.into());
        }
    };

    let session_store_kind = app_config.session_store;
    log::info!(target: "init", session_store_kind:serde; "Creating session store.");
    let session_store = services::create_session_store(session_store_kind, db_pool.clone());

    let rocket = rocket.register("/", catchers![default_catcher]);
    let rocket = services::register_services(rocket, db_pool, session_store);
    let rocket = routes::register_routes(rocket);
    let rocket = rocket.manage(app_config);

    Ok(rocket)
}

#[catch(default)]
fn default_catcher(status: Status, _request: &Request) -> Error {
    status.into()
}
