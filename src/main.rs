use std::process;

use tessera::{
    application::{error::AppError, loader::ContentClient},
    config,
    domain::options::{EditMode, LoadOptions},
    infra::telemetry,
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    let client = ContentClient::from_settings(&settings)?;
    info!(
        target = "tessera::cli",
        app = %client.app(),
        base_url = %settings.api.base_url,
        cache = settings.cache.enabled,
        "content client ready"
    );

    match cli_args.command {
        config::Command::Load(args) => run_load(&client, args).await,
        config::Command::Key(args) => run_key(&client, &args),
    }
}

async fn run_load(client: &ContentClient, args: config::LoadArgs) -> Result<(), AppError> {
    let mut options = LoadOptions::new();
    if args.draft {
        options = options.draft(true);
    }
    if args.edit {
        options = options.edit_mode(EditMode::On);
    }
    if let Some(lang) = args.lang {
        options = options.lang(lang);
    }
    if args.trace {
        options = options.log(true);
    }

    let content = client.load(args.ids, &options).await?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&content)?
    } else {
        serde_json::to_string(&content)?
    };
    println!("{rendered}");

    Ok(())
}

fn run_key(client: &ContentClient, args: &config::KeyArgs) -> Result<(), AppError> {
    let mut options = LoadOptions::new();
    if let Some(lang) = args.lang.as_ref() {
        options = options.lang(lang.clone());
    }

    println!("{}", client.cache_key(&args.id, &options));
    Ok(())
}
