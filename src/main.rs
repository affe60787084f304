use dotenvy::dotenv;
use moltin_shop_bot::bot::driver::ConversationDriver;
use moltin_shop_bot::bot::handlers::{self, Command};
use moltin_shop_bot::bot::RedeliveryGuard;
use moltin_shop_bot::commerce::{CommerceApi, MoltinClient};
use moltin_shop_bot::config::{get_redelivery_cache_max_size, get_redelivery_cache_ttl, Settings};
use moltin_shop_bot::logging::{init_logging, RedactionPatterns};
use moltin_shop_bot::storage::{self, SessionStore};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Initialize redaction patterns early (before logging)
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    init_logging(patterns);

    info!("Starting Moltin shop bot...");

    let settings = init_settings();
    let sessions = init_sessions(&settings).await;

    let commerce = init_commerce(&settings);

    let bot = Bot::new(settings.telegram_token.clone());
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    let driver = Arc::new(ConversationDriver::new(commerce, sessions));
    let guard = init_redelivery_guard();

    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![driver, guard])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_commerce(settings: &Settings) -> Arc<dyn CommerceApi> {
    match MoltinClient::from_settings(settings) {
        Ok(client) => {
            info!(base_url = %settings.moltin_base_url, "Commerce client initialized.");
            Arc::new(client)
        }
        Err(e) => {
            error!("Failed to initialize commerce client: {}", e);
            std::process::exit(1);
        }
    }
}

async fn init_sessions(settings: &Settings) -> Arc<dyn SessionStore> {
    match storage::open_session_store(settings.redis_url()).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open session storage: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_redelivery_guard() -> Arc<RedeliveryGuard> {
    let ttl = get_redelivery_cache_ttl();
    let max_size = get_redelivery_cache_max_size();

    info!(
        "Initializing RedeliveryGuard (ttl: {}s, max_size: {})",
        ttl, max_size
    );

    Arc::new(RedeliveryGuard::new(ttl, max_size))
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(Update::filter_message().endpoint(handle_message))
}

async fn handle_callback(
    bot: Bot,
    update: Update,
    q: CallbackQuery,
    driver: Arc<ConversationDriver>,
    guard: Arc<RedeliveryGuard>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_callback(bot, update.id.0, q, &driver, &guard).await {
        error!("Callback handler error: {:#}", e);
    }
    respond(())
}

async fn handle_message(
    bot: Bot,
    update: Update,
    msg: Message,
    driver: Arc<ConversationDriver>,
    guard: Arc<RedeliveryGuard>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_message(bot, update.id.0, msg, &driver, &guard).await {
        error!("Message handler error: {:#}", e);
    }
    respond(())
}
