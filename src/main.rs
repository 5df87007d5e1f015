mod announcer;
mod commands;
mod config;
mod domain;
mod handlers;
mod liveness;
mod metrics;
mod repo;

use std::env::VarError;
use std::net::SocketAddr;
use futures::future::join_all;
use reqwest::Url;
use rust_i18n::{i18n, t};
use teloxide::prelude::*;
use teloxide::dptree::deps;
use teloxide::update_listeners::webhooks::{axum_to_router, Options};
use teloxide::update_listeners::UpdateListener;
use crate::announcer::{Composer, CycleSettings, RefreshCycle, Scheduler, TelegramPublisher};
use crate::handlers::StartCommands;

const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";

i18n!(fallback = "en");    // load localizations with default parameters

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    pretty_env_logger::init();

    let app_config = config::AppConfig::from_env()?;

    let handler = dptree::entry()
        .branch(Update::filter_message().filter_command::<StartCommands>().endpoint(handlers::start_cmd_handler));

    let bot = Bot::new(&app_config.bot_token);
    bot.delete_webhook().await?;

    let set_my_commands_requests = _rust_i18n_available_locales()
        .into_iter()
        .map(|locale| commands::set_my_commands(&bot, locale));
    let set_my_commands_failed = join_all(set_my_commands_requests)
        .await
        .into_iter()
        .any(|res| res.is_err());
    if set_my_commands_failed {
        Err("couldn't set the bot's commands")?
    }

    let me = bot.get_me().await?;
    let bot_username = app_config.bot_username.clone()
        .unwrap_or_else(|| me.username().to_owned());
    let deep_link = announcer::deep_link(&bot_username, &app_config.web_app_short_name)?;

    let announcements = &app_config.announcements;
    log::info!("Announcements: {} cadence ({}), lookback of {} minutes, policy '{}', deletion of the previous one: {}",
        announcements.cadence, announcements.schedule, announcements.lookback.num_minutes(),
        announcements.policy, announcements.delete_previous);
    let repos = repo::Repositories::connect(&app_config.store).await?;
    let watch_button_label = t!("announcement.watch_button", locale = &announcements.locale);
    let publisher = TelegramPublisher::new(bot.clone(), watch_button_label, deep_link);
    let composer = Composer::new(&app_config.brand, &announcements.locale, announcements.policy);
    let cycle_settings = CycleSettings {
        channel: app_config.channel.clone(),
        lookback: announcements.lookback,
        delete_previous: announcements.delete_previous,
    };
    let cycle = RefreshCycle::new(repos.clone(), repos, publisher, composer, cycle_settings);
    let scheduler = Scheduler::new(announcements.schedule.clone(), cycle).spawn();

    let webhook_url: Option<Url> = match std::env::var(ENV_WEBHOOK_URL) {
        Ok(env_url) if !env_url.is_empty() => Some(env_url.parse()?),
        Ok(env_url) if env_url.is_empty() => None,
        Err(VarError::NotPresent) => None,
        _ => Err("invalid webhook URL!")?
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.http_port));
    let http_router = axum::Router::new()
        .merge(liveness::init(&app_config.brand))
        .merge(metrics::init());

    let ignore_unknown_updates = |_| Box::pin(async {});
    let deps = deps![
        app_config
    ];

    let res = match webhook_url {
        Some(url) => {
            log::info!("Setting a webhook: {url}");

            let (mut listener, stop_flag, bot_router) = axum_to_router(bot.clone(), Options::new(addr, url)).await?;
            let stop_token = listener.stop_token();

            let error_handler = LoggingErrorHandler::with_custom_text("An error from the update listener");
            let mut dispatcher = Dispatcher::builder(bot, handler)
                .default_handler(ignore_unknown_updates)
                .dependencies(deps)
                .build();
            let bot_fut = dispatcher.dispatch_with_listener(listener, error_handler);

            let srv = tokio::spawn(async move {
                let tcp_listener = tokio::net::TcpListener::bind(addr)
                    .await
                    .map_err(|err| {
                        stop_token.stop();
                        err
                    })?;
                let app = http_router.merge(bot_router);
                axum::serve(tcp_listener, app)
                    .with_graceful_shutdown(stop_flag)
                    .await
            });

            let (res, _) = futures::join!(srv, bot_fut);
            res
        }
        None => {
            log::info!("The polling dispatcher is activating...");

            let bot_fut = tokio::spawn(async move {
                Dispatcher::builder(bot, handler)
                    .default_handler(ignore_unknown_updates)
                    .dependencies(deps)
                    .enable_ctrlc_handler()
                    .build()
                    .dispatch()
                    .await
            });

            let srv = tokio::spawn(async move {
                let tcp_listener = tokio::net::TcpListener::bind(addr).await?;
                log::info!("Server running on port {}", addr.port());
                axum::serve(tcp_listener, http_router)
                    .with_graceful_shutdown(async {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            log::error!("failed to listen for the CTRL+C signal: {e}");
                        }
                        log::info!("Shutdown of the HTTP server")
                    })
                    .await
            });

            let (res, _) = futures::join!(srv, bot_fut);
            res
        }
    };

    scheduler.abort();
    log::info!("The announcement scheduler is stopped");
    res?.map_err(Into::into)
}
