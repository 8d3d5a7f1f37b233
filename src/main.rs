mod activity;
mod args;
mod auth;
mod commands;
mod config;
mod dispatch;
mod error;
mod handler;
mod platform;
mod web;

use std::sync::Arc;

use serenity::all::{Client, GatewayIntents};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::handler::Handler;
use crate::platform::ShardManagerContainer;

#[tokio::main]
async fn main() {
    // Loads environment variables from `./.env` if present; a populated
    // real environment works just as well. See `./.env.example`.
    dotenv::dotenv().ok();

    // Initialize the logger to use environment variables. `RUST_LOG=info`
    // is a good default.
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("{error}");
            std::process::exit(1);
        }
    };

    web::spawn_keepalive(config.keepalive_port);
    if let Some(url) = config.keepalive_url.clone() {
        web::spawn_self_ping(url);
    }

    let dispatcher = Arc::new(Dispatcher::new(commands::registry()));

    let gateway_intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(&config.token, gateway_intents)
        .event_handler(Handler::new(dispatcher))
        .await
        .expect("Error creating client");

    client
        .data
        .write()
        .await
        .insert::<ShardManagerContainer>(client.shard_manager.clone());

    if let Err(why) = client.start().await {
        tracing::error!("Client error: {why:?}");
    }
}
