//! This crate implements an iCalendar server serving Skatteverket's important dates for companies.
//!
//! The path and query string are
//! `/skatteverket/company.ics?foretagsform=&momsredovisningsperiod=&omsattning=&rakenskapsaretsSistaManad=&arbetsgivare=`,
//! every query parameter is optional.

use anyhow::Result;
use axum::{routing::get, Router};
use clap::Parser;
use svd_core::skatteverket_client::{self, SkatteverketClient};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod route;

#[derive(Debug, Parser)]
pub struct Arguments {
    /// the address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    /// the port to listen on
    #[arg(long, default_value_t = 8008)]
    pub port: u16,
    /// the endpoint of the important dates feed
    #[arg(long, default_value = skatteverket_client::URL)]
    pub upstream_url: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub client: SkatteverketClient,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/skatteverket/company.ics",
            get(route::skatteverket::company_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // `axum::rejection=trace` shows why a query string was rejected
                "svd_server=debug,svd_core=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Arguments::parse();
    let state = AppState {
        client: SkatteverketClient::new(args.upstream_url),
    };
    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
