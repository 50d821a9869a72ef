//! `engenha` -- command-line companion of the Engenha dashboard.
//!
//! Signs in against the hosted backend, loads the workspace overview and
//! prints it as JSON.
//!
//! # Environment variables
//!
//! | Variable                 | Required | Default                 | Description                      |
//! |--------------------------|----------|-------------------------|----------------------------------|
//! | `ENGENHA_GATEWAY_URL`    | yes      | --                      | Hosted backend project URL       |
//! | `ENGENHA_ANON_KEY`       | yes      | --                      | Public API key                   |
//! | `ENGENHA_EMAIL`          | no       | --                      | Account to sign in with          |
//! | `ENGENHA_PASSWORD`       | no       | --                      | Password of that account         |
//! | `REQUEST_TIMEOUT_SECS`   | no       | `30`                    | HTTP timeout                     |
//! | `SITE_URL`               | no       | `http://localhost:8080` | Dashboard URL for redirect links |

use anyhow::Context;
use engenha_client::{ClientConfig, EngenhaClient};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "engenha_client=info,engenha_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().context("Invalid configuration")?;
    tracing::info!(gateway_url = %config.gateway_url, "Starting engenha client");

    let client = EngenhaClient::connect(&config).context("Failed to build gateway client")?;

    match (std::env::var("ENGENHA_EMAIL"), std::env::var("ENGENHA_PASSWORD")) {
        (Ok(email), Ok(password)) => {
            client
                .auth
                .sign_in(&json!({ "email": email, "password": password }))
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))
                .context("Sign-in failed")?;
        }
        _ => tracing::info!("No credentials provided, loading public data only"),
    }

    tokio::join!(
        client.dashboard.load(),
        client.billing.load(),
        client.obras.load(),
    );

    let summary = client.summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    client.auth.sign_out().await;
    Ok(())
}
