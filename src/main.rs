/*
rollcall: A terminal client for taking classroom attendance.
Copyright (C) 2024 amFOSS

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use std::{
    fs::File,
    io,
    sync::{Arc, Mutex},
};

use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use rollcall::{
    api::rest::RestClient,
    config::{parse_timezone, Config},
    controller::AttendanceController,
    shell::Shell,
    utils::time::SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about = "Take classroom attendance from the terminal")]
struct Args {
    /// Backend origin, overrides ROLLCALL_API_URL
    #[arg(long)]
    api_url: Option<String>,
    /// IANA timezone that decides what "today" is, overrides ROLLCALL_TIMEZONE
    #[arg(long)]
    timezone: Option<String>,
    /// Initial attendance date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,
}

fn setup_tracing(config: &Config) -> anyhow::Result<()> {
    let crate_name = env!("CARGO_CRATE_NAME");

    let filter = EnvFilter::new(if config.production && config.enable_debug_libraries {
        "info".to_string()
    } else if config.production {
        format!("{crate_name}=info")
    } else if config.enable_debug_libraries {
        "trace".to_string()
    } else {
        format!("{crate_name}=trace")
    });

    let log_file = File::create(&config.log_file).context("Failed to create log file")?;

    // stdout belongs to the shell, so console logs go to stderr.
    if !config.production {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(io::stderr))
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(false)
                    .with_writer(Mutex::new(log_file)),
            );
        tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    } else {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .pretty()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        );
        tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    if let Some(timezone) = args.timezone.as_deref() {
        config.timezone = Some(parse_timezone(timezone)?);
    }

    setup_tracing(&config).context("Failed to setup tracing")?;
    info!("Tracing initialized. Continuing main...");

    let client = RestClient::new(&config.api_url, config.request_timeout)
        .context("Failed to create the HTTP client")?;
    info!("Using backend at {}", client.base_url());

    let clock = SystemClock {
        timezone: config.timezone,
    };
    let controller = AttendanceController::new(Arc::new(client), Arc::new(clock));
    if let Some(date) = args.date.as_deref() {
        if !controller.set_date(date).await {
            anyhow::bail!("Invalid --date '{}', expected YYYY-MM-DD", date);
        }
    }

    let stdin = io::stdin();
    let mut shell = Shell::new(&controller, stdin.lock(), io::stdout());
    println!("Type 'help' for the list of commands.");
    shell.run().await?;

    Ok(())
}
