use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::{load_settings, load_settings_from},
    AdminApi, HttpAdminApi, OtpController, RegisterOutcome, RegistrationController,
};
use shared::domain::Page;
use storage::MemorySessionStore;
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::{Input, TerminalView};

#[derive(Parser, Debug)]
#[command(about = "Register a college admin account with e-mail OTP confirmation")]
struct Args {
    /// Overrides the admin service base URL from settings.
    #[arg(long)]
    api_base_url: Option<String>,
    /// Settings file; defaults to ./admin_client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let mut args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    }
    .context("failed to load client settings")?;
    if let Some(url) = args.api_base_url.take() {
        settings.api_base_url = url;
    }

    let api: Arc<dyn AdminApi> =
        Arc::new(HttpAdminApi::new(&settings).context("failed to build admin api client")?);
    let store = Arc::new(MemorySessionStore::new());
    let view = Arc::new(TerminalView::default());
    let mut input = Input::stdin();

    let registration = RegistrationController::new(api.clone(), store.clone(), view.clone());

    'flow: loop {
        loop {
            let Some(email) = field(&mut args.email, "College email", &mut input).await? else {
                break 'flow;
            };
            let Some(name) = field(&mut args.name, "Name", &mut input).await? else {
                break 'flow;
            };
            let Some(password) = field(&mut args.password, "Password", &mut input).await? else {
                break 'flow;
            };
            let outcome = registration.submit(&email, &name, &password).await;
            if matches!(outcome, RegisterOutcome::OtpSent(_)) {
                break;
            }
        }

        let controller = OtpController::new(api.clone(), store.clone(), view.clone());
        controller.mount();
        println!("Type the 6-digit code. Commands: resend, back, submit, quit.");

        loop {
            let Some(line) = input.ask(&view.otp_status()).await? else {
                break 'flow;
            };
            match line.trim() {
                "quit" => break 'flow,
                "resend" => {
                    controller.resend().await;
                }
                "back" => {
                    if let Some(index) = controller.focused_cell() {
                        controller.backspace(index);
                    }
                }
                "" | "submit" => {
                    controller.submit().await;
                }
                digits => {
                    for key in digits.chars() {
                        let index = controller.focused_cell().unwrap_or(0);
                        if !controller.key_press(index, key) {
                            println!("ignored '{key}': only digits are accepted");
                        }
                    }
                    if controller.entry().is_complete() {
                        controller.submit().await;
                    }
                }
            }

            match view.page() {
                Page::Landing => break 'flow,
                Page::Registration => continue 'flow,
                Page::OtpEntry => {}
            }
        }
    }

    Ok(())
}

async fn field(
    preset: &mut Option<String>,
    label: &str,
    input: &mut Input,
) -> Result<Option<String>> {
    if let Some(value) = preset.take() {
        return Ok(Some(value));
    }
    input.ask(label).await
}
