//! Headless commands: the same controllers as the TUI, driven to completion once

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing::info;

use crate::api::{OutreachApi, ResourceApi, Services};
use crate::controller::{
    CareersController, ComposeForm, HistoryController, ReferralsController, ResourceController,
};
use crate::export::{export_records, ExportSettings, Exportable};
use crate::models::Resource;
use crate::notifier::Notifier;

/// Collections the `export` command can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportTarget {
    Careers,
    Referrals,
    History,
}

/// Send one resume; `Ok` carries the success text, `Err` the inline error text
pub async fn send_email(services: &Services, email: &str) -> Result<String> {
    let mut form = ComposeForm::new(services.outreach.clone(), Notifier::new());
    form.set_email(email);
    if form.submit().is_ok() {
        form.settle().await;
    }
    match form.status() {
        Some(status) if !status.is_error() => Ok(status.text.clone()),
        Some(status) => Err(anyhow!("{}", status.text)),
        None => Err(anyhow!("No response from the server")),
    }
}

/// Fetch a collection and write it; `None` when it was empty
pub async fn export(
    services: &Services,
    target: ExportTarget,
    settings: &ExportSettings,
) -> Result<Option<PathBuf>> {
    let notifier = Notifier::new();
    match target {
        ExportTarget::Careers => {
            export_collection(
                CareersController::new(services.careers.clone(), notifier),
                settings,
            )
            .await
        }
        ExportTarget::Referrals => {
            export_collection(
                ReferralsController::new(services.referrals.clone(), notifier),
                settings,
            )
            .await
        }
        ExportTarget::History => {
            export_collection(
                HistoryController::new(services.history.clone(), notifier),
                settings,
            )
            .await
        }
    }
}

async fn export_collection<R, A>(
    mut controller: ResourceController<R, A>,
    settings: &ExportSettings,
) -> Result<Option<PathBuf>>
where
    R: Resource + Exportable,
    A: ResourceApi<R> + ?Sized + 'static,
{
    controller.mount();
    controller.settle().await;
    if let Some(message) = controller.error() {
        return Err(anyhow!("Failed to load {}: {}", R::COLLECTION, message));
    }
    info!("Exporting {} {} record(s)", controller.items().len(), R::COLLECTION);
    export_records(controller.items(), settings)
}

/// `true` when the service answered the health check
pub async fn ping(api: &dyn OutreachApi) -> Result<bool> {
    api.ping()
        .await
        .map_err(|e| anyhow!("Health check failed: {}", e.user_message()))
}
