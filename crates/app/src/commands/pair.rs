//! Device pairing over the push channel.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use groupguard_application::events::{QrCode, run_pairing};
use groupguard_application::{EventHub, PairingView};
use groupguard_domain::QrEncoding;
use groupguard_infrastructure::{PushChannel, QrImage};
use tracing::{info, warn};

use crate::console::{CliResult, Console};

pub async fn pair(console: &Console, qr_out: Option<PathBuf>, timeout: u64) -> CliResult {
    let token = console
        .client
        .current_token()
        .await?
        .ok_or("not logged in; run `groupguard login` first")?;

    let hub = Arc::new(EventHub::new());
    let events = hub.subscribe();
    let channel = PushChannel::new(console.client.config(), token, Arc::clone(&hub))?
        .with_store(Arc::clone(console.client.store()));
    info!(endpoint = %channel.endpoint(), "opening push channel");
    let handle = channel.spawn();

    let mut printer = ViewPrinter::new(qr_out);
    let outcome = tokio::time::timeout(
        Duration::from_secs(timeout),
        run_pairing(console.client.whatsapp(), events, |view| printer.show(view)),
    )
    .await;

    if let Err(error) = handle.close().await {
        warn!(%error, "push channel stopped with an error");
    }

    let Ok(session) = outcome else {
        return Err(format!("not paired after {timeout}s").into());
    };
    if !session?.view().paired {
        return Err("push channel closed before the device was paired".into());
    }
    println!("Device paired");
    Ok(())
}

/// Prints what changed between two views.
struct ViewPrinter {
    qr_out: Option<PathBuf>,
    last: Option<PairingView>,
}

impl ViewPrinter {
    const fn new(qr_out: Option<PathBuf>) -> Self {
        Self { qr_out, last: None }
    }

    fn show(&mut self, view: &PairingView) {
        let previous = self.last.as_ref();
        if previous.is_none_or(|last| last.status != view.status) {
            println!("{}", view.status);
        }
        if let Some(error) = &view.error {
            if previous.is_none_or(|last| last.error.as_ref() != Some(error)) {
                eprintln!("error: {error}");
            }
        }
        if let Some(code) = &view.qr {
            if previous.is_none_or(|last| last.qr.as_ref() != Some(code)) {
                self.show_code(code);
            }
        }
        self.last = Some(view.clone());
    }

    fn show_code(&self, code: &QrCode) {
        match (&self.qr_out, code.encoding) {
            (Some(path), QrEncoding::DataUrl) => {
                match QrImage::from_code(code).and_then(|image| image.write_to(path)) {
                    Ok(()) => println!("Scan the code saved to {}", path.display()),
                    Err(error) => warn!(%error, path = %path.display(), "could not save pairing code"),
                }
            }
            _ => println!("Pairing code:\n{}", code.data),
        }
    }
}
