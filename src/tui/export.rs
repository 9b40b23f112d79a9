use crate::model::HistoryRecord;
use crate::render::render;
use crate::text_summary::build_text_summary;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

fn export_file_name(record: &HistoryRecord) -> String {
    format!("consult-{}.json", record.id)
}

/// Export a history record as JSON into the current directory.
/// Returns the absolute path of the exported file.
pub fn export_record_json(record: &HistoryRecord) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("get current directory")?;
    let path = current_dir.join(export_file_name(record));
    crate::storage::export_json(&path, record)?;
    Ok(path)
}

/// Plain-text form of a record for pasting elsewhere.
pub fn clipboard_text(record: &HistoryRecord) -> String {
    let mut lines = vec![format!("查詢: {}", record.query), String::new()];
    lines.extend(build_text_summary(&render(&record.result)).lines);
    lines.join("\n")
}

/// Initialize the clipboard manager thread if not already initialized.
/// Each clipboard instance is kept alive for a while so clipboard managers on
/// Linux have time to read the contents.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                match Clipboard::new() {
                    Ok(mut clipboard) => {
                        if clipboard.set_text(&text).is_ok() {
                            std::thread::sleep(Duration::from_secs(2));
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue text for the clipboard without blocking the UI thread.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
