use fileshare_client::{FileAction, Notification, NotificationLevel, View};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Plain-text table of the registry part of a view.
pub fn files_table(view: &View) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} files, {} of {} used ({:.1}%)\n",
        view.usage.file_count, view.usage.total_label, view.usage.capacity_label, view.usage.percent
    ));

    if view.files.is_empty() {
        out.push_str("\nNo files found.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<14} {:<32} {:>10} {:<16} {:<12} {:<7} {}\n",
        "ID", "Name", "Size", "Uploaded", "Owner", "Public", "Actions"
    ));
    out.push_str(&"-".repeat(120));
    out.push('\n');

    for row in &view.files {
        let actions: Vec<&str> = row.actions.iter().map(FileAction::label).collect();
        out.push_str(&format!(
            "{:<14} {:<32} {:>10} {:<16} {:<12} {:<7} {}\n",
            truncate_string(&row.id, 14),
            truncate_string(&row.name, 32),
            row.size_label,
            row.uploaded_label.as_deref().unwrap_or("-"),
            truncate_string(row.owner.as_deref().unwrap_or("-"), 12),
            if row.is_public { "yes" } else { "no" },
            actions.join(",")
        ));
    }
    out
}

/// One line per queued upload.
pub fn queue_lines(view: &View) -> Vec<String> {
    view.queue
        .iter()
        .map(|row| {
            let mut line = format!(
                "{:<32} {:>10} {:<9} {:>5.1}%  {}",
                truncate_string(&row.file_name, 32),
                row.size_label,
                row.status,
                row.progress,
                row.message
            );
            if let Some(url) = &row.file_url {
                line.push_str(&format!("  {}", url));
            }
            line
        })
        .collect()
}

/// Notification line for stderr, prefixed by its level.
pub fn notification_line(notification: &Notification) -> String {
    let prefix = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    format!("[{}] {}", prefix, notification.message)
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
