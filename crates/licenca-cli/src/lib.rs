use licenca_core::models::ProcessWithCompany;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One line per process: id, type, status, progress, company, activity.
pub fn process_table(processes: &[ProcessWithCompany]) -> String {
    let mut out = format!(
        "{:<36}  {:<4}  {:<10}  {:>5}  {:<24}  {}\n",
        "ID", "TYPE", "STATUS", "PROG", "COMPANY", "ACTIVITY"
    );
    for item in processes {
        let p = &item.process;
        let owner_mark = if item.is_owner { "" } else { " (shared)" };
        out.push_str(&format!(
            "{:<36}  {:<4}  {:<10}  {:>4}%  {:<24}  {}{}\n",
            p.id,
            p.license_type.to_string(),
            p.status.to_string(),
            p.progress,
            truncate_string(&item.company.name, 24),
            truncate_string(&p.activity, 40),
            owner_mark
        ));
    }
    out
}

/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
