use anyhow::Context;
use serde::Serialize;

const BAR_WIDTH: usize = 20;

/// Initialize tracing for the CLI. Logs go to stderr so JSON output stays clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// `[#########-----------]  45%`, with a `~` suffix for estimated progress.
pub fn progress_bar(percent: u8, exact: bool) -> String {
    let percent = percent.min(100);
    let filled = BAR_WIDTH * percent as usize / 100;
    format!(
        "[{}{}] {:>3}%{}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent,
        if exact { "" } else { "~" }
    )
}
