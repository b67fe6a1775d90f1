//! Ingest command implementation

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use paisa_core::{
    feed::{detect_feed_format, parse_feed, FeedFormat},
    pipeline::MessagePipeline,
};

use super::open_db;

pub fn cmd_ingest(
    db_path: &Path,
    file: &Path,
    format_str: Option<&str>,
    no_encrypt: bool,
) -> Result<()> {
    // Open file and read the first line for auto-detection
    let feed_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let mut buf_reader = BufReader::new(feed_file);

    let mut first_line = String::new();
    buf_reader
        .read_line(&mut first_line)
        .context("Failed to read feed header")?;

    // Determine feed format
    let format: FeedFormat = if let Some(format_str) = format_str {
        format_str
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown feed format: {}", format_str))?
    } else {
        detect_feed_format(&first_line).ok_or_else(|| {
            anyhow::anyhow!(
                "Could not auto-detect feed format from the first line.\n\
                 Specify --format with one of: json, csv"
            )
        })?
    };

    println!("📥 Ingesting {} feed from {}...", format, file.display());

    let db = open_db(db_path, no_encrypt)?;

    // Re-open file to parse from the beginning (including the first line)
    let feed_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let feed = parse_feed(feed_file, format)?;

    if feed.skipped > 0 {
        println!(
            "   Found {} messages ({} malformed records skipped)",
            feed.messages.len(),
            feed.skipped
        );
    } else {
        println!("   Found {} messages", feed.messages.len());
    }

    let pipeline = MessagePipeline::new(&db);
    let report = pipeline.process_batch(&feed.messages)?;

    println!("✅ Ingest complete!");
    println!("   Inserted: {}", report.inserted);
    println!("   Skipped (duplicates): {}", report.duplicates);
    if report.rejected_noise > 0 {
        println!("   Skipped (noise/OTP): {}", report.rejected_noise);
    }
    if report.rejected_unparseable > 0 {
        println!("   Skipped (unparseable): {}", report.rejected_unparseable);
    }

    let needs_review = db.count_needs_review()?;
    if needs_review > 0 {
        println!();
        println!(
            "💡 {} transactions need category review. Run 'paisa transactions review'.",
            needs_review
        );
    }

    Ok(())
}
