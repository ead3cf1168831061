use std::io::{stdout, Write};

use anyhow::Result;
use async_trait::async_trait;
use colorful::{Colorful, RGB};

use crate::models::Destination;
use crate::processing::DeliverySink;

/// Dry-run sink: prints reports instead of posting them.
pub struct ConsoleSink;

#[async_trait]
impl DeliverySink for ConsoleSink {
    async fn send(&self, destination: Destination, text: &str) -> Result<()> {
        let header = RGB::new(79, 70, 229); // Indigo
        let subtle = RGB::new(107, 114, 128); // Gray

        let mut stdout = stdout().lock();
        writeln!(
            stdout,
            "\n  📨 {} {}",
            "Report for".color(header),
            destination.to_string().color(subtle)
        )?;
        writeln!(stdout, "{}\n", text)?;
        stdout.flush()?;
        Ok(())
    }
}
