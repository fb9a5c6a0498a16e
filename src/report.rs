// src/report.rs
// =============================================================================
// Writes the crawl results as a CSV file, one row per distinct page.
//
// Columns:
//   page_url            the page's canonical key (e.g. "example.com/docs")
//   heading             text of the first <h1>
//   excerpt             first paragraph, empty if there was none
//   outgoing_link_urls  every link on the page, joined with ";"
//   media_urls          every image source, joined with ";"
//
// Every field is quoted, so a row like `"example.com","Title","","A;B",""` is
// unambiguous even when a field is empty.
// =============================================================================

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::crawl::CanonicalKey;
use crate::page::PageRecord;

pub const HEADER: [&str; 5] = [
    "page_url",
    "heading",
    "excerpt",
    "outgoing_link_urls",
    "media_urls",
];

const LIST_SEPARATOR: &str = ";";

// Creates (or truncates) the file at `path` and writes the report into it
pub fn write_report(pages: &[(CanonicalKey, PageRecord)], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    write_rows(pages, file)
        .with_context(|| format!("failed to write report to {}", path.display()))
}

fn write_rows<W: Write>(pages: &[(CanonicalKey, PageRecord)], out: W) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);

    writer.write_record(HEADER)?;
    for (key, record) in pages {
        let links = record.outgoing_links.join(LIST_SEPARATOR);
        let media = record.media.join(LIST_SEPARATOR);
        writer.write_record([
            key.as_str(),
            record.heading.as_str(),
            record.excerpt.as_deref().unwrap_or_default(),
            links.as_str(),
            media.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
