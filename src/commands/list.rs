use std::collections::HashMap;

use clap::Args;
use common::Configuration;
use common::bytesize::byte_count_binary;
use common::storage::create_object_store;
use keeper::{KeyLayout, ManifestScanner, OFFSET_UNSET, RetentionFilter, ScanResult, summarize};
use tabled::settings::object::Rows;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show every remote segment instead of per-topic totals
    #[arg(short, long)]
    pub all: bool,

    /// Only show this topic
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Only count segments whose newest timestamp is below this unix timestamp (exclusive)
    #[arg(long, value_name = "TIMESTAMP")]
    pub older_than: Option<u64>,

    /// Only count segments whose offset range lies below this offset (exclusive)
    #[arg(short, long, default_value_t = OFFSET_UNSET, allow_negative_numbers = true)]
    pub offset: i64,
}

#[derive(Tabled, Debug, PartialEq, Eq)]
struct TopicRow {
    #[tabled(rename = "Topic")]
    topic: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Remote Segment Count")]
    segment_count: usize,
    #[tabled(rename = "Base Remote Offset")]
    base_offset: String,
    #[tabled(rename = "Newest Remote Offset")]
    last_offset: u64,
}

#[derive(Tabled, Debug, PartialEq, Eq)]
struct SegmentRow {
    #[tabled(rename = "Topic Name")]
    topic: String,
    #[tabled(rename = "Topic Size")]
    topic_size: String,
    #[tabled(rename = "Segment Name")]
    segment: String,
    #[tabled(rename = "Segment Size")]
    segment_size: String,
    #[tabled(rename = "Oldest Offset")]
    oldest_offset: u64,
    #[tabled(rename = "Oldest Offset Date")]
    oldest_timestamp: u64,
    #[tabled(rename = "Newest Offset")]
    newest_offset: u64,
    #[tabled(rename = "Newest Offset Date")]
    newest_timestamp: u64,
}

impl ListArgs {
    pub async fn run(self, config: &Configuration) -> anyhow::Result<()> {
        let filter = RetentionFilter::from_flags(self.older_than, self.offset);
        let store = create_object_store(config)?;
        let scanner = ManifestScanner::new(store, KeyLayout::new(config.layout.clone()));
        let scan = scanner.scan(self.topic_filter()).await?;

        let table = if self.all {
            render(segment_rows(&scan, &filter))
        } else {
            render(topic_rows(&scan, &filter))
        };
        println!("{table}");
        Ok(())
    }

    /// An empty `--topic` lists every topic.
    fn topic_filter(&self) -> Option<&str> {
        self.topic.as_deref().filter(|topic| !topic.is_empty())
    }
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn topic_rows(scan: &ScanResult, filter: &RetentionFilter) -> Vec<TopicRow> {
    summarize(scan, filter)
        .into_iter()
        .map(|summary| TopicRow {
            size: summary.size(),
            segment_count: summary.segment_count,
            base_offset: summary
                .min_base_offset
                .map_or_else(|| "-".to_string(), |offset| offset.to_string()),
            last_offset: summary.last_offset,
            topic: summary.topic,
        })
        .collect()
}

/// One row per manifest entry the filter admits, ordered by topic and then
/// oldest offset. Topic columns repeat the per-topic totals.
fn segment_rows(scan: &ScanResult, filter: &RetentionFilter) -> Vec<SegmentRow> {
    let topic_sizes: HashMap<String, String> = summarize(scan, filter)
        .into_iter()
        .map(|summary| (summary.topic.clone(), summary.size()))
        .collect();

    let mut rows: Vec<SegmentRow> = scan
        .manifests
        .values()
        .flat_map(|manifest| {
            let topic_size = topic_sizes
                .get(&manifest.topic)
                .cloned()
                .unwrap_or_default();
            manifest
                .segments
                .iter()
                .filter(move |(_, segment)| filter.admits(segment))
                .map(move |(name, segment)| SegmentRow {
                    topic: manifest.topic.clone(),
                    topic_size: topic_size.clone(),
                    segment: name.clone(),
                    segment_size: byte_count_binary(segment.size_bytes),
                    oldest_offset: segment.base_offset,
                    oldest_timestamp: segment.base_timestamp,
                    newest_offset: segment.committed_offset,
                    newest_timestamp: segment.max_timestamp,
                })
        })
        .collect();

    rows.sort_by(|a, b| {
        (&a.topic, a.oldest_offset, &a.segment).cmp(&(&b.topic, b.oldest_offset, &b.segment))
    });
    rows
}
