use anyhow::{Context, bail};
use clap::Args;
use common::Configuration;
use common::storage::create_object_store;
use keeper::{
    AdminClient, KeyLayout, ManifestScanner, OFFSET_UNSET, ReconcileReport, Reconciler,
    RetentionFilter, join,
};

pub const NOTHING_TO_DELETE: &str =
    "no segments found (try another topic, increasing the offset, or a more recent timestamp)";

/// THIS COMMAND DELETES DATA. Removed segments may be the only remaining copy
/// of that part of the topic. Use `list --all` with the same flags first, then
/// `delete --dry-run`, before running it for real.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Topic whose segments are deleted
    #[arg(short, long)]
    pub topic: String,

    /// Delete segments whose newest timestamp is below this unix timestamp (exclusive)
    #[arg(long, value_name = "TIMESTAMP")]
    pub older_than: Option<u64>,

    /// Delete segments whose offset range lies below this offset (exclusive)
    #[arg(short, long, default_value_t = OFFSET_UNSET, allow_negative_numbers = true)]
    pub offset: i64,

    /// Print every step without changing the bucket or calling the admin API
    #[arg(long)]
    pub dry_run: bool,

    /// Ignored on delete (accepted so list and delete share flags)
    #[arg(short, long)]
    pub all: bool,
}

impl DeleteArgs {
    pub async fn run(self, config: &Configuration) -> anyhow::Result<()> {
        if self.topic.is_empty() {
            bail!("Topic required (--topic or -t)");
        }
        if self.all {
            tracing::debug!("--all has no effect on delete");
        }

        let store = create_object_store(config)?;
        let admin = AdminClient::new(&config.admin_url()).context("Failed to create admin client")?;

        let scanner = ManifestScanner::new(store.clone(), KeyLayout::new(config.layout.clone()));
        let scan = scanner.scan(Some(self.topic.as_str())).await?;

        let mut records = join(&scan);
        let filter = RetentionFilter::from_flags(self.older_than, self.offset);
        if filter.apply(&mut records) == 0 {
            println!("{NOTHING_TO_DELETE}");
            return Ok(());
        }

        if self.dry_run {
            println!("Dry run (no changes being made)...");
        }

        let mut manifests = scan.manifests;
        let reconciler = Reconciler::new(store, admin, self.dry_run);
        let mut report = ReconcileReport::default();
        let result = reconciler
            .reconcile_into(&records, &mut manifests, &mut report)
            .await;

        // Printed on failure too, so the objects already deleted are visible
        print!("{}", format_report(&report, reconciler.admin()));
        result.with_context(|| format!("Failed to delete segments of topic {}", self.topic))?;
        Ok(())
    }
}

/// Progress sections for the steps that ran. A failed run stops after the
/// last section with entries and has no completion line.
fn format_report(report: &ReconcileReport, admin: &AdminClient) -> String {
    let mut out = String::new();
    let mut section = |title: &str, lines: Vec<String>| {
        if lines.is_empty() && !report.complete {
            return;
        }
        out.push_str(title);
        out.push('\n');
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
    };

    section(
        "Deleting segments...",
        report
            .deleted_objects
            .iter()
            .map(|path| format!("  delete {path}"))
            .collect(),
    );
    section(
        "Synchronizing local state...",
        report
            .synced_partitions
            .iter()
            .map(|(topic, partition)| {
                format!(
                    "  POST request to {}",
                    admin.sync_local_state_url(topic, *partition)
                )
            })
            .collect(),
    );
    section(
        "Determining if manifest segments should be removed...",
        report
            .pruned_segments
            .iter()
            .map(|pruned| format!("  removing segment {}", pruned.segment_name))
            .collect(),
    );
    section(
        "Writing new manifest...",
        report
            .rewritten_manifests
            .iter()
            .map(|manifest| {
                if report.dry_run {
                    manifest.document.clone()
                } else {
                    format!("  uploaded manifest {}", manifest.path)
                }
            })
            .collect(),
    );

    if report.complete {
        out.push_str(if report.dry_run {
            "Dry run complete\n"
        } else {
            "Complete.\n"
        });
    }
    out
}
