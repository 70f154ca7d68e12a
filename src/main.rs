use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod actions;
mod aggregate;
mod ai;
mod dataset;
mod error;
mod explore;
mod filter;
mod heatmap;
mod models;
mod outlier;
mod pareto;
mod recurrence;
mod report;
mod store;

use aggregate::Dimension;
use filter::{SortKey, SortState};
use models::DefectRecord;
use store::RecordStore;

const TABLE_DISPLAY_CAP: usize = 50;

#[derive(Parser)]
#[command(name = "defect-analytics")]
#[command(about = "Descriptive analytics and anomaly flags over manufacturing defect records", long_about = None)]
struct Cli {
    /// Load records from a CSV export instead of generating synthetic data
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Synthetic record count when no CSV is given
    #[arg(long, global = true, default_value_t = 240)]
    count: usize,

    /// Seed for the synthetic generator
    #[arg(long, global = true, default_value_t = 7)]
    seed: u64,

    /// Emit the view as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grouped counts along one dimension
    Summary { dimension: String },
    /// Frequency ranking with cumulative percentages
    Pareto { dimension: String },
    /// Records outside the statistical bounds, with reason codes
    Outliers {
        #[arg(long, default_value_t = outlier::DEFAULT_THRESHOLD)]
        threshold: f64,
    },
    /// Defect x station x shift cube for the most frequent defects
    Heatmap {
        #[arg(long, default_value_t = heatmap::TOP_DEFECT_LIMIT)]
        top: usize,
    },
    /// Recurring (defect, station, part) clusters
    Triads {
        #[arg(long, default_value = "score")]
        by: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Drill into one defect: stations, parts, shifts, raw samples
    Explore {
        #[arg(long)]
        defect: Option<String>,
    },
    /// Top containment candidates for one defect
    Actions {
        #[arg(long)]
        defect: Option<String>,
    },
    /// Search, filter and sort the record table
    Table {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        outliers_only: bool,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = outlier::DEFAULT_THRESHOLD)]
        threshold: f64,
    },
    /// Flag or unflag a record, optionally attaching a note
    Flag {
        id: u32,
        #[arg(long)]
        clear: bool,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the record set to a CSV file
    Export {
        #[arg(long, default_value = "defects.csv")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long, default_value_t = outlier::DEFAULT_THRESHOLD)]
        threshold: f64,
    },
    /// Send flagged and outlier records to the AI analysis endpoint
    Analyze {
        #[arg(long, default_value_t = outlier::DEFAULT_THRESHOLD)]
        threshold: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let records = match &cli.csv {
        Some(path) => dataset::load_csv(path)
            .with_context(|| format!("failed to load records from {}", path.display()))?,
        None => dataset::generate(cli.count, cli.seed),
    };
    let mut store = RecordStore::new(records)?;

    match cli.command {
        Commands::Summary { dimension } => {
            let dimension: Dimension = dimension.parse().map_err(anyhow::Error::msg)?;
            match dimension {
                Dimension::Reporter => {
                    let groups = aggregate::reporter_severity(store.records());
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&groups)?);
                    } else {
                        for group in groups {
                            println!(
                                "- {}: {} defects, avg severity {:.2}",
                                group.key, group.count, group.average
                            );
                        }
                    }
                }
                Dimension::Shift => {
                    let groups = aggregate::shift_resolution(store.records());
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&groups)?);
                    } else {
                        for group in groups {
                            println!(
                                "- {}: {} defects, avg resolution {:.2}h",
                                group.key, group.count, group.average
                            );
                        }
                    }
                }
                _ => {
                    let groups = aggregate::aggregate(store.records(), dimension);
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&groups)?);
                    } else {
                        for group in groups {
                            println!("- {}: {} defects", group.key, group.count);
                        }
                    }
                }
            }
        }
        Commands::Pareto { dimension } => {
            let dimension: Dimension = dimension.parse().map_err(anyhow::Error::msg)?;
            let rows = pareto::pareto(store.records(), dimension);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    println!(
                        "- {}: {} ({:.2}%, cumulative {:.2}%)",
                        row.key, row.count, row.pct, row.cum_pct
                    );
                }
            }
        }
        Commands::Outliers { threshold } => {
            let threshold = outlier::validate_threshold(threshold)?;
            let bounds = outlier::compute_bounds(store.records(), threshold);
            let flagged: Vec<&DefectRecord> = store
                .records()
                .iter()
                .filter(|record| outlier::is_outlier(record, &bounds))
                .collect();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&bounds)?);
                return Ok(());
            }

            println!(
                "Resolution time bounds: {:.2}h to {:.2}h (mean {:.2}, sigma {:.2})",
                bounds.resolution_time.lower,
                bounds.resolution_time.upper,
                bounds.resolution_time.mean,
                bounds.resolution_time.std_dev
            );
            println!(
                "Severity upper bound: {:.2} (mean {:.2}, sigma {:.2}); static critical threshold {}",
                bounds.severity.upper,
                bounds.severity.mean,
                bounds.severity.std_dev,
                outlier::CRITICAL_SEVERITY
            );

            if flagged.is_empty() {
                println!("No outliers at {threshold:.1} sigma.");
                return Ok(());
            }
            println!("{} of {} records flagged:", flagged.len(), store.len());
            for record in flagged {
                println!(
                    "- #{} {} at {} ({}): severity {}, {:.2}h [{}]",
                    record.id,
                    record.defect_name,
                    record.station,
                    record.date,
                    record.severity_rating,
                    record.resolution_time,
                    outlier::outlier_reasons(record, &bounds).join(", ")
                );
            }
        }
        Commands::Heatmap { top } => {
            if store.is_empty() {
                println!("No records to map.");
                return Ok(());
            }
            let view = heatmap::heatmap(store.records(), top);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }
            println!(
                "Top {} defects across {} stations (hottest cell: {}):",
                view.defects.len(),
                view.stations.len(),
                view.max
            );
            for chunk in view.cells.chunks(view.shifts.len().max(1)) {
                let cells: Vec<String> = chunk
                    .iter()
                    .map(|cell| {
                        format!(
                            "{} {} ({})",
                            cell.shift,
                            cell.count,
                            heatmap::heat_band(cell.count, view.max).as_str()
                        )
                    })
                    .collect();
                println!("- {} at {}: {}", chunk[0].defect, chunk[0].station, cells.join(", "));
            }
        }
        Commands::Triads { by, limit } => {
            let views = recurrence::triads(store.records());
            let ranked = match by.as_str() {
                "count" => views.by_count,
                "score" => views.by_score,
                other => anyhow::bail!("unknown ranking '{other}' (expected count or score)"),
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
                return Ok(());
            }
            for triad in ranked.iter().take(limit) {
                println!(
                    "- {} at {} on {}: {} occurrences, avg severity {:.2}, avg resolution {:.2}h, {} open root causes (impact {:.2})",
                    triad.defect_name,
                    triad.station,
                    triad.part_of_car,
                    triad.count,
                    triad.avg_severity,
                    triad.avg_resolution_time,
                    triad.root_cause_open,
                    triad.score
                );
            }
        }
        Commands::Explore { defect } => {
            let result = explore::explore(store.records(), defect.as_deref());
            let Some(result) = result else {
                println!("No records to explore.");
                return Ok(());
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            println!("{} ({} records)", result.target, result.total);
            println!("Top stations:");
            for stat in &result.top_stations {
                println!(
                    "- {}: {} defects, avg severity {:.2}, avg resolution {:.2}h",
                    stat.key, stat.count, stat.avg_severity, stat.avg_resolution_time
                );
            }
            println!("Top parts:");
            for stat in &result.top_parts {
                println!(
                    "- {}: {} defects, avg severity {:.2}, avg resolution {:.2}h",
                    stat.key, stat.count, stat.avg_severity, stat.avg_resolution_time
                );
            }
            println!("Shifts:");
            for stat in &result.shift_stats {
                println!(
                    "- {}: {} defects, avg severity {:.2}, avg resolution {:.2}h",
                    stat.shift, stat.count, stat.avg_severity, stat.avg_resolution_time
                );
            }
            println!("Largest shift swings:");
            for delta in &result.shift_deltas {
                println!("- {} to {}: {:+}", delta.from, delta.to, delta.delta);
            }
            println!("Sample records:");
            for record in &result.samples {
                println!(
                    "- #{} {} {} at {} ({} shift), severity {}",
                    record.id,
                    record.date,
                    record.defect_name,
                    record.station,
                    record.production_shift,
                    record.severity_rating
                );
            }
        }
        Commands::Actions { defect } => {
            let Some(target) = explore::resolve_target(store.records(), defect.as_deref()) else {
                println!("No records to recommend on.");
                return Ok(());
            };
            let candidates = actions::quick_actions(store.records(), &target);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
                return Ok(());
            }
            if candidates.is_empty() {
                println!("No occurrences of {target}.");
                return Ok(());
            }
            println!("Containment candidates for {target}:");
            for candidate in candidates {
                println!(
                    "- {}: {} occurrences, avg severity {:.2}, avg resolution {:.2}h (impact {:.2}) -> filter \"{}\"",
                    candidate.label,
                    candidate.count,
                    candidate.avg_severity,
                    candidate.avg_resolution_time,
                    candidate.score,
                    candidate.search_filter
                );
            }
        }
        Commands::Table {
            search,
            outliers_only,
            sort,
            desc,
            threshold,
        } => {
            let threshold = outlier::validate_threshold(threshold)?;
            let bounds = outlier::compute_bounds(store.records(), threshold);
            let mut sort_state = SortState::default();
            if let Some(key) = sort {
                let key: SortKey = key.parse().map_err(anyhow::Error::msg)?;
                sort_state.toggle(key);
                if desc {
                    sort_state.toggle(key);
                }
            }
            let rows = filter::filter_sort(store.records(), &search, outliers_only, &bounds, &sort_state);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            for record in rows.iter().take(TABLE_DISPLAY_CAP) {
                println!(
                    "- #{} {} {} | {} | {} at {} ({} shift) | severity {} | {:.2}h | root cause {} | {}{}",
                    record.id,
                    record.date,
                    record.time.format("%H:%M"),
                    record.defect_name,
                    record.part_of_car,
                    record.station,
                    record.production_shift,
                    record.severity_rating,
                    record.resolution_time,
                    record.root_cause_label(),
                    if record.flagged { "flagged" } else { "open" },
                    if record.note.is_empty() {
                        String::new()
                    } else {
                        format!(" | {}", record.note)
                    }
                );
            }
            if rows.len() > TABLE_DISPLAY_CAP {
                println!("... and {} more rows", rows.len() - TABLE_DISPLAY_CAP);
            }
        }
        Commands::Flag { id, clear, note, out } => {
            let record = store.set_flag(id, !clear)?.clone();
            if let Some(text) = note {
                store.set_note(id, &text)?;
            }
            let record = store
                .records()
                .iter()
                .find(|r| r.id == record.id)
                .cloned()
                .unwrap_or(record);
            println!(
                "#{} {} is now {}{}",
                record.id,
                record.defect_name,
                if record.flagged { "flagged (Under Review)" } else { "unflagged" },
                if record.note.is_empty() {
                    String::new()
                } else {
                    format!(", note: {}", record.note)
                }
            );
            if let Some(path) = out {
                dataset::write_csv(&path, store.records())?;
                println!("Records written to {}.", path.display());
            }
        }
        Commands::Export { out } => {
            dataset::write_csv(&out, store.records())?;
            println!("Wrote {} records to {}.", store.len(), out.display());
        }
        Commands::Report { out, threshold } => {
            let threshold = outlier::validate_threshold(threshold)?;
            let report = report::build_report(store.records(), threshold);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Analyze { threshold } => {
            let threshold = outlier::validate_threshold(threshold)?;
            let bounds = outlier::compute_bounds(store.records(), threshold);
            let noteworthy: Vec<&DefectRecord> = store
                .records()
                .iter()
                .filter(|record| record.flagged || outlier::is_outlier(record, &bounds))
                .collect();
            if noteworthy.is_empty() {
                println!("Nothing flagged for analysis at {threshold:.1} sigma.");
                return Ok(());
            }
            let client = ai::AnalysisClient::from_env()?;
            let summary = client.summarize(&noteworthy, &bounds).await?;
            println!("{summary}");
        }
    }

    Ok(())
}
