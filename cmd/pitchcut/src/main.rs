//! Pitchcut CLI - soccer match video analysis and highlight ranking.
//!
//! Commands:
//! - `pitchcut detect` - Run windowed event detection over a match video
//! - `pitchcut dedup` - Collapse duplicate detections across windows
//! - `pitchcut outcomes` - Classify set-piece outcomes
//! - `pitchcut rank` - Rank candidate clips by importance
//! - `pitchcut merge` - Merge two half analyses into one match
//! - `pitchcut persist` - Preview the document-store write plan

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pitchcut")]
#[command(about = "Soccer match video analysis and highlight ranking pipeline")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run windowed event detection against the analyzer
    Detect {
        /// Path to the segments JSON file
        #[arg(short, long, default_value = "segments.json")]
        segments: String,

        /// Analyzer file-store URI of the cached video upload
        #[arg(long)]
        video_uri: String,

        /// Match identifier
        #[arg(short, long)]
        match_id: String,

        /// Output path for the detection summary
        #[arg(short, long, default_value = "detection.json")]
        output: String,

        /// Overall deadline for the run, in seconds
        #[arg(long)]
        deadline_sec: Option<u64>,
    },

    /// Deduplicate raw events from a detection summary
    Dedup {
        /// Path to the detection summary or raw-events JSON
        #[arg(short, long, default_value = "detection.json")]
        input: String,

        /// Output path for the deduplicated events
        #[arg(short, long, default_value = "events.json")]
        output: String,

        /// Seconds within which same-kind events merge
        #[arg(long, default_value_t = 2.0)]
        time_threshold: f64,
    },

    /// Classify the outcome of each set piece on a timeline
    Outcomes {
        /// Path to the timeline events JSON
        #[arg(short, long, default_value = "timeline.json")]
        events: String,

        /// Look-ahead window in seconds
        #[arg(long, default_value_t = 10.0)]
        window_sec: f64,
    },

    /// Rank candidate clips by importance
    Rank {
        /// Path to the clips JSON
        #[arg(short, long, default_value = "clips.json")]
        clips: String,

        /// Path to the timeline events JSON
        #[arg(short, long, default_value = "timeline.json")]
        events: String,

        /// Current match minute (enables context boosts)
        #[arg(long)]
        minute: Option<f64>,

        /// Total match minutes
        #[arg(long, default_value_t = 90.0)]
        total_minutes: f64,

        /// Goal difference for the team of interest
        #[arg(long, default_value_t = 0)]
        score_diff: i32,

        /// Matching tolerance in seconds
        #[arg(long, default_value_t = 2.0)]
        tolerance: f64,

        /// Keep only the N most important clips
        #[arg(long)]
        top: Option<usize>,

        /// Keep only clips at or above this importance
        #[arg(long)]
        threshold: Option<f64>,

        /// Output format (json or csv)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output path for the ranked report
        #[arg(short, long, default_value = "ranked.json")]
        output: String,
    },

    /// Merge first- and second-half analyses into one match
    Merge {
        /// Path to the first-half analysis JSON
        #[arg(long)]
        first: String,

        /// Path to the second-half analysis JSON
        #[arg(long)]
        second: String,

        /// First-half video length in seconds
        #[arg(long)]
        half_duration: f64,

        /// Output path for the merged analysis
        #[arg(short, long, default_value = "match.json")]
        output: String,
    },

    /// Preview the document-store write plan for analysis outputs
    Persist {
        /// Path to the deduplicated events JSON
        #[arg(short, long, default_value = "events.json")]
        events: String,

        /// Match identifier
        #[arg(short, long)]
        match_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Detect {
            segments,
            video_uri,
            match_id,
            output,
            deadline_sec,
        } => commands::detect::run(&segments, &video_uri, &match_id, &output, deadline_sec).await,
        Commands::Dedup {
            input,
            output,
            time_threshold,
        } => commands::dedup::run(&input, &output, time_threshold),
        Commands::Outcomes { events, window_sec } => commands::outcomes::run(&events, window_sec),
        Commands::Rank {
            clips,
            events,
            minute,
            total_minutes,
            score_diff,
            tolerance,
            top,
            threshold,
            format,
            output,
        } => commands::rank::run(&commands::rank::RankArgs {
            clips_path: clips,
            events_path: events,
            minute,
            total_minutes,
            score_diff,
            tolerance,
            top,
            threshold,
            format,
            output,
        }),
        Commands::Merge {
            first,
            second,
            half_duration,
            output,
        } => commands::merge::run(&first, &second, half_duration, &output),
        Commands::Persist { events, match_id } => {
            commands::persist::run(&events, &match_id).await
        }
    }
}
