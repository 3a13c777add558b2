// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::exercise::Exercise;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Track Options:
    --poses, -p <POSES>    JSON-lines file of pose estimates, one frame per line
    --source, -s <SOURCE>  Frames to overlay (image, directory, or glob)
    --width/--height       Blank canvas size when no source is given [default: 640x480]
    --exercise, -e <EX>    Exercise to count (none, push-up, pull-up, squat)
    --select <JOINT>       Joint to trace while recording, repeatable
    --record               Start recording immediately
    --save                 Save composited frames to runs/track
    --show                 Display frames in an interactive window
    --font <FONT>          TrueType font for the rep counter overlay
    --verbose              Show verbose output

Examples:
    form-tracker track --poses squats.jsonl --exercise squat --record
    form-tracker track -p pushups.jsonl -s frames/ -e push-up --select left_wrist --record --save
    form-tracker track -p session.jsonl -s "frames/*.jpg" --show --font DejaVuSans.ttf"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Overlay poses on frames, trace joints and count repetitions
    Track(TrackArgs),
}

/// Arguments for the track command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct TrackArgs {
    /// JSON-lines file of pose estimates
    #[arg(short, long)]
    pub poses: PathBuf,

    /// Frames to overlay (image, directory, or glob)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Canvas width when no source is given
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Canvas height when no source is given
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Exercise to count
    #[arg(short, long, default_value = "none")]
    pub exercise: Exercise,

    /// Joint to trace while recording (e.g. `left_wrist`), repeatable
    #[arg(long = "select", value_name = "JOINT")]
    pub select: Vec<String>,

    /// Start recording immediately
    #[arg(long, default_value_t = false)]
    pub record: bool,

    /// Save composited frames to runs/track
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Display frames in an interactive window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// TrueType font for the rep counter overlay
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Detection loop period in milliseconds
    #[arg(long, default_value_t = 100)]
    pub interval_ms: u64,

    /// Minimum confidence for keypoint markers
    #[arg(long, default_value_t = 0.3)]
    pub kpt_conf: f32,

    /// Minimum confidence for skeleton edges
    #[arg(long, default_value_t = 0.5)]
    pub skeleton_conf: f32,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_track_args_defaults() {
        let args = Cli::parse_from(["app", "track", "--poses", "poses.jsonl"]);
        match args.command {
            Commands::Track(track_args) => {
                assert_eq!(track_args.poses, PathBuf::from("poses.jsonl"));
                assert_eq!(track_args.exercise, Exercise::None);
                assert_eq!((track_args.width, track_args.height), (640, 480));
                assert_eq!(track_args.interval_ms, 100);
                assert!((track_args.kpt_conf - 0.3).abs() < f32::EPSILON);
                assert!((track_args.skeleton_conf - 0.5).abs() < f32::EPSILON);
                assert!(track_args.select.is_empty());
                assert!(!track_args.record);
                assert!(track_args.verbose);
                assert!(track_args.source.is_none());
            }
        }
    }

    #[test]
    fn test_track_args_custom() {
        let args = Cli::parse_from([
            "app",
            "track",
            "-p",
            "squats.jsonl",
            "--source",
            "frames/",
            "--exercise",
            "squat",
            "--select",
            "left_knee",
            "--select",
            "right_knee",
            "--record",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Track(track_args) => {
                assert_eq!(track_args.source, Some("frames/".to_string()));
                assert_eq!(track_args.exercise, Exercise::Squat);
                assert_eq!(track_args.select, vec!["left_knee", "right_knee"]);
                assert!(track_args.record);
                assert!(!track_args.verbose);
            }
        }
    }

    #[test]
    fn test_invalid_exercise_is_rejected() {
        let result = Cli::try_parse_from(["app", "track", "-p", "x.jsonl", "-e", "burpee"]);
        assert!(result.is_err());
    }
}
