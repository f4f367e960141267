//! CLI definitions for TaskHub.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use taskhub_protocols::{ProgressStatus, TaskPriority};

/// TaskHub CLI.
#[derive(Parser)]
#[command(name = "taskhub")]
#[command(about = "Task-driven server and channel orchestration")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.taskhub/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep the session in memory instead of on disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the coordinator in foreground until Ctrl-C (default)
    Run,

    /// Create a task server
    Create {
        /// Task ID
        task_id: String,

        /// Task title
        title: String,

        /// Task type, used to pick the topology template
        #[arg(short = 't', long, default_value = "general")]
        task_type: String,

        /// Task phase
        #[arg(long)]
        phase: Option<String>,

        /// Task priority (low, medium, high, critical)
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,

        /// Expected agent as ROLE:NAME (repeatable)
        #[arg(short, long = "agent", value_name = "ROLE:NAME")]
        agents: Vec<String>,

        /// Append a "Task Progress" channel
        #[arg(long)]
        progress_channel: bool,

        /// Append a "Planning & Architecture" channel
        #[arg(long)]
        planning_channel: bool,

        /// Archive the server when the task completes
        #[arg(long)]
        auto_archive: bool,

        /// Explicit template ID
        #[arg(long)]
        template: Option<String>,
    },

    /// Add an agent channel to a task server
    AddAgent {
        /// Task ID
        task_id: String,

        /// Agent as ROLE:NAME
        #[arg(value_name = "ROLE:NAME")]
        agent: String,
    },

    /// Report task progress
    Progress {
        /// Task ID
        task_id: String,

        /// started, in_progress, blocked, completed or failed
        status: ProgressStatus,

        /// Current phase
        #[arg(long)]
        phase: Option<String>,

        /// Percent complete (0-100)
        #[arg(long)]
        percent: Option<u8>,

        /// Free-form message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Archive a task server
    Archive {
        /// Task ID
        task_id: String,
    },

    /// Show session status
    Status {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Export a session summary as JSON
    Export {
        /// Output file
        path: PathBuf,
    },

    /// Clear the stored session
    Clear,

    /// List topology templates
    Templates,
}
