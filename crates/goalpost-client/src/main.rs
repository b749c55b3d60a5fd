//! `goalpost`: command-line client for the goalpost server.
//!
//! # Usage
//!
//! ```text
//! goalpost --url http://localhost:8080 --user alice --password secret list
//! goalpost --config ~/.config/goalpost/config.toml show <id>
//! ```

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
  process::ExitCode,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use goalpost_client::{ApiClient, ApiConfig, ClientError};
use goalpost_core::{
  goal::{Goal, GoalDraft, GoalPatch, GoalType, parse_deadline},
  lifecycle::GoalStatus,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "goalpost", about = "Track personal goals on a goalpost server")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the goalpost server (default: http://localhost:8080).
  #[arg(long, env = "GOALPOST_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "GOALPOST_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "GOALPOST_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List your goals.
  List,
  /// Show one goal in full.
  Show { id: Uuid },
  /// Create a goal.
  Create {
    #[arg(long)]
    title:         String,
    #[arg(long)]
    description:   String,
    /// time, count or simple.
    #[arg(long = "type")]
    goal_type:     GoalType,
    /// Target value, e.g. "50 hours".
    #[arg(long)]
    value:         String,
    #[arg(long)]
    current_value: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD.
    #[arg(long, value_parser = deadline_arg)]
    deadline:      DateTime<Utc>,
  },
  /// Change some fields of a goal.
  Update {
    id:                  Uuid,
    #[arg(long)]
    title:               Option<String>,
    #[arg(long)]
    description:         Option<String>,
    #[arg(long = "type")]
    goal_type:           Option<GoalType>,
    #[arg(long)]
    value:               Option<String>,
    #[arg(long, conflicts_with = "clear_current_value")]
    current_value:       Option<String>,
    /// Remove the recorded progress value.
    #[arg(long)]
    clear_current_value: bool,
    #[arg(long, value_parser = deadline_arg)]
    deadline:            Option<DateTime<Utc>>,
    /// active, completed or expired.
    #[arg(long)]
    status:              Option<GoalStatus>,
  },
  /// Delete a goal.
  Delete {
    id:  Uuid,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
  },
  /// Show the account you are signed in as.
  Whoami,
}

fn deadline_arg(raw: &str) -> Result<DateTime<Utc>, String> {
  parse_deadline(raw)
    .ok_or_else(|| format!("{raw:?} is not an RFC 3339 timestamp or YYYY-MM-DD"))
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

fn non_empty(s: &str) -> Option<String> {
  (!s.is_empty()).then(|| s.to_owned())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  match run(args).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::debug!(error = ?e, "command failed");
      eprintln!("goalpost: {}", notice(&e));
      ExitCode::FAILURE
    }
  }
}

/// The message shown to the user for a failed command.
fn notice(err: &anyhow::Error) -> String {
  match err.downcast_ref::<ClientError>() {
    Some(ClientError::Unauthorized) => {
      "not authorised; check your username and password".to_owned()
    }
    Some(ClientError::NotFound) => "goal not found".to_owned(),
    Some(ClientError::InvalidInput(msg)) => msg.clone(),
    Some(ClientError::Internal(_)) => {
      "the server could not complete the request; try again later".to_owned()
    }
    Some(ClientError::Transport(_)) => {
      "could not reach the server; try again later".to_owned()
    }
    None => format!("{err:#}"),
  }
}

async fn run(args: Args) -> Result<()> {
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // Flags and environment override the config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| non_empty(&file_cfg.url))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    username: args
      .user
      .or_else(|| non_empty(&file_cfg.username))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| non_empty(&file_cfg.password))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;
  // Goals are filed under the identity id, not the login name.
  let me = client.current_user().await?;
  let owner = me.id.as_str();

  match args.command {
    Command::Whoami => {
      println!("{} <{}>", me.name, me.email);
      println!("id:     {}", me.id);
      println!("joined: {}", me.created_at.format("%Y-%m-%d"));
    }
    Command::List => {
      let goals = client.list_goals(owner).await?;
      if goals.is_empty() {
        println!("No goals yet.");
      }
      for goal in &goals {
        print_summary(goal);
      }
    }
    Command::Show { id } => {
      let goal = client.get_goal(owner, id).await?;
      print_detail(&goal);
    }
    Command::Create {
      title,
      description,
      goal_type,
      value,
      current_value,
      deadline,
    } => {
      let draft = GoalDraft {
        title: Some(title),
        description: Some(description),
        goal_type: Some(goal_type),
        value: Some(value),
        current_value,
        deadline: Some(deadline),
      };
      let goal = client.create_goal(owner, &draft).await?;
      println!("Created goal {}", goal.id);
    }
    Command::Update {
      id,
      title,
      description,
      goal_type,
      value,
      current_value,
      clear_current_value,
      deadline,
      status,
    } => {
      let patch = GoalPatch {
        title,
        description,
        goal_type,
        value,
        current_value: if clear_current_value {
          Some(None)
        } else {
          current_value.map(Some)
        },
        deadline,
        status,
      };
      if patch.is_empty() {
        anyhow::bail!("nothing to update; pass at least one field");
      }
      let goal = client.update_goal(owner, id, &patch).await?;
      print_detail(&goal);
    }
    Command::Delete { id, yes } => {
      if !yes && !confirm(&format!("Delete goal {id}?"))? {
        println!("Aborted.");
        return Ok(());
      }
      client.delete_goal(owner, id).await?;
      println!("Goal deleted.");
    }
  }

  Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_summary(goal: &Goal) {
  println!(
    "{}  {:<9}  {}  {}",
    goal.id,
    goal.status,
    goal.deadline.format("%Y-%m-%d"),
    goal.title
  );
}

fn print_detail(goal: &Goal) {
  println!("{}", goal.title);
  println!("  id:          {}", goal.id);
  println!("  status:      {}", goal.status);
  println!("  type:        {}", goal.goal_type.as_str());
  match &goal.current_value {
    Some(current) => println!("  progress:    {current} / {}", goal.value),
    None => println!("  target:      {}", goal.value),
  }
  println!("  deadline:    {}", goal.deadline.to_rfc3339());
  if let Some(created_at) = goal.created_at {
    println!("  created:     {}", created_at.to_rfc3339());
  }
  println!("  {}", goal.description);
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` is a no.
fn confirm(question: &str) -> Result<bool> {
  print!("{question} [y/N] ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("reading confirmation")?;
  Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
