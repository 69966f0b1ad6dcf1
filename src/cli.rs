// Command line surface. Parses arguments, resolves the server settings
// and hands off to the generators and the applier.

use crate::api::ApiClient;
use crate::applier::{self, Applier};
use crate::config::Config;
use crate::generators::{AddPerson, AddUser, ClearShared, Generator, Replace, Smart};
use crate::plan::{Direction, Plan};
use crate::ui;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Reversible change plans for Immich albums
#[derive(Parser, Debug)]
#[command(name = "immich-planner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Immich server base URL
    #[arg(long, global = true, env = "IMMICH_SERVER")]
    pub server: Option<String>,

    /// Immich API key
    #[arg(long, global = true, env = "IMMICH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate plans for Immich operations
    Plan {
        #[command(subcommand)]
        target: PlanTarget,
    },

    /// Apply a plan (use '-' or omit the file to read from stdin)
    Apply(RunArgs),

    /// Revert the changes of a plan (use '-' or omit the file to read from stdin)
    Revert(RunArgs),
}

#[derive(Subcommand, Debug)]
pub enum PlanTarget {
    /// Manage Immich albums
    #[command(subcommand)]
    Albums(AlbumPlan),
}

#[derive(Subcommand, Debug)]
pub enum AlbumPlan {
    /// Generate a plan to replace text in album names
    Replace {
        before: String,
        after: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a plan to add a user to albums matching a search term
    AddUser {
        search_term: String,
        email: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a plan to add a user to albums containing assets of a specific person
    AddPerson {
        person_id: String,
        email: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a plan to remove a user from all shared albums
    ClearShared {
        email: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a plan to sync the "All <name>" album with all albums shared with a user
    Smart {
        email: String,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Write the plan to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Plan file to read; '-' or omitted reads stdin
    pub plan: Option<PathBuf>,

    /// Print operations that would be performed without executing them
    #[arg(long)]
    pub dry_run: bool,
}

impl AlbumPlan {
    fn output(&self) -> &OutputArgs {
        match self {
            AlbumPlan::Replace { output, .. }
            | AlbumPlan::AddUser { output, .. }
            | AlbumPlan::AddPerson { output, .. }
            | AlbumPlan::ClearShared { output, .. }
            | AlbumPlan::Smart { output, .. } => output,
        }
    }
}

impl Cli {
    fn config(&self) -> Result<Config> {
        Ok(Config::new(self.server.clone(), self.token.clone())?)
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Plan {
            target: PlanTarget::Albums(album_plan),
        } => generate(&cli, album_plan),
        Commands::Apply(args) => execute(&cli, args, Direction::Apply),
        Commands::Revert(args) => execute(&cli, args, Direction::Revert),
    }
}

fn generate(cli: &Cli, album_plan: &AlbumPlan) -> Result<()> {
    let client = ApiClient::new(&cli.config()?)?;

    let spinner = ui::spinner("Reading server state...");
    let plan = match album_plan {
        AlbumPlan::Replace { before, after, .. } => Replace::new(&client, before, after).generate(),
        AlbumPlan::AddUser { search_term, email, .. } => AddUser::new(&client, search_term, email).generate(),
        AlbumPlan::AddPerson { person_id, email, .. } => AddPerson::new(&client, person_id, email).generate(),
        AlbumPlan::ClearShared { email, .. } => ClearShared::new(&client, email).generate(),
        AlbumPlan::Smart { email, .. } => Smart::new(&client, email).generate(),
    };
    spinner.finish_and_clear();

    let plan = plan.context("generating plan")?;
    ui::emit_plan(&plan, album_plan.output().output.as_deref())
}

fn read_plan(source: Option<&Path>) -> Result<Plan> {
    match source {
        None => Plan::from_reader(std::io::stdin().lock()).context("loading plan from stdin"),
        Some(path) if path == Path::new("-") => {
            Plan::from_reader(std::io::stdin().lock()).context("loading plan from stdin")
        }
        Some(path) => Plan::load(path).context("loading plan"),
    }
}

fn execute(cli: &Cli, args: &RunArgs, direction: Direction) -> Result<()> {
    let plan = read_plan(args.plan.as_deref())?;

    if args.dry_run {
        return applier::preview(&plan, direction, &mut std::io::stdout().lock());
    }

    let client = ApiClient::new(&cli.config()?)?;
    match direction {
        Direction::Apply => {
            let applier = Applier::new(&client).with_progress(ui::request_bar("Applying"));
            applier.apply(&plan).context("applying plan")?;
            eprintln!("Successfully applied plan with {} operations", plan.len());
        }
        Direction::Revert => {
            let applier = Applier::new(&client).with_progress(ui::request_bar("Reverting"));
            applier.revert(&plan).context("reverting plan")?;
            eprintln!("Successfully reverted plan with {} operations", plan.len());
        }
    }
    Ok(())
}
