//! `staffing` command-line boundary.
//!
//! # Responsibility
//! - Resolve configuration from `STAFFING_*` variables and flags.
//! - Call one engine operation per invocation and print its envelope.
//!
//! # Invariants
//! - Exit code is 0 only when the envelope reports `ok`.
//! - Engine errors are reported, never retried.

mod api;

use api::CommandResponse;
use clap::{Parser, Subcommand};
use log::error;
use staffing_core::db::open_db;
use staffing_core::{
    init_logging, AllocationLedger, AllocationService, DirectoryRepository, EmptyRequirements,
    EngineConfig, NewPerson, NewProject, ProjectStatus, RepoResult, SqliteAllocationLedger,
    SqliteDirectoryRepository,
};
use std::path::PathBuf;

type Service<'conn> =
    AllocationService<SqliteDirectoryRepository<'conn>, SqliteAllocationLedger<'conn>>;

/// Match people to projects and track committed capacity.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file (default: staffing.sqlite3 in the temp dir)
    #[arg(long, env = "STAFFING_DB_PATH", value_name = "FILE", global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling logs; logging is off when unset
    #[arg(long, env = "STAFFING_LOG_DIR", value_name = "DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (default depends on build mode)
    #[arg(long, env = "STAFFING_LOG_LEVEL", value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Skill points for projects without required skills: full|none
    #[arg(
        long,
        env = "STAFFING_EMPTY_REQUIREMENTS",
        value_name = "POLICY",
        value_parser = parse_empty_requirements,
        global = true
    )]
    empty_requirements: Option<EmptyRequirements>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register and inspect people
    #[command(subcommand)]
    Person(PersonCommand),

    /// Register and inspect projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Rank every person for a project
    Suggest {
        project_id: i64,
        /// Print only the first N candidates
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Commit part of a person's capacity to a project
    Allocate {
        person_id: i64,
        project_id: i64,
        #[arg(allow_negative_numbers = true)]
        effort_percentage: i64,
    },

    /// Remove an allocation and free its effort
    Release { allocation_id: i64 },

    /// Show a person's remaining availability and allocations
    Availability { person_id: i64 },

    /// Show people, project and allocation counters
    Summary,
}

#[derive(Subcommand)]
enum PersonCommand {
    /// Register a person
    Add {
        name: String,
        role: String,
        /// Base capacity percentage (default 100)
        #[arg(long)]
        capacity: Option<i64>,
    },
    /// List people with their skills
    List,
    /// Attach a skill to a person (idempotent)
    Skill { person_id: i64, skill_name: String },
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Register a project
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List projects with their required skills
    List,
    /// Attach a required skill to a project (idempotent)
    Skill { project_id: i64, skill_name: String },
    /// Change a project's status (active|completed|on_hold)
    Status {
        project_id: i64,
        #[arg(value_parser = parse_status)]
        status: ProjectStatus,
    },
}

impl Cli {
    /// Settings from flags or their `STAFFING_*` variables, defaults otherwise.
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        config.log_dir = self.log_dir.clone();
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(policy) = self.empty_requirements {
            config.scoring.empty_requirements = policy;
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();
    let response = run(cli);

    match serde_json::to_string_pretty(&response) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("failed to render response: {err}"),
    }
    std::process::exit(response.exit_code());
}

fn run(cli: Cli) -> CommandResponse {
    let config = cli.engine_config();

    if let Some(log_dir) = &config.log_dir {
        if let Err(message) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            return CommandResponse::failure("invalid_config", message);
        }
    }

    execute(&config, cli.command).unwrap_or_else(|err| {
        error!(
            "event=cli_command module=cli status=error error_code={}",
            err.code()
        );
        CommandResponse::from_repo_error(&err)
    })
}

fn execute(config: &EngineConfig, command: Command) -> RepoResult<CommandResponse> {
    let conn = open_db(&config.db_path)?;
    let service: Service<'_> = AllocationService::with_policy(
        SqliteDirectoryRepository::try_new(&conn)?,
        SqliteAllocationLedger::try_new(&conn)?,
        config.scoring,
    );

    match command {
        Command::Person(command) => person(&service, command),
        Command::Project(command) => project(&service, command),
        Command::Suggest { project_id, limit } => {
            let mut suggestions = service.suggest(project_id)?;
            if let Some(limit) = limit {
                suggestions.truncate(limit);
            }
            Ok(CommandResponse::success(
                format!("{} candidate(s) ranked", suggestions.len()),
                suggestions,
            ))
        }
        Command::Allocate {
            person_id,
            project_id,
            effort_percentage,
        } => {
            let allocation = service.allocate(person_id, project_id, effort_percentage)?;
            Ok(CommandResponse::success("allocation committed", allocation))
        }
        Command::Release { allocation_id } => {
            let allocation = service.release(allocation_id)?;
            Ok(CommandResponse::success("allocation released", allocation))
        }
        Command::Availability { person_id } => {
            let availability = service.availability_of(person_id)?;
            let allocations = service.ledger().allocations_for_person(person_id)?;
            Ok(CommandResponse::success(
                format!("{availability}% available"),
                serde_json::json!({
                    "person_id": person_id,
                    "availability": availability,
                    "allocations": allocations,
                }),
            ))
        }
        Command::Summary => {
            let summary = service.staffing_summary()?;
            Ok(CommandResponse::success("staffing summary", summary))
        }
    }
}

fn person(service: &Service<'_>, command: PersonCommand) -> RepoResult<CommandResponse> {
    let directory = service.directory();
    match command {
        PersonCommand::Add {
            name,
            role,
            capacity,
        } => {
            let request = match capacity {
                Some(capacity) => NewPerson::with_capacity(name, role, capacity),
                None => NewPerson::new(name, role),
            };
            let person = directory.create_person(&request)?;
            Ok(CommandResponse::success("person registered", person))
        }
        PersonCommand::List => {
            let people = directory.list_people()?;
            Ok(CommandResponse::success(
                format!("{} person(s)", people.len()),
                people,
            ))
        }
        PersonCommand::Skill {
            person_id,
            skill_name,
        } => {
            let person = directory.add_person_skill(person_id, &skill_name)?;
            Ok(CommandResponse::success("skill attached", person))
        }
    }
}

fn project(service: &Service<'_>, command: ProjectCommand) -> RepoResult<CommandResponse> {
    let directory = service.directory();
    match command {
        ProjectCommand::Add { name, description } => {
            let project = directory.create_project(&NewProject::new(name, description))?;
            Ok(CommandResponse::success("project registered", project))
        }
        ProjectCommand::List => {
            let projects = directory.list_projects()?;
            Ok(CommandResponse::success(
                format!("{} project(s)", projects.len()),
                projects,
            ))
        }
        ProjectCommand::Skill {
            project_id,
            skill_name,
        } => {
            let project = directory.add_project_skill(project_id, &skill_name)?;
            Ok(CommandResponse::success("required skill attached", project))
        }
        ProjectCommand::Status { project_id, status } => {
            let project = directory.set_project_status(project_id, status)?;
            Ok(CommandResponse::success("project status updated", project))
        }
    }
}

fn parse_empty_requirements(value: &str) -> Result<EmptyRequirements, String> {
    EmptyRequirements::parse(value)
        .ok_or_else(|| format!("unknown policy `{value}`; expected full|none"))
}

fn parse_status(value: &str) -> Result<ProjectStatus, String> {
    ProjectStatus::parse(value)
        .ok_or_else(|| format!("unknown status `{value}`; expected active|completed|on_hold"))
}
