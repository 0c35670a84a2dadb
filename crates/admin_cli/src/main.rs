use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{DepartmentInput, Engine, EngineError, IdentityInput, PhoneRegion, StatusInput};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "staffbook_admin")]
#[command(about = "Admin utilities for Staffbook (bootstrap users and lookup tables)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./staffbook.db?mode=rwc"
    )]
    database_url: String,

    /// Default region for phone numbers (also read from `PHONE_NUMBERS_REGION`).
    #[arg(long, env = "PHONE_NUMBERS_REGION", default_value = "US")]
    phone_region: String,

    /// Status code given to new profiles (also read from `DEFAULT_STATUS`).
    #[arg(long, env = "DEFAULT_STATUS")]
    default_status: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Status(Status),
    Department(Department),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    Delete(UserDeleteArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: Option<String>,
    /// Create the user as inactive.
    #[arg(long)]
    inactive: bool,
}

#[derive(Args, Debug)]
struct UserDeleteArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Status {
    #[command(subcommand)]
    command: StatusCommand,
}

#[derive(Subcommand, Debug)]
enum StatusCommand {
    Create(StatusCreateArgs),
    Show(StatusShowArgs),
    List,
}

#[derive(Args, Debug)]
struct StatusCreateArgs {
    /// Unique status code, e.g. ACTIVE.
    #[arg(long)]
    status: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct StatusShowArgs {
    /// Status code to look up, e.g. the one configured as `DEFAULT_STATUS`.
    #[arg(long)]
    code: String,
}

#[derive(Args, Debug)]
struct Department {
    #[command(subcommand)]
    command: DepartmentCommand,
}

#[derive(Subcommand, Debug)]
enum DepartmentCommand {
    Create(DepartmentCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct DepartmentCreateArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    block: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    group: Option<String>,
    #[arg(long)]
    branch: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Print field errors one per line and exit, pass anything else through.
fn exit_on_validation<T>(result: Result<T, EngineError>) -> Result<T, EngineError> {
    match result {
        Err(EngineError::Validation(fields)) => {
            for (field, messages) in fields.iter() {
                for message in messages {
                    eprintln!("{field}: {message}");
                }
            }
            std::process::exit(2);
        }
        other => other,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder()
        .database(db)
        .phone_region(cli.phone_region.parse::<PhoneRegion>()?)
        .default_status(cli.default_status.as_deref())
        .build()
        .await?;

    match cli.command {
        Command::User(User { command }) => match command {
            UserCommand::Create(args) => {
                let input = IdentityInput {
                    username: args.username,
                    email: args.email,
                    is_active: !args.inactive,
                };
                let user = exit_on_validation(engine.create_identity(&input).await)?;
                let profile = engine.profile_by_user(user.id).await?;
                println!("created user: {} ({}), profile {}", user.username, user.id, profile.id);
            }
            UserCommand::Delete(args) => {
                let user = match engine.identity_by_username(&args.username).await {
                    Ok(user) => user,
                    Err(EngineError::KeyNotFound(_)) => {
                        eprintln!("user not found: {}", args.username);
                        std::process::exit(1);
                    }
                    Err(err) => return Err(err.into()),
                };
                engine.delete_identity(user.id).await?;
                println!("deleted user: {}", user.username);
            }
            UserCommand::List => {
                for user in engine.list_identities(None).await? {
                    println!(
                        "{}\t{}\t{}",
                        user.id,
                        user.username,
                        user.email.as_deref().unwrap_or("-")
                    );
                }
            }
        },
        Command::Status(Status { command }) => match command {
            StatusCommand::Create(args) => {
                let input =
                    StatusInput::new(&args.status, &args.title, args.description.as_deref());
                let status = exit_on_validation(engine.create_status(&input).await)?;
                println!("created status: {} ({})", status.status, status.id);
            }
            StatusCommand::Show(args) => match engine.status_by_code(&args.code).await {
                Ok(status) => println!(
                    "{}\t{}\t{}\t{}",
                    status.id,
                    status.status,
                    status,
                    status.description.as_deref().unwrap_or("-")
                ),
                Err(EngineError::KeyNotFound(_)) => {
                    eprintln!("status not found: {}", args.code);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            },
            StatusCommand::List => {
                for status in engine.list_statuses(None).await? {
                    println!("{}\t{}\t{}", status.id, status.status, status);
                }
            }
        },
        Command::Department(Department { command }) => match command {
            DepartmentCommand::Create(args) => {
                let input = DepartmentInput {
                    title: args.title,
                    block: args.block,
                    department: args.department,
                    group: args.group,
                    branch: args.branch,
                    description: args.description,
                };
                let department = exit_on_validation(engine.create_department(&input).await)?;
                println!("created department: {} ({})", department, department.id);
            }
            DepartmentCommand::List => {
                for department in engine.list_departments(None).await? {
                    println!("{}\t{}", department.id, department);
                }
            }
        },
    }

    Ok(())
}
