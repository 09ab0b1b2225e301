use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use schoolhub::cli::create_admin;
use schoolhub::cli::seeder::{SEED_PASSWORD, SeedConfig, seed_database};
use schoolhub_config::DatabaseConfig;
use schoolhub_db::{init_db_pool, run_migrations};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "schoolhub-cli")]
#[command(about = "SchoolHub CLI - Administrative tools for SchoolHub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Prompted securely if not provided
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake teachers, classes, students and parents
    Seed {
        #[arg(long, default_value = "5")]
        teachers: usize,

        #[arg(long, default_value = "3")]
        classes: usize,

        #[arg(long, default_value = "10")]
        students_per_class: usize,

        #[arg(long, default_value = "10")]
        parents: usize,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;

    match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin(&pool, first_name, last_name, email, password).await,
        Commands::Seed {
            teachers,
            classes,
            students_per_class,
            parents,
        } => {
            let config = SeedConfig {
                teachers,
                classes,
                students_per_class,
                parents,
            };
            handle_seed(&pool, config).await
        }
        Commands::Migrate => {
            run_migrations(&pool).await?;
            println!("✅ Migrations applied");
            Ok(())
        }
    }
}

fn prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::new()
            .with_prompt(label)
            .interact_text()
            .with_context(|| format!("Failed to read {}", label.to_lowercase())),
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let first_name = prompt(first_name, "First name")?;
    let last_name = prompt(last_name, "Last name")?;
    let email = prompt(email, "Email address")?;
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    match create_admin(pool, &first_name, &last_name, &email, &password).await {
        Ok(admin) => {
            println!("\n✅ Admin created successfully!");
            println!("   Email: {}", admin.account.email);
            println!("   Name: {} {}", first_name, last_name);
            Ok(())
        }
        Err(e) => anyhow::bail!("Error creating admin: {}", e),
    }
}

async fn handle_seed(pool: &PgPool, config: SeedConfig) -> anyhow::Result<()> {
    println!("🌱 Seeding database...");

    let summary = seed_database(pool, config)
        .await
        .map_err(|e| anyhow::anyhow!("Error seeding database: {}", e))?;

    println!(
        "✅ Seeded {} teachers, {} classes, {} students and {} parents",
        summary.teachers, summary.classes, summary.students, summary.parents
    );
    println!("   Every seeded account uses the password '{}'", SEED_PASSWORD);
    Ok(())
}
