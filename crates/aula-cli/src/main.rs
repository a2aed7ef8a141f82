use std::sync::Arc;

use aula_auth::TokenValidator;
use aula_cli::directors::create_director;
use aula_cli::seeder::{self, SeedConfig};
use aula_config::{JwtConfig, StoreConfig};
use aula_core::TenantDirectory;
use aula_models::users::CreateDirectorDto;
use aula_store::{RestStore, Store};
use clap::{Parser, Subcommand};
use dialoguer::Input;
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "aula-cli")]
#[command(about = "Aula CLI - Development and administration tools for Aula", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a development token for an email address
    Token {
        /// Email placed in the token's `email` claim
        #[arg(short = 'e', long)]
        email: String,

        /// Optional subject (`sub`) claim
        #[arg(short = 's', long)]
        subject: Option<String>,

        /// Lifetime in seconds (defaults to JWT_ISSUED_TOKEN_EXPIRY)
        #[arg(long)]
        expires_in: Option<i64>,
    },
    /// Show the tenant an email address resolves to
    Resolve {
        /// Email address to resolve
        email: String,
    },
    /// Create the first director of an institution
    CreateDirector {
        /// First name
        #[arg(short = 'n', long)]
        nombre: Option<String>,

        /// Last name
        #[arg(short = 'a', long)]
        apellido: Option<String>,

        /// Institutional email address
        #[arg(short = 'e', long)]
        email: Option<String>,
    },
    /// Seed a tenant with fake teachers, students, courses and enrollments
    Seed {
        /// Institutional domain, e.g. ucb.edu.bo
        #[arg(short = 'd', long)]
        domain: String,

        /// Number of students
        #[arg(long, default_value = "30")]
        students: usize,

        /// Number of teachers
        #[arg(long, default_value = "5")]
        teachers: usize,

        /// Number of courses
        #[arg(long, default_value = "6")]
        courses: usize,

        /// Courses each student is enrolled in
        #[arg(long, default_value = "2")]
        enrollments: usize,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let tenants = TenantDirectory::default();

    match cli.command {
        Commands::Token {
            email,
            subject,
            expires_in,
        } => handle_token(&email, subject.as_deref(), expires_in),
        Commands::Resolve { email } => handle_resolve(&tenants, &email),
        Commands::CreateDirector {
            nombre,
            apellido,
            email,
        } => handle_create_director(&tenants, nombre, apellido, email).await,
        Commands::Seed {
            domain,
            students,
            teachers,
            courses,
            enrollments,
        } => {
            let config = SeedConfig::new(domain)
                .with_students(students)
                .with_teachers(teachers)
                .with_courses(courses)
                .with_enrollments_per_student(enrollments);
            handle_seed(&tenants, config).await
        }
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {context}: {err}");
    std::process::exit(1);
}

fn connect() -> Arc<dyn Store> {
    let config = StoreConfig::from_env().unwrap_or_else(|e| fail("Invalid store configuration", e));
    let store = RestStore::new(&config).unwrap_or_else(|e| fail("Error building store client", e));
    Arc::new(store)
}

fn prompt(label: &str) -> String {
    Input::new()
        .with_prompt(label)
        .interact_text()
        .unwrap_or_else(|e| fail("Error reading input", e))
}

fn handle_token(email: &str, subject: Option<&str>, expires_in: Option<i64>) {
    let config = JwtConfig::from_env().unwrap_or_else(|e| fail("Invalid JWT configuration", e));
    let validator = TokenValidator::new(&config);
    let token = match expires_in {
        Some(seconds) => validator.issue_token_expiring_in(email, subject, seconds),
        None => validator.issue_token(email, subject),
    };
    match token {
        Ok(token) => println!("{token}"),
        Err(e) => fail("Error issuing token", e),
    }
}

fn handle_resolve(tenants: &TenantDirectory, email: &str) {
    match tenants.domain_from_email(email) {
        Some(domain) => {
            println!("✅ {email}");
            println!("   Domain: {domain}");
            println!("   Schema: {}", tenants.schema_for(domain.as_str()));
            println!("   Institution: {}", tenants.institution_name(&domain));
        }
        None => {
            eprintln!("❌ {email} does not belong to a known institution");
            std::process::exit(1);
        }
    }
}

async fn handle_create_director(
    tenants: &TenantDirectory,
    nombre: Option<String>,
    apellido: Option<String>,
    email: Option<String>,
) {
    let dto = CreateDirectorDto {
        nombre: nombre.unwrap_or_else(|| prompt("First name")),
        apellido: apellido.unwrap_or_else(|| prompt("Last name")),
        email: email.unwrap_or_else(|| prompt("Email address")),
    };

    match create_director(connect(), tenants, dto).await {
        Ok(director) => {
            println!("\n✅ Director created successfully!");
            println!("   Id: {}", director.id);
            println!("   Email: {}", director.email);
            println!("   Name: {}", director.full_name());
        }
        Err(e) => fail("Error creating director", e),
    }
}

async fn handle_seed(tenants: &TenantDirectory, config: SeedConfig) {
    let store = connect();
    if let Err(e) = seeder::seed_tenant(store.as_ref(), tenants, config).await {
        fail("Error seeding tenant", e);
    }
}
