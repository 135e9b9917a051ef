use std::sync::Arc;

use clap::{Parser, Subcommand};
use mw_core::{
    directory::fixtures, models::parse_search_date, AuthService, CoreConfig, Database,
    HisDirectoryClient, MiddlewareError, NewStaffInput, PatientRecord, PatientService,
    SearchCriteria,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mw")]
#[command(about = "Hospital middleware operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables if they do not exist
    Migrate,
    /// Register a staff account
    CreateStaff {
        employee_id: String,
        username: String,
        /// At least 6 characters
        password: String,
        first_name: String,
        last_name: String,
        email: String,
        role: String,
        hospital: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Search patients as a member of the given hospital
    Search {
        /// Caller's hospital; results are scoped to it
        #[arg(long)]
        hospital: String,
        /// National ID or passport ID
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        hn: Option<String>,
        #[arg(long)]
        national_id: Option<String>,
        #[arg(long)]
        passport_id: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        middle_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date_of_birth: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        gender: Option<String>,
    },
    /// List the built-in HIS sample patients
    Fixtures,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("mw_core=warn".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Migrate) => {
            let cfg = CoreConfig::from_env()?;
            let db = Database::connect(cfg.database_url()).await?;
            db.migrate().await?;
            println!("Database ready at {}", cfg.database_url());
        }
        Some(Commands::CreateStaff {
            employee_id,
            username,
            password,
            first_name,
            last_name,
            email,
            role,
            hospital,
            phone,
            department,
        }) => {
            let cfg = Arc::new(CoreConfig::from_env()?);
            let db = open(&cfg).await?;
            let auth = AuthService::new(db.staff(), cfg);

            let input = NewStaffInput {
                employee_id,
                username,
                password,
                first_name,
                last_name,
                email,
                phone_number: phone,
                role,
                department,
                hospital,
            };
            match auth.create_staff(input).await {
                Ok(staff) => println!(
                    "Created staff {} (id {}) at {}",
                    staff.username, staff.id, staff.hospital
                ),
                Err(e) => eprintln!("Error creating staff: {e}"),
            }
        }
        Some(Commands::Search {
            hospital,
            id,
            hn,
            national_id,
            passport_id,
            first_name,
            middle_name,
            last_name,
            date_of_birth,
            phone,
            email,
            gender,
        }) => {
            let date_of_birth = date_of_birth
                .as_deref()
                .map(parse_search_date)
                .transpose()?;
            let criteria = SearchCriteria {
                id,
                national_id,
                passport_id,
                patient_hn: hn,
                first_name,
                middle_name,
                last_name,
                date_of_birth,
                phone_number: phone,
                email,
                gender,
            }
            .normalized();
            criteria.validate()?;

            let cfg = CoreConfig::from_env()?;
            let db = open(&cfg).await?;
            let service = PatientService::new(
                Arc::new(db.patients()),
                Arc::new(HisDirectoryClient::from_config(&cfg)?),
            );

            match service.search_patient(&criteria, &hospital).await {
                Ok(patients) if patients.is_empty() => println!("No patients found."),
                Ok(patients) => {
                    for patient in &patients {
                        print_patient(patient);
                    }
                }
                Err(MiddlewareError::AccessDenied) => {
                    eprintln!("Access denied: patient does not belong to {hospital}")
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::Fixtures) => {
            for patient in fixtures() {
                print_patient(&patient);
            }
        }
        None => {
            println!("Use 'mw --help' for commands");
        }
    }

    Ok(())
}

async fn open(cfg: &CoreConfig) -> anyhow::Result<Database> {
    let db = Database::connect(cfg.database_url()).await?;
    db.migrate().await?;
    Ok(db)
}

fn print_patient(p: &PatientRecord) {
    let name_en = [&p.first_name_en, &p.middle_name_en, &p.last_name_en]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let id = p
        .national_id
        .as_deref()
        .or(p.passport_id.as_deref())
        .unwrap_or("-");

    println!(
        "{} | {} | {} | {} | DOB: {} | {}",
        p.patient_hn,
        p.hospital,
        id,
        name_en,
        p.date_of_birth.format("%Y-%m-%d"),
        p.gender
    );
}
