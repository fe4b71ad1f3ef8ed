//! Populate a database with demo students and complaints.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use grievances::domain::demo_seed::{DemoSeeder, generate_complaints};
use grievances::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselComplaintRepository, PoolConfig, run_pending_migrations,
};
use grievances::outbound::security::Argon2CredentialHasher;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `seed-complaints` arguments.
#[derive(Debug, Parser)]
#[command(
    name = "seed-complaints",
    about = "Insert demo student accounts and complaints",
    version
)]
struct CliArgs {
    /// Database connection URL.
    #[arg(long, env = "GRIEVANCE_DATABASE_URL", value_name = "url")]
    database_url: String,
    /// Number of complaints to generate.
    #[arg(long, default_value_t = 100)]
    count: usize,
    /// RNG seed for reproducible data. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Password shared by the demo student accounts.
    #[arg(long, default_value = "password123")]
    password: String,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: CliArgs) -> color_eyre::Result<()> {
    run_pending_migrations(&args.database_url)
        .await
        .wrap_err("apply migrations")?;
    let pool = DbPool::new(PoolConfig::new(&args.database_url))
        .await
        .wrap_err("create database pool")?;

    let seeder = DemoSeeder::new(
        Arc::new(DieselAccountRepository::new(pool.clone())),
        Arc::new(DieselComplaintRepository::new(pool)),
        Arc::new(Argon2CredentialHasher::new()),
    );
    let (students, created) = seeder
        .ensure_students(&args.password)
        .await
        .wrap_err("create demo students")?;
    info!(created, total = students.len(), "demo students ready");

    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let items = generate_complaints(&mut rng, &students, args.count, Utc::now());
    let report = seeder
        .insert_complaints(&items)
        .await
        .wrap_err("insert demo complaints")?;

    println!("accounts_created={created}");
    println!("complaints={}", report.complaints);
    println!("votes={}", report.votes);
    Ok(())
}
