//! Terminal client for students and administrators.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use grievances::client::{ApiClient, DEFAULT_CLIENT_TIMEOUT, Session, SessionStore, authored_by, dashboard};
use grievances::domain::{ComplaintId, ComplaintStatus, DashboardSummary};
use grievances::inbound::http::accounts::{LoginRequest, RegisterRequest};
use grievances::inbound::http::complaints::{ComplaintResponse, CreateComplaintRequest};
use tokio::runtime::Builder;
use tracing_subscriber::EnvFilter;
use url::Url;

/// `grievance-cli` arguments.
#[derive(Debug, Parser)]
#[command(name = "grievance-cli", about = "Submit, vote on, and triage campus grievances", version)]
struct CliArgs {
    /// Server base URL.
    #[arg(long, env = "GRIEVANCE_API_URL", default_value = "http://127.0.0.1:8080")]
    server: Url,
    /// Directory holding the cached session.
    #[arg(long, env = "GRIEVANCE_SESSION_DIR", default_value = ".grievance-cli")]
    session_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Register with the admin role.
        #[arg(long)]
        admin: bool,
    },
    /// Log in and cache the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the cached session.
    Logout,
    /// Show the signed-in account.
    Whoami,
    /// Submit a complaint.
    Submit {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: String,
        #[arg(long)]
        category: String,
    },
    /// List complaints with author names.
    List {
        /// Only complaints authored by the signed-in account.
        #[arg(long)]
        mine: bool,
    },
    /// List complaints without signing in.
    All,
    /// Show one complaint.
    Show {
        #[arg(value_parser = parse_complaint_id)]
        id: ComplaintId,
    },
    /// Upvote a complaint once.
    Vote {
        #[arg(value_parser = parse_complaint_id)]
        id: ComplaintId,
    },
    /// Set a complaint's status (admin).
    Status {
        #[arg(value_parser = parse_complaint_id)]
        id: ComplaintId,
        #[arg(value_parser = parse_status)]
        status: ComplaintStatus,
    },
    /// Print dashboard totals (admin).
    Dashboard {
        /// Ask the server for totals instead of counting locally.
        #[arg(long)]
        remote: bool,
    },
}

fn parse_complaint_id(raw: &str) -> Result<ComplaintId, String> {
    ComplaintId::new(raw).map_err(|error| error.to_string())
}

fn parse_status(raw: &str) -> Result<ComplaintStatus, String> {
    raw.parse().map_err(|_| {
        let allowed: Vec<&str> = ComplaintStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("status must be one of: {}", allowed.join(", "))
    })
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> color_eyre::Result<()> {
    let store = SessionStore::new(&args.session_dir);
    let session = store.load();
    let client = ApiClient::new(args.server, DEFAULT_CLIENT_TIMEOUT)?.with_session(session.as_ref());

    match args.command {
        Command::Register {
            name,
            email,
            password,
            admin,
        } => {
            let request = RegisterRequest {
                name,
                email,
                password,
                role: admin.then(|| "admin".to_owned()),
            };
            let account = client.register(&request).await?;
            println!("registered {} <{}> as {}", account.name, account.email, account.role);
        }
        Command::Login { email, password } => {
            let session = client.login(&LoginRequest { email, password }).await?;
            store.save(&session)?;
            println!("signed in as {} ({})", session.account.name, session.account.role);
        }
        Command::Logout => {
            store.clear()?;
            println!("signed out");
        }
        Command::Whoami => match &session {
            Some(session) => println!(
                "{} <{}> {} {}",
                session.account.name, session.account.email, session.account.role, session.account.id
            ),
            None => println!("anonymous"),
        },
        Command::Submit {
            title,
            body,
            category,
        } => {
            let complaint = client
                .submit(&CreateComplaintRequest {
                    title,
                    body,
                    category,
                })
                .await?;
            print_complaint(&complaint);
        }
        Command::List { mine } => {
            let mut complaints = client.list_with_authors().await?;
            if mine {
                let me = signed_in(session.as_ref())?;
                complaints = authored_by(&complaints, &me.account.id);
            }
            print_list(&complaints);
        }
        Command::All => print_list(&client.list_all().await?),
        Command::Show { id } => print_complaint(&client.get(&id).await?),
        Command::Vote { id } => {
            let complaint = client.vote(&id).await?;
            println!("{} now has {} vote(s)", complaint.id, complaint.votes);
        }
        Command::Status { id, status } => {
            require_admin(session.as_ref())?;
            let complaint = client.set_status(&id, status).await?;
            println!("{} is now {}", complaint.id, complaint.status);
        }
        Command::Dashboard { remote } => {
            require_admin(session.as_ref())?;
            if remote {
                let totals = client.summary().await?;
                print_dashboard(&DashboardSummary {
                    total: totals.total,
                    pending: totals.pending,
                    resolved: totals.resolved,
                    rejected: totals.rejected,
                    by_category: totals.by_category,
                });
            } else {
                print_dashboard(&dashboard(&client.list_with_authors().await?));
            }
        }
    }
    Ok(())
}

fn signed_in(session: Option<&Session>) -> color_eyre::Result<&Session> {
    session.ok_or_else(|| eyre!("not signed in; run `grievance-cli login` first"))
}

fn require_admin(session: Option<&Session>) -> color_eyre::Result<()> {
    if signed_in(session)?.is_admin() {
        Ok(())
    } else {
        Err(eyre!("this command requires an admin account"))
    }
}

fn print_list(complaints: &[ComplaintResponse]) {
    if complaints.is_empty() {
        println!("no complaints");
        return;
    }
    for complaint in complaints {
        let author = complaint.author_name.as_deref().unwrap_or("-");
        println!(
            "{}  [{}] {:<9} votes={:<3} {}  ({})",
            complaint.id,
            complaint.category,
            complaint.status.as_str(),
            complaint.votes,
            complaint.title.as_deref().unwrap_or(&complaint.body),
            author
        );
    }
}

fn print_complaint(complaint: &ComplaintResponse) {
    println!("id:        {}", complaint.id);
    if let Some(title) = &complaint.title {
        println!("title:     {title}");
    }
    println!("body:      {}", complaint.body);
    println!("category:  {}", complaint.category);
    println!("status:    {}", complaint.status);
    println!("votes:     {}", complaint.votes);
    match complaint.sentiment {
        Some(score) => println!("sentiment: {score:.2}"),
        None => println!("sentiment: pending"),
    }
    println!("created:   {}", complaint.created_at.to_rfc3339());
}

fn print_dashboard(summary: &DashboardSummary) {
    println!("total:    {}", summary.total);
    for status in ComplaintStatus::ALL {
        println!("{:<9} {}", format!("{status}:"), summary.count_for(status));
    }
    for (category, count) in &summary.by_category {
        println!("  {category}: {count}");
    }
}
