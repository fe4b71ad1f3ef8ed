//! Demo data generation for local development.
//!
//! Produces plausible campus complaints from a fixed template set. The random
//! source is injected so a seeded RNG yields the same data on every run.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rand::seq::{IteratorRandom, SliceRandom};
use thiserror::Error;
use tracing::{debug, info};

use super::account::{Account, AccountId, AccountValidationError, DisplayName, EmailAddress, Role};
use super::complaint::{ComplaintDraft, ComplaintStatus, NewComplaint};
use super::ports::{
    AccountRepository, AccountRepositoryError, ComplaintRepository, ComplaintRepositoryError,
    CredentialHasher, CredentialHasherError,
};

/// Demo student accounts as `(display name, email local part)`.
pub const DEMO_STUDENTS: [(&str, &str); 5] = [
    ("Abhishek", "abhishek"),
    ("Dashrath", "dashrath"),
    ("Aman", "aman"),
    ("Shashank", "shashank"),
    ("Mayank", "mayank"),
];

/// Domain used for demo account emails.
pub const DEMO_EMAIL_DOMAIN: &str = "campus.test";

/// Age window for generated creation timestamps.
pub const MAX_AGE_DAYS: i64 = 30;

struct Template {
    category: &'static str,
    title: &'static str,
    body: &'static str,
}

const TEMPLATES: &[Template] = &[
    Template {
        category: "Mess",
        title: "Undercooked rice at dinner",
        body: "Rice served at dinner was hard and clearly undercooked.",
    },
    Template {
        category: "Mess",
        title: "Insect found in dal",
        body: "There was an insect in the dal served at lunch today.",
    },
    Template {
        category: "Mess",
        title: "Breakfast runs out early",
        body: "Breakfast items are finished well before the counter closes.",
    },
    Template {
        category: "Hostel",
        title: "Leaking water cooler",
        body: "The water cooler on the third floor has been leaking for days.",
    },
    Template {
        category: "Hostel",
        title: "Washrooms not cleaned",
        body: "Block B washrooms have not been cleaned since Monday.",
    },
    Template {
        category: "Hostel",
        title: "Broken window pane",
        body: "The window pane in my room is cracked and lets rain in.",
    },
    Template {
        category: "Infrastructure",
        title: "Wobbling classroom fan",
        body: "The ceiling fan in room 302 wobbles and makes a grinding noise.",
    },
    Template {
        category: "Infrastructure",
        title: "Lab projector flickering",
        body: "The projector in lab 2 flickers constantly during lectures.",
    },
    Template {
        category: "Infrastructure",
        title: "Broken library chairs",
        body: "Several chairs in the reading hall have broken legs.",
    },
    Template {
        category: "Academics",
        title: "Missed lectures",
        body: "The maths lecturer has missed the last three scheduled classes.",
    },
    Template {
        category: "Academics",
        title: "Too few multimeters",
        body: "The physics lab does not have enough multimeters for every group.",
    },
    Template {
        category: "WiFi",
        title: "Slow hostel WiFi",
        body: "WiFi in the hostel is too slow to load lecture recordings.",
    },
    Template {
        category: "WiFi",
        title: "No signal in the library",
        body: "The campus network cannot be reached from the library reading hall.",
    },
    Template {
        category: "Sports",
        title: "Basketball rim damaged",
        body: "The rim and net on the basketball court are bent and torn.",
    },
    Template {
        category: "Sports",
        title: "Rusted gym weights",
        body: "Dumbbells in the gym are rusted and unsafe to lift.",
    },
];

/// One generated complaint plus the moderation state to apply after insert.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedComplaint {
    pub complaint: NewComplaint,
    pub status: ComplaintStatus,
    /// Distinct voters, drawn from the author pool.
    pub voters: Vec<AccountId>,
}

/// Generate `count` complaints authored and voted on by `authors`.
///
/// Returns an empty list when `authors` is empty.
pub fn generate_complaints<R: Rng + ?Sized>(
    rng: &mut R,
    authors: &[AccountId],
    count: usize,
    now: DateTime<Utc>,
) -> Vec<SeedComplaint> {
    if authors.is_empty() {
        return Vec::new();
    }
    (0..count)
        .filter_map(|_| generate_one(rng, authors, now))
        .collect()
}

fn generate_one<R: Rng + ?Sized>(
    rng: &mut R,
    authors: &[AccountId],
    now: DateTime<Utc>,
) -> Option<SeedComplaint> {
    let template = TEMPLATES.choose(rng)?;
    let author = *authors.choose(rng)?;
    let draft =
        ComplaintDraft::try_from_parts(Some(template.title), template.body, template.category)
            .ok()?;

    let hundredths: i32 = rng.gen_range(10..=100);
    let sentiment = -f64::from(hundredths) / 100.0;
    let age = TimeDelta::days(rng.gen_range(0..MAX_AGE_DAYS))
        + TimeDelta::minutes(rng.gen_range(0..24 * 60));
    let status = *ComplaintStatus::ALL.choose(rng)?;
    let voter_count = rng.gen_range(0..=authors.len());
    let voters = authors.iter().copied().choose_multiple(rng, voter_count);

    Some(SeedComplaint {
        complaint: NewComplaint::from_draft(author, draft, Some(sentiment), now - age),
        status,
        voters,
    })
}

/// Failures while writing demo data.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Accounts(#[from] AccountRepositoryError),
    #[error(transparent)]
    Complaints(#[from] ComplaintRepositoryError),
    #[error(transparent)]
    Hasher(#[from] CredentialHasherError),
    #[error("invalid demo account: {0}")]
    Account(#[from] AccountValidationError),
}

/// What a seeding run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub accounts_created: usize,
    pub complaints: usize,
    pub votes: usize,
}

/// Writes demo accounts and complaints through the repository ports.
pub struct DemoSeeder<A, C, H> {
    accounts: Arc<A>,
    complaints: Arc<C>,
    hasher: Arc<H>,
}

impl<A, C, H> DemoSeeder<A, C, H>
where
    A: AccountRepository,
    C: ComplaintRepository,
    H: CredentialHasher,
{
    pub fn new(accounts: Arc<A>, complaints: Arc<C>, hasher: Arc<H>) -> Self {
        Self {
            accounts,
            complaints,
            hasher,
        }
    }

    /// Make sure every [`DEMO_STUDENTS`] account exists, sharing `password`.
    ///
    /// Existing accounts are reused, so reruns do not fail on duplicate
    /// emails. Returns the student ids and how many were created.
    pub async fn ensure_students(
        &self,
        password: &str,
    ) -> Result<(Vec<AccountId>, usize), SeedError> {
        let mut ids = Vec::with_capacity(DEMO_STUDENTS.len());
        let mut created = 0;
        for (name, local_part) in DEMO_STUDENTS {
            let email = EmailAddress::new(format!("{local_part}@{DEMO_EMAIL_DOMAIN}"))?;
            if let Some(existing) = self.accounts.find_by_email(email.as_ref()).await? {
                debug!(email = %email, "demo account already present");
                ids.push(existing.id);
                continue;
            }
            let account = Account {
                id: AccountId::random(),
                name: DisplayName::new(name)?,
                email,
                password_hash: self.hasher.hash(password).await?,
                role: Role::Student,
            };
            self.accounts.insert(&account).await?;
            ids.push(account.id);
            created += 1;
        }
        Ok((ids, created))
    }

    /// Insert generated complaints, then replay their votes and statuses.
    pub async fn insert_complaints(&self, items: &[SeedComplaint]) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();
        for item in items {
            let stored = self.complaints.insert(&item.complaint).await?;
            for voter in &item.voters {
                self.complaints.record_vote(&stored.id, voter).await?;
                report.votes += 1;
            }
            if item.status != ComplaintStatus::Pending {
                self.complaints.set_status(&stored.id, item.status).await?;
            }
            report.complaints += 1;
        }
        info!(
            complaints = report.complaints,
            votes = report.votes,
            "demo complaints written"
        );
        Ok(report)
    }
}
