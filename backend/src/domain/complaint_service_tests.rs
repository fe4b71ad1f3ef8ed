//! Tests for the complaint service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockAccountRepository, MockComplaintRepository, MockSentimentScorer};
use crate::domain::{
    Account, AccountSummary, DisplayName, EmailAddress, ErrorCode, PasswordHash, Role,
};
use crate::test_support::{MutableClock, ScriptedSentimentScorer, TestServices, eventually, fixed_now};
use rstest::rstest;

fn student() -> Identity {
    Identity {
        account_id: AccountId::random(),
        role: Role::Student,
    }
}

fn admin() -> Identity {
    Identity {
        account_id: AccountId::random(),
        role: Role::Admin,
    }
}

fn draft(body: &str, category: &str) -> ComplaintDraft {
    ComplaintDraft::try_from_parts(None, body, category).expect("valid draft")
}

async fn seed_account(services: &TestServices, name: &str) -> AccountSummary {
    let account = Account {
        id: AccountId::random(),
        name: DisplayName::new(name).expect("name"),
        email: EmailAddress::new(format!("{}@x.edu", name.to_lowercase())).expect("email"),
        password_hash: PasswordHash::new("$argon2id$stub").expect("hash"),
        role: Role::Student,
    };
    services.accounts.insert(&account).await.expect("insert account");
    account.summary()
}

#[tokio::test]
async fn create_starts_pending_with_no_votes_and_the_score() {
    let services = TestServices::new(ScriptedSentimentScorer::new([Ok(-0.6)]));
    let author = student();

    let complaint = services
        .complaint_service
        .create(&author, draft("Wifi down", "WiFi"))
        .await
        .expect("create succeeds");

    assert_eq!(complaint.status, ComplaintStatus::Pending);
    assert_eq!(complaint.votes, 0);
    assert!(complaint.voted_by.is_empty());
    assert_eq!(complaint.author, author.account_id);
    assert_eq!(complaint.sentiment, Some(-0.6));
    assert_eq!(complaint.created_at, fixed_now());
    assert_eq!(services.scorer.calls(), 1);
}

#[tokio::test]
async fn create_survives_an_unreachable_scorer() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());

    let complaint = services
        .complaint_service
        .create(&student(), draft("Wifi down", "WiFi"))
        .await
        .expect("create succeeds without a score");

    assert_eq!(complaint.sentiment, None);
    assert_eq!(complaint.status, ComplaintStatus::Pending);
    let complaints = Arc::clone(&services.complaints);
    let stored = complaints
        .find_by_id(&complaint.id)
        .await
        .expect("lookup")
        .expect("persisted");
    assert_eq!(stored.id, complaint.id);
}

#[tokio::test]
async fn failed_scores_are_backfilled_once() {
    let scorer = ScriptedSentimentScorer::new([
        Err(SentimentScorerError::status(503_u16, "warming up")),
        Ok(-0.25),
    ]);
    let services = TestServices::new(scorer);

    let complaint = services
        .complaint_service
        .create(&student(), draft("Mess food is cold", "Mess"))
        .await
        .expect("create succeeds");
    assert_eq!(complaint.sentiment, None);

    let complaints = Arc::clone(&services.complaints);
    let id = complaint.id;
    let backfilled = eventually(async || {
        matches!(
            complaints.find_by_id(&id).await,
            Ok(Some(Complaint { sentiment: Some(_), .. }))
        )
    })
    .await;
    assert!(backfilled, "sentiment should be backfilled");
    assert_eq!(services.scorer.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_scorers_are_bounded_by_the_timeout() {
    let scorer = ScriptedSentimentScorer::new([Ok(0.9)]).with_delay(Duration::from_secs(30));
    let services = TestServices::new(scorer);

    let complaint = services
        .complaint_service
        .create(&student(), draft("Projector flickers", "Infrastructure"))
        .await
        .expect("create succeeds");

    assert_eq!(complaint.sentiment, None);
}

#[rstest]
#[case::blank_body("   ", "WiFi")]
#[case::blank_category("Wifi down", "")]
fn drafts_reject_blank_required_fields(#[case] body: &str, #[case] category: &str) {
    assert!(ComplaintDraft::try_from_parts(Some("title"), body, category).is_err());
}

#[tokio::test]
async fn first_vote_counts_and_repeat_vote_conflicts() {
    let services = TestServices::new(ScriptedSentimentScorer::new([Ok(0.0)]));
    let complaint = services
        .complaint_service
        .create(&student(), draft("Broken chair", "Infrastructure"))
        .await
        .expect("create succeeds");
    let voter = student();

    let voted = services
        .complaint_service
        .vote(&voter, complaint.id)
        .await
        .expect("first vote");
    assert_eq!(voted.votes, 1);
    assert_eq!(voted.last_voter, Some(voter.account_id));

    let error = services
        .complaint_service
        .vote(&voter, complaint.id)
        .await
        .expect_err("repeat vote");
    assert_eq!(error.code(), ErrorCode::Conflict);

    let stored = services
        .complaint_service
        .get(complaint.id)
        .await
        .expect("still present");
    assert_eq!(stored.votes, 1);
}

#[tokio::test]
async fn voting_on_an_unknown_complaint_is_not_found() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let error = services
        .complaint_service
        .vote(&student(), ComplaintId::random())
        .await
        .expect_err("unknown complaint");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn admins_can_move_status_back_to_pending() {
    let services = TestServices::new(ScriptedSentimentScorer::new([Ok(0.1)]));
    let complaint = services
        .complaint_service
        .create(&student(), draft("Gym equipment rusted", "Sports"))
        .await
        .expect("create succeeds");
    let moderator = admin();

    let resolved = services
        .complaint_service
        .set_status(&moderator, complaint.id, ComplaintStatus::Resolved)
        .await
        .expect("resolve");
    assert_eq!(resolved.status, ComplaintStatus::Resolved);

    let reopened = services
        .complaint_service
        .set_status(&moderator, complaint.id, ComplaintStatus::Pending)
        .await
        .expect("reopen");
    assert_eq!(reopened.status, ComplaintStatus::Pending);
}

#[tokio::test]
async fn set_status_is_forbidden_for_students_before_touching_the_store() {
    let mut complaints = MockComplaintRepository::new();
    complaints.expect_set_status().times(0);
    let service = ComplaintService::new(
        Arc::new(complaints),
        Arc::new(MockAccountRepository::new()),
        Arc::new(MockSentimentScorer::new()),
        Arc::new(MutableClock::new(fixed_now())),
    );

    let error = service
        .set_status(&student(), ComplaintId::random(), ComplaintStatus::Rejected)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn set_status_on_an_unknown_complaint_is_not_found() {
    let services = TestServices::new(ScriptedSentimentScorer::unavailable());
    let error = services
        .complaint_service
        .set_status(&admin(), ComplaintId::random(), ComplaintStatus::Resolved)
        .await
        .expect_err("unknown complaint");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case::connection(ComplaintRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::query(ComplaintRepositoryError::query("bad sql"), ErrorCode::InternalError)]
#[tokio::test]
async fn store_failures_map_to_domain_errors(
    #[case] failure: ComplaintRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut complaints = MockComplaintRepository::new();
    complaints.expect_list().return_once(move || Err(failure));
    let service = ComplaintService::new(
        Arc::new(complaints),
        Arc::new(MockAccountRepository::new()),
        Arc::new(MockSentimentScorer::new()),
        Arc::new(MutableClock::new(fixed_now())),
    );

    let error = service.list_all().await.expect_err("store failure");
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn list_with_authors_resolves_names_newest_first() {
    let services = TestServices::new(ScriptedSentimentScorer::new([Ok(0.0), Ok(0.0), Ok(0.0)]));
    let ana = seed_account(&services, "Ana").await;
    let ben = seed_account(&services, "Ben").await;
    let ana_identity = Identity {
        account_id: ana.id,
        role: Role::Student,
    };
    let ben_identity = Identity {
        account_id: ben.id,
        role: Role::Student,
    };
    let ghost = student();

    let first = services
        .complaint_service
        .create(&ana_identity, draft("Dirty washrooms", "Hostel"))
        .await
        .expect("create");
    services.clock.advance_seconds(60);
    let second = services
        .complaint_service
        .create(&ben_identity, draft("Lab equipment missing", "Academics"))
        .await
        .expect("create");
    services.clock.advance_seconds(60);
    let third = services
        .complaint_service
        .create(&ghost, draft("No connectivity in library", "WiFi"))
        .await
        .expect("create");

    let listed = services
        .complaint_service
        .list_with_authors(&ana_identity)
        .await
        .expect("list");

    let ids: Vec<_> = listed.iter().map(|entry| entry.complaint.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
    let names: Vec<_> = listed
        .iter()
        .map(|entry| entry.author_name.as_ref().map(|name| name.as_ref().to_owned()))
        .collect();
    assert_eq!(
        names,
        vec![None, Some("Ben".to_owned()), Some("Ana".to_owned())]
    );
}

#[tokio::test]
async fn list_all_skips_author_resolution() {
    let mut accounts = MockAccountRepository::new();
    accounts.expect_display_names().times(0);
    let mut complaints = MockComplaintRepository::new();
    complaints.expect_list().return_once(|| Ok(Vec::new()));
    let service = ComplaintService::new(
        Arc::new(complaints),
        Arc::new(accounts),
        Arc::new(MockSentimentScorer::new()),
        Arc::new(MutableClock::new(fixed_now())),
    );

    assert!(service.list_all().await.expect("list").is_empty());
}

#[tokio::test]
async fn summary_is_admin_only_and_counts_every_complaint() {
    let services = TestServices::new(ScriptedSentimentScorer::new([Ok(0.0), Ok(0.0), Ok(0.0)]));
    let author = student();
    let moderator = admin();
    let wifi = services
        .complaint_service
        .create(&author, draft("Slow internet", "WiFi"))
        .await
        .expect("create");
    services
        .complaint_service
        .create(&author, draft("No connectivity", "WiFi"))
        .await
        .expect("create");
    services
        .complaint_service
        .create(&author, draft("Insects in food", "Mess"))
        .await
        .expect("create");
    services
        .complaint_service
        .set_status(&moderator, wifi.id, ComplaintStatus::Resolved)
        .await
        .expect("resolve");

    let error = services
        .complaint_service
        .summary(&author)
        .await
        .expect_err("students cannot see the dashboard");
    assert_eq!(error.code(), ErrorCode::Forbidden);

    let summary = services
        .complaint_service
        .summary(&moderator)
        .await
        .expect("summary");
    assert_eq!(summary.total, 3);
    assert_eq!(summary.pending, 2);
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.by_category.get("WiFi"), Some(&2));
    assert_eq!(summary.by_category.get("Mess"), Some(&1));
}
