//! `DieselAccountRepository` against embedded PostgreSQL.

use grievances::domain::ports::{AccountRepository, AccountRepositoryError};
use grievances::domain::{Account, AccountId, DisplayName, EmailAddress, PasswordHash, Role};
use grievances::outbound::persistence::{DieselAccountRepository, run_pending_migrations};
use rstest::{fixture, rstest};

mod support;

use support::{MigratedDatabase, handle_cluster_setup_failure, migrated_database};

struct TestContext {
    db: MigratedDatabase,
    repository: DieselAccountRepository,
}

#[fixture]
fn context() -> Option<TestContext> {
    match migrated_database(2) {
        Ok(db) => Some(TestContext {
            repository: DieselAccountRepository::new(db.pool.clone()),
            db,
        }),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn account(name: &str, email: &str, role: Role) -> Account {
    Account {
        id: AccountId::random(),
        name: DisplayName::new(name).expect("name"),
        email: EmailAddress::new(email).expect("email"),
        password_hash: PasswordHash::new("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA").expect("hash"),
        role,
    }
}

#[rstest]
fn accounts_round_trip_by_email_and_id(context: Option<TestContext>) {
    let Some(ctx) = context else {
        eprintln!("SKIP-TEST-CLUSTER: accounts_round_trip_by_email_and_id skipped");
        return;
    };
    let dean = account("Dean", "dean@campus.test", Role::Admin);

    ctx.db.runtime.block_on(async {
        ctx.repository.insert(&dean).await.expect("insert");

        let by_email = ctx
            .repository
            .find_by_email("dean@campus.test")
            .await
            .expect("lookup")
            .expect("stored");
        assert_eq!(by_email, dean);

        let by_id = ctx
            .repository
            .find_by_id(&dean.id)
            .await
            .expect("lookup")
            .expect("stored");
        assert_eq!(by_id.role, Role::Admin);

        let missing = ctx
            .repository
            .find_by_email("nobody@campus.test")
            .await
            .expect("lookup");
        assert!(missing.is_none());
    });
}

#[rstest]
fn the_email_index_rejects_a_second_account(context: Option<TestContext>) {
    let Some(ctx) = context else {
        eprintln!("SKIP-TEST-CLUSTER: the_email_index_rejects_a_second_account skipped");
        return;
    };
    let first = account("Ana", "ana@campus.test", Role::Student);
    let second = account("Ana Again", "ana@campus.test", Role::Student);

    ctx.db.runtime.block_on(async {
        ctx.repository.insert(&first).await.expect("first insert");
        let error = ctx
            .repository
            .insert(&second)
            .await
            .expect_err("duplicate email");
        assert!(
            matches!(error, AccountRepositoryError::DuplicateEmail { ref email } if email == "ana@campus.test"),
            "unexpected error: {error:?}"
        );

        let stored = ctx
            .repository
            .find_by_email("ana@campus.test")
            .await
            .expect("lookup")
            .expect("stored");
        assert_eq!(stored.id, first.id);
    });
}

#[rstest]
fn display_names_skip_unknown_ids(context: Option<TestContext>) {
    let Some(ctx) = context else {
        eprintln!("SKIP-TEST-CLUSTER: display_names_skip_unknown_ids skipped");
        return;
    };
    let ana = account("Ana", "ana@campus.test", Role::Student);
    let ben = account("Ben", "ben@campus.test", Role::Student);

    ctx.db.runtime.block_on(async {
        ctx.repository.insert(&ana).await.expect("insert ana");
        ctx.repository.insert(&ben).await.expect("insert ben");

        let names = ctx
            .repository
            .display_names(&[ana.id, ben.id, AccountId::random()])
            .await
            .expect("names");
        assert_eq!(names.len(), 2);
        assert_eq!(names[&ana.id].to_string(), "Ana");
        assert_eq!(names[&ben.id].to_string(), "Ben");

        let none = ctx.repository.display_names(&[]).await.expect("empty");
        assert!(none.is_empty());
    });
}

#[rstest]
fn migrations_are_already_applied(context: Option<TestContext>) {
    let Some(ctx) = context else {
        eprintln!("SKIP-TEST-CLUSTER: migrations_are_already_applied skipped");
        return;
    };
    let applied = ctx
        .db
        .runtime
        .block_on(run_pending_migrations(&ctx.db.url))
        .expect("rerun migrations");
    assert_eq!(applied, 0);
}
