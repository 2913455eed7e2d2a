//! Shared behaviour contract for `UserStore` adapters.
//!
//! Every check runs against the in-memory store. The same checks run against
//! PostgreSQL when `REGISTRATION_TEST_DATABASE_URL` names a database the
//! suite may write to; each check starts from an emptied `users` table.

use std::sync::Arc;

use registration::domain::ports::{
    DeleteOutcome, UpdateOptions, UpdateOutcome, UserFilter, UserPatch, UserStore,
};
use registration::domain::{DisplayName, Email, NewUserRecord, PasswordHash, UserId};
use registration::outbound::memory::InMemoryUserStore;
use registration::outbound::persistence::{
    DbPool, DieselUserStore, PoolConfig, run_pending_migrations,
};
use rstest::rstest;

const TEST_DATABASE_URL: &str = "REGISTRATION_TEST_DATABASE_URL";

fn name(raw: &str) -> DisplayName {
    DisplayName::new(raw).expect("valid name")
}

fn email(raw: &str) -> Email {
    Email::new(raw).expect("valid email")
}

fn record(display_name: &str, address: &str) -> NewUserRecord {
    NewUserRecord {
        display_name: name(display_name),
        email: Some(email(address)),
        password_hash: Some(PasswordHash::from_encoded("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA")),
    }
}

fn rename_to(display_name: &str) -> UserPatch {
    UserPatch {
        display_name: name(display_name),
    }
}

const PLAIN: UpdateOptions = UpdateOptions { upsert: false };
const UPSERT: UpdateOptions = UpdateOptions { upsert: true };

async fn inserts_keep_order_and_first_match_wins(store: &dyn UserStore) {
    let first = store.insert(record("Ahnaf", "dup@x.com")).await.expect("insert");
    let second = store.insert(record("Bea", "dup@x.com")).await.expect("insert");
    assert_ne!(first.user().id(), second.user().id());
    assert!(first.password_hash().is_some());

    let all = store.find_all().await.expect("find all");
    assert_eq!(all, vec![first.clone(), second.clone()]);

    let by_email = store
        .find_one(&UserFilter::by_email(email("dup@x.com")))
        .await
        .expect("lookup");
    assert_eq!(by_email, Some(first));

    let by_name = store
        .find_one(&UserFilter {
            display_name: Some(name("Bea")),
            ..UserFilter::default()
        })
        .await
        .expect("lookup");
    assert_eq!(by_name, Some(second));

    let absent = store
        .find_one(&UserFilter::by_email(email("ghost@x.com")))
        .await
        .expect("lookup");
    assert_eq!(absent, None);
}

async fn update_reports_modified_then_unchanged(store: &dyn UserStore) {
    let stored = store.insert(record("Ahnaf", "a@x.com")).await.expect("insert");
    let id = stored.user().id().clone();
    let filter = UserFilter::by_id(id.clone());

    let modified = store
        .update_one(&filter, &rename_to("Ahnaf Tahmid"), PLAIN)
        .await
        .expect("update");
    assert_eq!(modified, UpdateOutcome::Modified { id: id.clone() });

    let unchanged = store
        .update_one(&filter, &rename_to("Ahnaf Tahmid"), PLAIN)
        .await
        .expect("update");
    assert_eq!(unchanged, UpdateOutcome::Unchanged { id: id.clone() });

    let after = store.find_one(&filter).await.expect("lookup").expect("present");
    assert_eq!(after.user().display_name(), &name("Ahnaf Tahmid"));
    assert_eq!(after.user().email(), Some(&email("a@x.com")));
    assert_eq!(after.password_hash(), stored.password_hash());
}

async fn update_without_upsert_leaves_missing_ids_alone(store: &dyn UserStore) {
    let outcome = store
        .update_one(&UserFilter::by_id(UserId::random()), &rename_to("X"), PLAIN)
        .await
        .expect("update");
    assert_eq!(outcome, UpdateOutcome::NotMatched);
    assert!(store.find_all().await.expect("find all").is_empty());
}

async fn upsert_creates_a_name_only_record_under_the_filter_id(store: &dyn UserStore) {
    let id = UserId::random();
    let outcome = store
        .update_one(&UserFilter::by_id(id.clone()), &rename_to("X"), UPSERT)
        .await
        .expect("upsert");
    assert_eq!(outcome, UpdateOutcome::Upserted { id: id.clone() });

    let all = store.find_all().await.expect("find all");
    assert_eq!(all.len(), 1);
    let created = all.first().expect("one record");
    assert_eq!(created.user().id(), &id);
    assert_eq!(created.user().display_name(), &name("X"));
    assert_eq!(created.user().email(), None);
    assert!(created.password_hash().is_none());
}

async fn upsert_by_email_generates_an_id(store: &dyn UserStore) {
    let outcome = store
        .update_one(
            &UserFilter::by_email(email("new@x.com")),
            &rename_to("Newcomer"),
            UPSERT,
        )
        .await
        .expect("upsert");
    let UpdateOutcome::Upserted { id } = outcome else {
        panic!("expected an upsert, got {outcome:?}");
    };

    let created = store
        .find_one(&UserFilter::by_email(email("new@x.com")))
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(created.user().id(), &id);
    assert_eq!(created.user().display_name(), &name("Newcomer"));
}

async fn delete_removes_at_most_one_record(store: &dyn UserStore) {
    let first = store.insert(record("Ahnaf", "a@x.com")).await.expect("insert");
    let second = store.insert(record("Bea", "b@x.com")).await.expect("insert");

    let everything = store.delete_one(&UserFilter::default()).await.expect("delete");
    assert_eq!(everything, DeleteOutcome { deleted_count: 1 });
    assert_eq!(store.find_all().await.expect("find all"), vec![second]);

    let filter = UserFilter::by_id(first.user().id().clone());
    let again = store.delete_one(&filter).await.expect("delete");
    assert_eq!(again, DeleteOutcome { deleted_count: 0 });
}

#[derive(Debug, Clone, Copy)]
enum Contract {
    InsertOrder,
    ModifiedThenUnchanged,
    PlainUpdateOfMissingId,
    UpsertById,
    UpsertByEmail,
    DeleteAtMostOne,
}

impl Contract {
    const ALL: [Self; 6] = [
        Self::InsertOrder,
        Self::ModifiedThenUnchanged,
        Self::PlainUpdateOfMissingId,
        Self::UpsertById,
        Self::UpsertByEmail,
        Self::DeleteAtMostOne,
    ];

    async fn check(self, store: &dyn UserStore) {
        match self {
            Self::InsertOrder => inserts_keep_order_and_first_match_wins(store).await,
            Self::ModifiedThenUnchanged => update_reports_modified_then_unchanged(store).await,
            Self::PlainUpdateOfMissingId => {
                update_without_upsert_leaves_missing_ids_alone(store).await;
            }
            Self::UpsertById => upsert_creates_a_name_only_record_under_the_filter_id(store).await,
            Self::UpsertByEmail => upsert_by_email_generates_an_id(store).await,
            Self::DeleteAtMostOne => delete_removes_at_most_one_record(store).await,
        }
    }
}

#[rstest]
#[case::insert_order(Contract::InsertOrder)]
#[case::modified_then_unchanged(Contract::ModifiedThenUnchanged)]
#[case::plain_update_of_missing_id(Contract::PlainUpdateOfMissingId)]
#[case::upsert_by_id(Contract::UpsertById)]
#[case::upsert_by_email(Contract::UpsertByEmail)]
#[case::delete_at_most_one(Contract::DeleteAtMostOne)]
#[tokio::test]
async fn in_memory_store_honours_the_contract(#[case] contract: Contract) {
    let store = InMemoryUserStore::new();
    contract.check(&store).await;
}

async fn empty(store: &dyn UserStore) {
    for user in store.find_all().await.expect("find all") {
        store
            .delete_one(&UserFilter::by_id(user.user().id().clone()))
            .await
            .expect("delete");
    }
}

/// Runs serially so checks never observe each other's rows.
#[tokio::test]
async fn postgres_store_honours_the_contract() {
    let Ok(url) = std::env::var(TEST_DATABASE_URL) else {
        eprintln!("SKIP-TEST-CLUSTER: {TEST_DATABASE_URL} is not set");
        return;
    };
    run_pending_migrations(&url).await.expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(2))
        .await
        .expect("pool builds");
    let store: Arc<dyn UserStore> = Arc::new(DieselUserStore::new(pool));

    for contract in Contract::ALL {
        empty(store.as_ref()).await;
        eprintln!("contract: {contract:?}");
        contract.check(store.as_ref()).await;
    }
    empty(store.as_ref()).await;
}
