#![allow(clippy::unwrap_used)]

use super::*;
use crate::month::MonthKey;
use crate::store::{RecordStore, RecordWriter};
use rust_decimal_macros::dec;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn month(s: &str) -> MonthKey {
    s.parse().unwrap()
}

fn txn(kind: TransactionType, amount: Decimal, date: NaiveDate, category: &str) -> Transaction {
    Transaction::new(kind, amount, date, category.into(), "test".into()).unwrap()
}

fn goal(name: &str, target: Decimal) -> SavingsGoal {
    SavingsGoal::new_as_of(
        name.into(),
        target,
        ymd(2030, 6, 30),
        Priority::High,
        ymd(2024, 1, 1),
    )
    .unwrap()
}

fn setup_test_data(db: &Database) {
    let rows = [
        (TransactionType::Income, dec!(3000), ymd(2024, 1, 1), "Income"),
        (TransactionType::Expense, dec!(5.25), ymd(2024, 1, 10), "Food & Dining"),
        (TransactionType::Expense, dec!(42.99), ymd(2024, 1, 15), "Shopping"),
        (TransactionType::Expense, dec!(87.30), ymd(2024, 2, 5), "Food & Dining"),
    ];
    for (kind, amount, date, category) in rows {
        db.insert_transaction(&txn(kind, amount, date, category))
            .unwrap();
    }
}

// ── Default data ──────────────────────────────────────────────

#[test]
fn test_default_categories_seeded() {
    let db = Database::open_in_memory().unwrap();
    let cats = db.get_categories().unwrap();
    assert_eq!(cats.len(), Category::defaults().len());
    assert!(cats.iter().any(|c| c.name == "Income"));
    assert!(cats.iter().all(|c| !c.is_custom));
}

#[test]
fn test_default_categories_not_reseeded() {
    let mut db = Database::open_in_memory().unwrap();
    let count_before = db.get_categories().unwrap().len();
    db.seed_default_categories().unwrap();
    let count_after = db.get_categories().unwrap().len();
    assert_eq!(count_before, count_after);
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_transaction_round_trip_keeps_decimal_text() {
    let db = Database::open_in_memory().unwrap();
    let original = txn(
        TransactionType::Expense,
        dec!(0.10),
        ymd(2024, 3, 5),
        "Food & Dining",
    )
    .with_notes("split with Sam");
    let id = db.insert_transaction(&original).unwrap();

    let fetched = db
        .get_transactions(&TransactionFilter::id(id))
        .unwrap()
        .pop()
        .unwrap();
    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.amount, dec!(0.10));
    assert_eq!(fetched.date, ymd(2024, 3, 5));
    assert_eq!(fetched.kind, TransactionType::Expense);
    assert_eq!(fetched.notes.as_deref(), Some("split with Sam"));
}

#[test]
fn test_transactions_newest_first() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);
    let all = db.get_transactions(&TransactionFilter::all()).unwrap();
    let dates: Vec<NaiveDate> = all.iter().map(|t| t.date).collect();
    assert_eq!(
        dates,
        vec![ymd(2024, 2, 5), ymd(2024, 1, 15), ymd(2024, 1, 10), ymd(2024, 1, 1)]
    );
}

#[test]
fn test_same_day_ordered_by_id_desc() {
    let db = Database::open_in_memory().unwrap();
    let day = ymd(2024, 1, 1);
    let first = db
        .insert_transaction(&txn(TransactionType::Expense, dec!(1), day, "Other"))
        .unwrap();
    let second = db
        .insert_transaction(&txn(TransactionType::Expense, dec!(2), day, "Other"))
        .unwrap();
    let ids: Vec<i64> = db
        .get_transactions(&TransactionFilter::all())
        .unwrap()
        .iter()
        .filter_map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![second, first]);
}

#[test]
fn test_transaction_filters() {
    let db = Database::open_in_memory().unwrap();
    setup_test_data(&db);

    let jan = db
        .get_transactions(&TransactionFilter::month(month("2024-01")))
        .unwrap();
    assert_eq!(jan.len(), 3);

    let food = db
        .get_transactions(&TransactionFilter::all().category("Food & Dining"))
        .unwrap();
    assert_eq!(food.len(), 2);

    let food_feb = db
        .get_transactions(&TransactionFilter::month(month("2024-02")).category("Food & Dining"))
        .unwrap();
    assert_eq!(food_feb.len(), 1);
    assert_eq!(food_feb[0].amount, dec!(87.30));

    let none = db
        .get_transactions(&TransactionFilter::month(month("2023-12")))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_transaction_update_and_delete() {
    let db = Database::open_in_memory().unwrap();
    let original = txn(TransactionType::Expense, dec!(10), ymd(2024, 1, 2), "Other");
    let id = db.insert_transaction(&original).unwrap();

    let mut changed = original.clone();
    changed.category = "Travel".into();
    changed.amount = dec!(99.99);
    let updated = db.update_transaction(id, &changed).unwrap();
    assert_eq!(updated.category, "Travel");
    assert_eq!(updated.amount, dec!(99.99));
    assert_eq!(updated.created_at, original.created_at);

    let deleted = db.delete_transaction(id).unwrap();
    assert_eq!(deleted.id, Some(id));
    assert!(matches!(
        db.delete_transaction(id),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        db.update_transaction(id, &changed),
        Err(Error::NotFound { .. })
    ));
}

#[test]
fn test_invalid_transaction_rejected() {
    let db = Database::open_in_memory().unwrap();
    let mut bad = txn(TransactionType::Expense, dec!(10), ymd(2024, 1, 2), "Other");
    bad.amount = dec!(-10);
    assert!(matches!(
        db.insert_transaction(&bad),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_corrupt_amount_surfaces_as_database_error() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute(
            "INSERT INTO transactions (amount, date, category, kind, description, created_at)
             VALUES ('lots', '2024-01-01', 'Other', 'expense', 'x', '')",
            [],
        )
        .unwrap();
    assert!(matches!(
        db.get_transactions(&TransactionFilter::all()),
        Err(Error::Database(_))
    ));
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_custom_category_lifecycle() {
    let db = Database::open_in_memory().unwrap();
    let pets = Category::new("Pets".into()).unwrap();
    let id = db.insert_category(&pets).unwrap();

    let fetched = db.get_category_by_name("Pets").unwrap().unwrap();
    assert!(fetched.is_custom);
    assert_eq!(fetched.id, Some(id));

    // names are unique regardless of case
    let shouty = Category::new("PETS".into()).unwrap();
    assert!(matches!(
        db.insert_category(&shouty),
        Err(Error::InvalidArgument(_))
    ));

    db.delete_category(id).unwrap();
    assert!(db.get_category_by_name("Pets").unwrap().is_none());
}

#[test]
fn test_builtin_category_not_deletable() {
    let db = Database::open_in_memory().unwrap();
    let income = db.get_category_by_name("Income").unwrap().unwrap();
    assert!(matches!(
        db.delete_category(income.id.unwrap()),
        Err(Error::NotFound { .. })
    ));
    assert!(db.get_category_by_name("Income").unwrap().is_some());
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_budget_crud() {
    let db = Database::open_in_memory().unwrap();
    let budget = Budget::new("Food & Dining".into(), month("2024-03"), dec!(400)).unwrap();
    let id = db.insert_budget(&budget).unwrap();

    let listed = db.get_budgets(&BudgetFilter::month(month("2024-03"))).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].monthly_limit, dec!(400));
    assert_eq!(listed[0].spent, Decimal::ZERO);
    assert!(db
        .get_budgets(&BudgetFilter::month(month("2024-04")))
        .unwrap()
        .is_empty());

    let mut raised = listed[0].clone();
    raised.monthly_limit = dec!(450.50);
    raised.spent = dec!(12);
    let updated = db.update_budget(id, &raised).unwrap();
    assert_eq!(updated.monthly_limit, dec!(450.50));
    assert_eq!(updated.spent, dec!(12));

    db.delete_budget(id).unwrap();
    assert!(matches!(db.delete_budget(id), Err(Error::NotFound { .. })));
}

#[test]
fn test_budget_duplicate_rejected() {
    let db = Database::open_in_memory().unwrap();
    let budget = Budget::new("Travel".into(), month("2024-03"), dec!(100)).unwrap();
    db.insert_budget(&budget).unwrap();
    assert!(matches!(
        db.insert_budget(&budget),
        Err(Error::InvalidArgument(_))
    ));

    let april = Budget::new("Travel".into(), month("2024-04"), dec!(100)).unwrap();
    let april_id = db.insert_budget(&april).unwrap();
    assert!(matches!(
        db.update_budget(april_id, &budget),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_budget_update_missing() {
    let db = Database::open_in_memory().unwrap();
    let budget = Budget::new("Travel".into(), month("2024-03"), dec!(100)).unwrap();
    assert!(matches!(
        db.update_budget(7, &budget),
        Err(Error::NotFound { .. })
    ));
}

// ── Goals ─────────────────────────────────────────────────────

#[test]
fn test_goal_insert_starts_at_zero() {
    let db = Database::open_in_memory().unwrap();
    let mut g = goal("Vacation", dec!(2000));
    g.current_amount = dec!(500);
    db.insert_goal(&g).unwrap();
    let goals = db.get_goals().unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].current_amount, Decimal::ZERO);
    assert_eq!(goals[0].priority, Priority::High);
    assert_eq!(goals[0].deadline, ymd(2030, 6, 30));
}

#[test]
fn test_contributions_accumulate() {
    let mut db = Database::open_in_memory().unwrap();
    let id = db.insert_goal(&goal("Vacation", dec!(2000))).unwrap();
    db.add_contribution(id, dec!(100)).unwrap();
    let after = db.add_contribution(id, dec!(0.01)).unwrap();
    assert_eq!(after.current_amount, dec!(100.01));
}

#[test]
fn test_contribution_rejected_leaves_goal_unchanged() {
    let mut db = Database::open_in_memory().unwrap();
    let id = db.insert_goal(&goal("Vacation", dec!(2000))).unwrap();
    assert!(matches!(
        db.add_contribution(id, dec!(-5)),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        db.add_contribution(id + 1, dec!(5)),
        Err(Error::NotFound { .. })
    ));
    assert_eq!(db.get_goals().unwrap()[0].current_amount, Decimal::ZERO);
}

#[test]
fn test_update_goal_keeps_saved_amount_monotonic() {
    let mut db = Database::open_in_memory().unwrap();
    let id = db.insert_goal(&goal("Vacation", dec!(2000))).unwrap();
    let funded = db.add_contribution(id, dec!(300)).unwrap();

    let mut lowered = funded.clone();
    lowered.current_amount = dec!(100);
    assert!(matches!(
        db.update_goal(id, &lowered),
        Err(Error::InvalidArgument(_))
    ));

    let mut retargeted = funded.clone();
    retargeted.target_amount = dec!(2500);
    retargeted.priority = Priority::Low;
    let updated = db.update_goal(id, &retargeted).unwrap();
    assert_eq!(updated.target_amount, dec!(2500));
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(updated.current_amount, dec!(300));

    db.delete_goal(id).unwrap();
    assert!(matches!(db.delete_goal(id), Err(Error::NotFound { .. })));
}

#[test]
fn test_contribution_overflow_rejected() {
    let mut db = Database::open_in_memory().unwrap();
    let id = db.insert_goal(&goal("Moon", Decimal::MAX)).unwrap();
    db.add_contribution(id, Decimal::MAX).unwrap();
    assert!(matches!(
        db.add_contribution(id, Decimal::MAX),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(db.get_goals().unwrap()[0].current_amount, Decimal::MAX);
}

#[test]
fn test_goal_insert_rejects_past_deadline() {
    let db = Database::open_in_memory().unwrap();
    let mut g = goal("Vacation", dec!(2000));
    g.deadline = ymd(2000, 1, 1);
    assert!(matches!(db.insert_goal(&g), Err(Error::InvalidArgument(_))));
    assert!(db.get_goals().unwrap().is_empty());
}

// ── Schema migration ──────────────────────────────────────────

#[test]
fn test_schema_version_set() {
    let db = Database::open_in_memory().unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_double_migrate_idempotent() {
    let mut db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_reopen_file_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fintrack.db");
    {
        let db = Database::open(&path).unwrap();
        setup_test_data(&db);
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_transactions(&TransactionFilter::all()).unwrap().len(), 4);
    assert_eq!(db.get_categories().unwrap().len(), Category::defaults().len());
}

// ── Store adapter ─────────────────────────────────────────────

#[tokio::test]
async fn test_sqlite_store_matches_memory_semantics() {
    let store = SqliteStore::open_in_memory().unwrap();
    let id = store
        .create_transaction(&txn(
            TransactionType::Income,
            dec!(1200),
            ymd(2024, 3, 1),
            "Income",
        ))
        .await
        .unwrap();
    let listed = store
        .list_transactions(&TransactionFilter::month(month("2024-03")))
        .await
        .unwrap();
    assert_eq!(listed[0].id, Some(id));

    let goal_id = store.create_goal(&goal("Car", dec!(500))).await.unwrap();
    let funded = store.add_contribution(goal_id, dec!(50)).await.unwrap();
    assert_eq!(funded.current_amount, dec!(50));

    assert!(store.get_category("income").await.unwrap().is_some());
    assert!(matches!(
        store.delete_budget(1).await,
        Err(Error::NotFound { .. })
    ));
}
