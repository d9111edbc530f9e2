#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{Priority, TransactionType};
use crate::month::MonthKey;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn month(s: &str) -> MonthKey {
    s.parse().unwrap()
}

fn expense(category: &str, amount: Decimal, date: NaiveDate) -> Transaction {
    Transaction::new(
        TransactionType::Expense,
        amount,
        date,
        category.into(),
        "test".into(),
    )
    .unwrap()
}

fn goal(name: &str, target: Decimal) -> SavingsGoal {
    SavingsGoal::new_as_of(
        name.into(),
        target,
        ymd(2030, 1, 1),
        Priority::Medium,
        ymd(2024, 1, 1),
    )
    .unwrap()
}

const SEED: &str = r#"{
    "transactions": [
        {"id": 1, "amount": "3000", "date": "2024-03-01", "category": "Income", "type": "income", "description": "Salary"},
        {"id": 2, "amount": "50", "date": "2024-03-05", "category": "Food & Dining", "type": "expense", "description": "Groceries"},
        {"id": 3, "amount": "20", "date": "2024-02-10", "category": "Food & Dining", "type": "expense", "description": "Lunch"}
    ],
    "budgets": [
        {"id": 1, "category": "Food & Dining", "month": "2024-03", "monthly_limit": "200", "spent": "999"}
    ],
    "goals": [
        {"id": 1, "name": "Emergency Fund", "target_amount": "1000", "current_amount": "250", "deadline": "2030-01-01", "priority": "high"}
    ]
}"#;

// ── Seeding ───────────────────────────────────────────────────

#[tokio::test]
async fn test_new_has_default_categories() {
    let store = MemoryStore::new();
    let cats = store.list_categories().await.unwrap();
    assert_eq!(cats.len(), Category::defaults().len());
    assert!(cats.iter().all(|c| c.id.is_some()));
    let income = store.get_category("Income").await.unwrap().unwrap();
    assert!(!income.is_custom);
    assert!(store.get_category("Nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_seed_json_loads() {
    let store = MemoryStore::from_seed_json(SEED).unwrap();
    let txns = store.list_transactions(&TransactionFilter::all()).await.unwrap();
    assert_eq!(txns.len(), 3);
    let budgets = store.list_budgets(&BudgetFilter::all()).await.unwrap();
    assert_eq!(budgets[0].spent, dec!(999));
    let goals = store.list_goals().await.unwrap();
    assert_eq!(goals[0].current_amount, dec!(250));
}

#[test]
fn test_seed_json_rejects_invalid_records() {
    let bad = r#"{"transactions": [
        {"amount": "-5", "date": "2024-03-01", "category": "Food", "type": "expense", "description": "x"}
    ]}"#;
    assert!(matches!(
        MemoryStore::from_seed_json(bad),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        MemoryStore::from_seed_json("{not json"),
        Err(Error::Seed(_))
    ));
}

#[tokio::test]
async fn test_mock_data_set_is_valid() {
    let store = MemoryStore::mock().unwrap();
    assert!(!store.list_transactions(&TransactionFilter::all()).await.unwrap().is_empty());
    assert!(!store.list_budgets(&BudgetFilter::all()).await.unwrap().is_empty());
    assert_eq!(store.list_categories().await.unwrap().len(), Category::defaults().len());
}

// ── Transactions ──────────────────────────────────────────────

#[tokio::test]
async fn test_transactions_newest_first_and_filtered() {
    let store = MemoryStore::from_seed_json(SEED).unwrap();
    let all = store.list_transactions(&TransactionFilter::all()).await.unwrap();
    let ids: Vec<i64> = all.iter().filter_map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 1, 3]);

    let march = store
        .list_transactions(&TransactionFilter::month(month("2024-03")))
        .await
        .unwrap();
    assert_eq!(march.len(), 2);

    let food_march = store
        .list_transactions(&TransactionFilter::month(month("2024-03")).category("Food & Dining"))
        .await
        .unwrap();
    assert_eq!(food_march.len(), 1);
    assert_eq!(food_march[0].id, Some(2));

    let by_id = store.list_transactions(&TransactionFilter::id(3)).await.unwrap();
    assert_eq!(by_id[0].description, "Lunch");
}

#[tokio::test]
async fn test_transaction_crud() {
    let store = MemoryStore::new();
    let txn = expense("Shopping", dec!(10), ymd(2024, 1, 2));
    let id = store.create_transaction(&txn).await.unwrap();
    assert_eq!(id, 1);

    let mut changed = txn.clone();
    changed.amount = dec!(12.5);
    let updated = store.update_transaction(id, &changed).await.unwrap();
    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.amount, dec!(12.5));

    let deleted = store.delete_transaction(id).await.unwrap();
    assert_eq!(deleted.amount, dec!(12.5));
    assert!(store
        .list_transactions(&TransactionFilter::all())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_transaction_missing_id_is_not_found() {
    let store = MemoryStore::new();
    let txn = expense("Shopping", dec!(10), ymd(2024, 1, 2));
    assert!(matches!(
        store.update_transaction(42, &txn).await,
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        store.delete_transaction(42).await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_invalid_transaction_not_stored() {
    let store = MemoryStore::new();
    let mut txn = expense("Shopping", dec!(10), ymd(2024, 1, 2));
    txn.amount = Decimal::ZERO;
    assert!(store.create_transaction(&txn).await.is_err());
    assert!(store
        .list_transactions(&TransactionFilter::all())
        .await
        .unwrap()
        .is_empty());
}

// ── Budgets ───────────────────────────────────────────────────

#[tokio::test]
async fn test_budget_unique_per_category_month() {
    let store = MemoryStore::new();
    let budget = Budget::new("Travel".into(), month("2024-03"), dec!(100)).unwrap();
    let id = store.create_budget(&budget).await.unwrap();
    assert!(matches!(
        store.create_budget(&budget).await,
        Err(Error::InvalidArgument(_))
    ));

    let next_month = Budget::new("Travel".into(), month("2024-04"), dec!(100)).unwrap();
    let other = store.create_budget(&next_month).await.unwrap();
    assert_ne!(id, other);

    // moving April onto March collides
    assert!(store.update_budget(other, &budget).await.is_err());

    let listed = store
        .list_budgets(&BudgetFilter::month(month("2024-03")))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(store.list_budgets(&BudgetFilter::id(other)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_budget_update_and_delete() {
    let store = MemoryStore::new();
    let budget = Budget::new("Travel".into(), month("2024-03"), dec!(100)).unwrap();
    let id = store.create_budget(&budget).await.unwrap();
    let mut raised = budget.clone();
    raised.monthly_limit = dec!(150);
    assert_eq!(
        store.update_budget(id, &raised).await.unwrap().monthly_limit,
        dec!(150)
    );
    store.delete_budget(id).await.unwrap();
    assert!(matches!(
        store.delete_budget(id).await,
        Err(Error::NotFound { .. })
    ));
}

// ── Goals ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_contributions_accumulate() {
    let store = MemoryStore::new();
    let id = store.create_goal(&goal("Car", dec!(500))).await.unwrap();
    store.add_contribution(id, dec!(100)).await.unwrap();
    let after = store.add_contribution(id, dec!(50.25)).await.unwrap();
    assert_eq!(after.current_amount, dec!(150.25));
}

#[tokio::test]
async fn test_contribution_validation() {
    let store = MemoryStore::new();
    let id = store.create_goal(&goal("Car", dec!(500))).await.unwrap();
    assert!(matches!(
        store.add_contribution(id, Decimal::ZERO).await,
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        store.add_contribution(99, dec!(1)).await,
        Err(Error::NotFound { .. })
    ));
    let goals = store.list_goals().await.unwrap();
    assert_eq!(goals[0].current_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_update_goal_cannot_lower_saved_amount() {
    let store = MemoryStore::new();
    let id = store.create_goal(&goal("Car", dec!(500))).await.unwrap();
    let funded = store.add_contribution(id, dec!(200)).await.unwrap();

    let mut lowered = funded.clone();
    lowered.current_amount = dec!(10);
    assert!(store.update_goal(id, &lowered).await.is_err());

    let mut renamed = funded.clone();
    renamed.name = "New car".into();
    renamed.target_amount = dec!(800);
    let updated = store.update_goal(id, &renamed).await.unwrap();
    assert_eq!(updated.name, "New car");
    assert_eq!(updated.current_amount, dec!(200));
}

#[tokio::test]
async fn test_create_goal_starts_at_zero() {
    let store = MemoryStore::new();
    let mut g = goal("Car", dec!(500));
    g.current_amount = dec!(300);
    let id = store.create_goal(&g).await.unwrap();
    let stored = store.delete_goal(id).await.unwrap();
    assert_eq!(stored.current_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_contribution_overflow_rejected() {
    let store = MemoryStore::new();
    let id = store.create_goal(&goal("Moon", Decimal::MAX)).await.unwrap();
    store.add_contribution(id, Decimal::MAX).await.unwrap();
    assert!(matches!(
        store.add_contribution(id, Decimal::MAX).await,
        Err(Error::InvalidArgument(_))
    ));
    let goals = store.list_goals().await.unwrap();
    assert_eq!(goals[0].current_amount, Decimal::MAX);
}

#[tokio::test]
async fn test_create_goal_rejects_past_deadline() {
    let store = MemoryStore::new();
    let mut g = goal("Car", dec!(500));
    g.deadline = ymd(2000, 1, 1);
    assert!(matches!(
        store.create_goal(&g).await,
        Err(Error::InvalidArgument(_))
    ));
    g.deadline = chrono::Local::now().date_naive();
    assert!(store.create_goal(&g).await.is_err());
    assert!(store.list_goals().await.unwrap().is_empty());
}

// ── Categories ────────────────────────────────────────────────

#[tokio::test]
async fn test_custom_category_lifecycle() {
    let store = MemoryStore::new();
    let pets = Category::new("Pets".into()).unwrap();
    let id = store.create_category(&pets).await.unwrap();
    assert!(store.create_category(&pets).await.is_err());
    assert!(store.get_category("Pets").await.unwrap().unwrap().is_custom);
    store.delete_category(id).await.unwrap();
    assert!(store.get_category("Pets").await.unwrap().is_none());
}

#[tokio::test]
async fn test_builtin_category_cannot_be_deleted() {
    let store = MemoryStore::new();
    let income = store.get_category("Income").await.unwrap().unwrap();
    assert!(matches!(
        store.delete_category(income.id.unwrap()).await,
        Err(Error::NotFound { .. })
    ));
}
