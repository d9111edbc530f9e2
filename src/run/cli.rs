use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use fintrack::config::Config;
use fintrack::models::{Budget, Category, Priority, SavingsGoal, Transaction, TransactionType};
use fintrack::overview;
use fintrack::present::{
    breakdown_shares, dashboard_cards, format_amount, format_axis_thousands, format_date,
    format_percentage, goal_remaining_label, priority_color, progress_bar, progress_percentage,
    remaining_label, truncate, BreakdownInsights, BudgetStatus, Deadline, TrendInsights,
};
use fintrack::store::{BudgetFilter, TransactionFilter};
use fintrack::{MonthKey, RecordStore, RecordWriter};

const RULE_WIDTH: usize = 56;
const BAR_WIDTH: usize = 20;

pub(crate) async fn as_cli<S>(args: &[String], store: &S, config: &Config) -> Result<()>
where
    S: RecordStore + RecordWriter,
{
    let Some(command) = args.get(1) else {
        return cli_summary(&[], store).await;
    };
    let rest = &args[2..];
    match command.as_str() {
        "summary" | "s" => cli_summary(rest, store).await,
        "transactions" | "t" => cli_transactions(rest, store).await,
        "budgets" | "b" => cli_budgets(rest, store).await,
        "charts" | "c" => cli_charts(rest, store, config.trend_months).await,
        "goals" | "g" => cli_goals(store).await,
        "categories" => cli_categories(store).await,
        "add" => cli_add(rest, store).await,
        "edit" => cli_edit(rest, store).await,
        "delete" => cli_delete(rest, store).await,
        "budget" => cli_budget(rest, store).await,
        "set-budget" => cli_set_budget(rest, store).await,
        "delete-budget" => cli_delete_budget(rest, store).await,
        "goal" => cli_goal(rest, store).await,
        "edit-goal" => cli_edit_goal(rest, store).await,
        "delete-goal" => cli_delete_goal(rest, store).await,
        "contribute" => cli_contribute(rest, store).await,
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack - personal finance tracker");
    println!();
    println!("Usage: fintrack [command]");
    println!();
    println!("Commands:");
    println!("  summary, s [YYYY-MM]               Dashboard for a month (default)");
    println!("  transactions, t [YYYY-MM]          Month transactions with running balance");
    println!("  budgets, b [YYYY-MM]               Budget usage for a month");
    println!("  charts, c [YYYY-MM]                Spending breakdown and income/expense trend");
    println!("  goals, g                           Savings goals by priority");
    println!("  categories                         List categories");
    println!("  add <income|expense> <amount> <category> <description...>");
    println!("    --date <YYYY-MM-DD>              Transaction date (default: today)");
    println!("    --notes <text>                   Optional notes");
    println!("  edit <id>                          Change a transaction");
    println!("    --type, --amount, --category, --description, --date, --notes");
    println!("  delete <id>                        Delete a transaction");
    println!("  budget <category> <limit>          Set a monthly budget");
    println!("    --month <YYYY-MM>                Budget month (default: current)");
    println!("  set-budget <id> <limit>            Change a budget's monthly limit");
    println!("  delete-budget <id>                 Delete a budget");
    println!("  goal <name> <target> <YYYY-MM-DD>  Create a savings goal");
    println!("    --priority <high|medium|low>     Goal priority (default: medium)");
    println!("  edit-goal <id>                     Change a savings goal");
    println!("    --name, --target, --deadline, --priority");
    println!("  delete-goal <id>                   Delete a savings goal");
    println!("  contribute <goal-id> <amount>      Add money to a savings goal");
    println!("  --help, -h                         Show this help");
    println!("  --version, -V                      Show version");
    println!();
    println!("Environment: FINTRACK_DB, FINTRACK_STORE (sqlite|memory), FINTRACK_LOG,");
    println!("             FINTRACK_TREND_MONTHS");
}

// ── Argument helpers ─────────────────────────────────────────

const VALUE_FLAGS: &[&str] = &[
    "--date",
    "--notes",
    "--month",
    "--priority",
    "--type",
    "--amount",
    "--category",
    "--description",
    "--name",
    "--target",
    "--deadline",
];

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither a flag nor a flag's value.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
        } else if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn month_arg(args: &[String]) -> Result<MonthKey> {
    match positionals(args).first() {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(MonthKey::current()),
    }
}

/// Accepts `1234.5`, `$1,234.50`.
fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(&cleaned).with_context(|| format!("Invalid amount: {raw}"))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{raw}'. Use YYYY-MM-DD"))
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .with_context(|| format!("Invalid id: {raw}"))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

async fn resolve_category<S: RecordStore>(store: &S, name: &str) -> Result<Category> {
    if let Some(found) = store.get_category(name).await? {
        return Ok(found);
    }
    let names: Vec<String> = store
        .list_categories()
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    anyhow::bail!(
        "Category '{name}' not found. Available: {}",
        names.join(", ")
    )
}

// ── Views ────────────────────────────────────────────────────

async fn cli_summary<S: RecordStore>(args: &[String], store: &S) -> Result<()> {
    let month = month_arg(args)?;
    let dash = overview::dashboard(store, month).await?;

    println!("fintrack - {}", month.long_label());
    println!("{}", "─".repeat(RULE_WIDTH));
    for card in dashboard_cards(&dash.totals, dash.health, &dash.goals) {
        match &card.trend {
            Some((trend, compact)) => println!(
                "  {:<20} {:>16}  {} {compact}",
                card.title,
                card.value,
                trend.arrow()
            ),
            None => println!("  {:<20} {:>16}", card.title, card.value),
        }
    }

    if dash.budget.categories > 0 {
        let status = BudgetStatus::from_percentage(dash.budget.percentage);
        println!();
        println!(
            "Budgets: {} of {} ({}) - {}",
            format_amount(dash.budget.total_spent),
            format_amount(dash.budget.total_budget),
            format_percentage(dash.budget.percentage, 1),
            status.label()
        );
    }

    if !dash.recent.is_empty() {
        println!();
        println!("Recent Transactions:");
        for txn in &dash.recent {
            println!(
                "  {:<13} {:<28} {:>14}",
                format_date(txn.date),
                truncate(&txn.description, 28),
                format_amount(txn.signed_amount())
            );
        }
    }
    Ok(())
}

async fn cli_transactions<S: RecordStore>(args: &[String], store: &S) -> Result<()> {
    let month = month_arg(args)?;
    let view = overview::transactions(store, month).await?;
    if view.transactions.is_empty() {
        println!("No transactions for {}", month.long_label());
        return Ok(());
    }

    println!(
        "{:<5} {:<13} {:<24} {:<18} {:>12} {:>12}",
        "ID", "Date", "Description", "Category", "Amount", "Balance"
    );
    println!("{}", "─".repeat(89));
    for row in view.rows() {
        let txn = row.transaction;
        println!(
            "{:<5} {:<13} {:<24} {:<18} {:>12} {:>12}",
            txn.id.unwrap_or(0),
            format_date(txn.date),
            truncate(&txn.description, 24),
            truncate(&txn.category, 18),
            format_amount(txn.signed_amount()),
            format_amount(row.running_balance)
        );
    }
    println!();
    println!(
        "Income {}  Expenses {}  Net {}",
        format_amount(view.totals.income),
        format_amount(view.totals.expenses),
        format_amount(view.totals.balance)
    );
    Ok(())
}

async fn cli_budgets<S: RecordStore>(args: &[String], store: &S) -> Result<()> {
    let month = month_arg(args)?;
    let view = overview::budgets(store, month).await?;
    if view.budgets.is_empty() {
        println!("No budgets for {}", month.long_label());
        return Ok(());
    }

    println!("Budgets - {}", month.long_label());
    println!("{}", "─".repeat(RULE_WIDTH));
    for (budget, usage) in &view.budgets {
        let status = BudgetStatus::from_percentage(usage.percentage);
        println!(
            "  {:<20} {} / {}",
            budget.category,
            format_amount(budget.spent),
            format_amount(budget.monthly_limit)
        );
        println!(
            "  {} {:>7}  {}  ({})",
            progress_bar(progress_percentage(budget.spent, budget.monthly_limit), BAR_WIDTH),
            format_percentage(usage.percentage, 1),
            remaining_label(usage.remaining),
            status.label()
        );
    }
    println!("{}", "─".repeat(RULE_WIDTH));
    println!(
        "  Total: {} of {} ({})  {}",
        format_amount(view.summary.total_spent),
        format_amount(view.summary.total_budget),
        format_percentage(view.summary.percentage, 1),
        remaining_label(view.summary.remaining)
    );
    Ok(())
}

async fn cli_charts<S: RecordStore>(args: &[String], store: &S, months: usize) -> Result<()> {
    let month = month_arg(args)?;
    let view = overview::charts(store, month, months).await?;

    println!("Spending by Category - {}", month.long_label());
    println!("{}", "─".repeat(RULE_WIDTH));
    match BreakdownInsights::from_breakdown(&view.breakdown) {
        Some(insights) => {
            for ((name, share), entry) in breakdown_shares(&view.breakdown)
                .into_iter()
                .zip(&view.breakdown)
            {
                println!(
                    "  {:<20} {} {:>12} {:>7}",
                    truncate(&name, 20),
                    progress_bar(share, BAR_WIDTH),
                    format_amount(entry.amount),
                    format_percentage(share, 1)
                );
            }
            println!();
            println!("  Highest spending:  {}", insights.highest_category);
            println!("  Largest expense:   {}", format_amount(insights.largest_expense));
            println!("  Active categories: {}", insights.active_categories);
        }
        None => println!("  No expenses this month"),
    }

    println!();
    println!("Income vs Expenses");
    println!("{}", "─".repeat(RULE_WIDTH));
    for point in &view.trend {
        println!(
            "  {:<8} in {:>8}  out {:>8}  net {:>12}",
            point.month.short_label(),
            format_axis_thousands(point.income),
            format_axis_thousands(point.expenses),
            format_amount(point.net)
        );
    }
    if let Some(insights) = TrendInsights::from_trend(&view.trend) {
        println!();
        println!("  Highest income:   {}", format_amount(insights.highest_income));
        println!("  Highest expenses: {}", format_amount(insights.highest_expenses));
    }
    Ok(())
}

async fn cli_goals<S: RecordStore>(store: &S) -> Result<()> {
    let view = overview::goals(store).await?;
    if view.goals.is_empty() {
        println!("No savings goals");
        return Ok(());
    }

    let today = today();
    println!("Savings Goals");
    println!("{}", "─".repeat(RULE_WIDTH));
    for (goal, progress) in &view.goals {
        println!(
            "  #{:<3} {:<24} {:<6} {}",
            goal.id.unwrap_or(0),
            truncate(&goal.name, 24),
            goal.priority.as_str(),
            priority_color(goal.priority)
        );
        println!(
            "       {} {:>7}  {} of {}",
            progress_bar(progress_percentage(goal.current_amount, goal.target_amount), BAR_WIDTH),
            format_percentage(progress.percentage.min(Decimal::ONE_HUNDRED), 1),
            format_amount(goal.current_amount),
            format_amount(goal.target_amount)
        );
        let deadline = if progress.completed {
            String::new()
        } else {
            format!("  ({})", Deadline::until(goal.deadline, today))
        };
        println!(
            "       {}  due {}{deadline}",
            goal_remaining_label(progress),
            format_date(goal.deadline)
        );
    }
    println!("{}", "─".repeat(RULE_WIDTH));
    println!(
        "  Saved {} of {} ({})  {} active, {} completed",
        format_amount(view.summary.total_current_amount),
        format_amount(view.summary.total_target_amount),
        format_percentage(view.summary.overall_progress, 1),
        view.summary.active_goals_count,
        view.summary.completed_goals_count
    );
    Ok(())
}

async fn cli_categories<S: RecordStore>(store: &S) -> Result<()> {
    let categories = store.list_categories().await?;
    println!("{:<4} {:<22} {:<9} Kind", "ID", "Name", "Color");
    println!("{}", "─".repeat(45));
    for cat in &categories {
        let kind = if cat.is_income() {
            "income"
        } else if cat.is_custom {
            "custom"
        } else {
            "built-in"
        };
        println!(
            "{:<4} {:<22} {:<9} {kind}",
            cat.id.unwrap_or(0),
            cat.name,
            cat.color
        );
    }
    Ok(())
}

// ── Mutations ────────────────────────────────────────────────

async fn cli_add<S: RecordStore + RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let pos = positionals(args);
    if pos.len() < 4 {
        anyhow::bail!(
            "Usage: fintrack add <income|expense> <amount> <category> <description...> [--date YYYY-MM-DD] [--notes text]"
        );
    }

    let kind = TransactionType::parse(pos[0])?;
    let amount = parse_amount(pos[1])?;
    let category = resolve_category(store, pos[2]).await?;
    let description = pos[3..].join(" ");
    let date = match flag(args, "--date") {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };

    if kind == TransactionType::Income && !category.is_income() {
        tracing::warn!(category = %category.name, "income recorded under an expense category");
    }

    let mut txn = Transaction::new(kind, amount, date, category.name, description)?;
    if let Some(notes) = flag(args, "--notes") {
        txn = txn.with_notes(notes);
    }
    let id = store.create_transaction(&txn).await?;
    println!(
        "Added #{id}: {} {} on {} ({})",
        txn.kind,
        format_amount(txn.amount),
        format_date(txn.date),
        txn.category
    );
    Ok(())
}

async fn cli_edit<S: RecordStore + RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let Some(raw) = positionals(args).first().copied() else {
        anyhow::bail!(
            "Usage: fintrack edit <id> [--type T] [--amount A] [--category C] [--description D] [--date YYYY-MM-DD] [--notes N]"
        );
    };
    let id = parse_id(raw)?;
    if !args.iter().any(|a| VALUE_FLAGS.contains(&a.as_str())) {
        anyhow::bail!("Nothing to change for transaction #{id}");
    }
    let Some(mut txn) = store
        .list_transactions(&TransactionFilter::id(id))
        .await?
        .into_iter()
        .next()
    else {
        anyhow::bail!("Transaction #{id} not found");
    };

    if let Some(raw) = flag(args, "--type") {
        txn.kind = TransactionType::parse(raw)?;
    }
    if let Some(raw) = flag(args, "--amount") {
        txn.amount = parse_amount(raw)?;
    }
    if let Some(raw) = flag(args, "--category") {
        txn.category = resolve_category(store, raw).await?.name;
    }
    if let Some(description) = flag(args, "--description") {
        txn.description = description.to_string();
    }
    if let Some(raw) = flag(args, "--date") {
        txn.date = parse_date(raw)?;
    }
    if let Some(notes) = flag(args, "--notes") {
        txn = txn.with_notes(notes);
    }

    let updated = store.update_transaction(id, &txn).await?;
    println!(
        "Updated #{id}: {} {} on {} ({})",
        updated.kind,
        format_amount(updated.amount),
        format_date(updated.date),
        updated.category
    );
    Ok(())
}

async fn cli_delete<S: RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let Some(raw) = positionals(args).first().copied() else {
        anyhow::bail!("Usage: fintrack delete <id>");
    };
    let removed = store.delete_transaction(parse_id(raw)?).await?;
    println!(
        "Deleted #{}: {} {}",
        removed.id.unwrap_or(0),
        removed.description,
        format_amount(removed.signed_amount())
    );
    Ok(())
}

async fn cli_budget<S: RecordStore + RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let pos = positionals(args);
    if pos.len() < 2 {
        anyhow::bail!("Usage: fintrack budget <category> <limit> [--month YYYY-MM]");
    }

    let category = resolve_category(store, pos[0]).await?;
    if category.is_income() {
        anyhow::bail!("Budgets apply to expense categories, not {}", category.name);
    }
    let limit = parse_amount(pos[1])?;
    let month = match flag(args, "--month") {
        Some(raw) => raw.parse()?,
        None => MonthKey::current(),
    };

    let budget = Budget::new(category.name, month, limit)?;
    let id = store.create_budget(&budget).await?;
    println!(
        "Budget #{id}: {} {} for {}",
        budget.category,
        format_amount(budget.monthly_limit),
        month.long_label()
    );
    Ok(())
}

async fn cli_set_budget<S: RecordStore + RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let pos = positionals(args);
    if pos.len() < 2 {
        anyhow::bail!("Usage: fintrack set-budget <id> <limit>");
    }

    let id = parse_id(pos[0])?;
    let Some(mut budget) = store
        .list_budgets(&BudgetFilter::id(id))
        .await?
        .into_iter()
        .next()
    else {
        anyhow::bail!("Budget #{id} not found");
    };
    budget.monthly_limit = parse_amount(pos[1])?;
    let updated = store.update_budget(id, &budget).await?;
    println!(
        "Budget #{id}: {} {} for {}",
        updated.category,
        format_amount(updated.monthly_limit),
        updated.month.long_label()
    );
    Ok(())
}

async fn cli_delete_budget<S: RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let Some(raw) = positionals(args).first().copied() else {
        anyhow::bail!("Usage: fintrack delete-budget <id>");
    };
    let removed = store.delete_budget(parse_id(raw)?).await?;
    println!(
        "Deleted budget #{}: {} for {}",
        removed.id.unwrap_or(0),
        removed.category,
        removed.month.long_label()
    );
    Ok(())
}

async fn cli_goal<S: RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let pos = positionals(args);
    if pos.len() < 3 {
        anyhow::bail!(
            "Usage: fintrack goal <name> <target> <YYYY-MM-DD> [--priority high|medium|low]"
        );
    }

    let target = parse_amount(pos[1])?;
    let deadline = parse_date(pos[2])?;
    let priority = match flag(args, "--priority") {
        Some(raw) => Priority::parse(raw)?,
        None => Priority::Medium,
    };

    let goal = SavingsGoal::new(pos[0].to_string(), target, deadline, priority)?;
    let id = store.create_goal(&goal).await?;
    println!(
        "Goal #{id}: {} {} by {} ({} priority)",
        goal.name,
        format_amount(goal.target_amount),
        format_date(goal.deadline),
        goal.priority
    );
    Ok(())
}

async fn cli_edit_goal<S: RecordStore + RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let Some(raw) = positionals(args).first().copied() else {
        anyhow::bail!(
            "Usage: fintrack edit-goal <id> [--name N] [--target T] [--deadline YYYY-MM-DD] [--priority P]"
        );
    };
    let id = parse_id(raw)?;
    let Some(mut goal) = store
        .list_goals()
        .await?
        .into_iter()
        .find(|g| g.id == Some(id))
    else {
        anyhow::bail!("Savings goal #{id} not found");
    };

    if let Some(name) = flag(args, "--name") {
        goal.name = name.to_string();
    }
    if let Some(raw) = flag(args, "--target") {
        goal.target_amount = parse_amount(raw)?;
    }
    if let Some(raw) = flag(args, "--deadline") {
        goal.deadline = parse_date(raw)?;
        goal.validate_deadline(today())?;
    }
    if let Some(raw) = flag(args, "--priority") {
        goal.priority = Priority::parse(raw)?;
    }

    let updated = store.update_goal(id, &goal).await?;
    println!(
        "Goal #{id}: {} {} by {} ({} priority)",
        updated.name,
        format_amount(updated.target_amount),
        format_date(updated.deadline),
        updated.priority
    );
    Ok(())
}

async fn cli_delete_goal<S: RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let Some(raw) = positionals(args).first().copied() else {
        anyhow::bail!("Usage: fintrack delete-goal <id>");
    };
    let removed = store.delete_goal(parse_id(raw)?).await?;
    println!(
        "Deleted goal #{}: {} ({} saved)",
        removed.id.unwrap_or(0),
        removed.name,
        format_amount(removed.current_amount)
    );
    Ok(())
}

async fn cli_contribute<S: RecordWriter>(args: &[String], store: &S) -> Result<()> {
    let pos = positionals(args);
    if pos.len() < 2 {
        anyhow::bail!("Usage: fintrack contribute <goal-id> <amount>");
    }

    let amount = parse_amount(pos[1])?;
    let goal = store.add_contribution(parse_id(pos[0])?, amount).await?;
    println!(
        "Added {} to {}: {} of {}",
        format_amount(amount),
        goal.name,
        format_amount(goal.current_amount),
        format_amount(goal.target_amount)
    );
    if goal.is_completed() {
        println!("Goal Achieved!");
    }
    Ok(())
}
