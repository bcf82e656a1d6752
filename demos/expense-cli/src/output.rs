//! Styled terminal output

use console::style;
use expensevista_client::{Category, Dashboard, FinancialReport, Transaction, UserProfile};

pub fn display_signed_in(user: &UserProfile) {
    println!(
        "{} {}",
        style("Signed in as").dim(),
        style(user.display_name()).cyan().bold()
    );
}

pub fn display_dashboard(dashboard: &Dashboard) {
    let budget = &dashboard.budget;
    println!("{}", style("Monthly budget").bold());
    println!("  limit      {:>12.2}", budget.monthly_limit);
    println!("  used       {:>12.2}", budget.current_usage);
    println!("  remaining  {:>12.2}", budget.remaining_amount);

    let used = format!("{:.1}%", budget.percentage_used);
    let used = if budget.percentage_used >= 100.0 {
        style(used).red().bold()
    } else if budget.percentage_used >= 80.0 {
        style(used).yellow()
    } else {
        style(used).green()
    };
    println!("  progress   {used:>12}");
}

pub fn display_transaction(transaction: &Transaction) {
    println!(
        "{:<12} {:>10} {:<8} {:<16} {}",
        transaction.transaction_date.get(..10).unwrap_or(&transaction.transaction_date),
        transaction.amount,
        format!("{:?}", transaction.kind),
        style(&transaction.category.name).cyan(),
        transaction.description.as_deref().unwrap_or("")
    );
}

pub fn display_categories(categories: &[Category]) {
    for category in categories {
        println!("{:>6}  {}", style(category.id).dim(), category.name);
    }
}

pub fn display_report(report: &FinancialReport) {
    println!(
        "{} {}",
        style("Report").bold(),
        style(report.time_period.as_str()).cyan()
    );
    for category in &report.spending_by_category {
        println!(
            "  {:<16} {:>10.2} {:>6.1}%",
            category.name, category.value, category.percentage
        );
    }
    println!(
        "  top spending: {} ({:.2})",
        report.key_insights.top_spending_category, report.key_insights.top_spending_amount
    );
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("error:").red().bold(), message);
}
