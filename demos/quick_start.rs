/// quick start - one customer, one debt, one installment paid off
use retail_ledger_rs::{
    BackOffice, CustomerDraft, DebtDraft, InstallmentDraft, MemoryStore, Money, SafeTimeProvider,
    TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== quick start example ===\n");

    let time = SafeTimeProvider::new(TimeSource::System);
    let mut office = BackOffice::new(MemoryStore::new());

    // register a customer
    let customer_id = office.add_customer(
        CustomerDraft {
            name: "Karim Hasan".to_string(),
            phone: Some("0770 123 4567".to_string()),
            address: Some("Market street 4".to_string()),
            notes: None,
        },
        &time,
    )?;
    println!("customer registered: {}", customer_id);

    // a one-off debt, due whenever
    office.add_debt(
        DebtDraft {
            customer_id,
            amount: Money::from_major(80),
            description: "Groceries on credit".to_string(),
            due_date: None,
        },
        &time,
    )?;

    // an installment plan settled in three payments
    let installment_id = office.add_installment(
        InstallmentDraft {
            customer_id,
            total_amount: Money::from_major(1_000),
            description: "Washing machine".to_string(),
            start_date: Some(time.now().date_naive()),
        },
        &time,
    )?;

    for amount in [400, 350, 250] {
        office.add_payment(installment_id, Money::from_major(amount), None, &time)?;
        let summary = office.installment_summary(installment_id)?;
        println!(
            "paid {} -> {} remaining ({})",
            amount, summary.totals.remaining, summary.totals.completion
        );
    }

    let summary = office.installment_summary(installment_id)?;
    println!("\ncompleted: {}", summary.totals.completed);

    // one more unit would overpay and is rejected
    let rejected = office.add_payment(installment_id, Money::from_major(1), None, &time);
    println!("extra payment rejected: {}", rejected.unwrap_err());

    let stats = office.customer_statistics(customer_id, &time)?;
    println!(
        "\ncustomer rollup: {} debts open ({}), installments paid {}",
        stats.debts_count, stats.outstanding_debt, stats.installment_paid
    );

    Ok(())
}
