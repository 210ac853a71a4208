/// time control - derived status under a controlled clock
use retail_ledger_rs::chrono::{Duration, NaiveDate, TimeZone, Utc};
use retail_ledger_rs::{
    BackOffice, CustomerDraft, DebtDraft, MemoryStore, Money, SafeTimeProvider, SubscriptionDraft,
    TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    // controlled clock starting on new year's day
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    ));
    let control = time.test_control().unwrap();

    let mut office = BackOffice::new(MemoryStore::new());
    let customer_id = office.add_customer(
        CustomerDraft {
            name: "Zahra".to_string(),
            ..Default::default()
        },
        &time,
    )?;

    // debt due at the end of january
    let debt_id = office.add_debt(
        DebtDraft {
            customer_id,
            amount: Money::from_major(120),
            description: "Spare parts".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 31),
        },
        &time,
    )?;

    // subscription running through june
    let subscription_id = office.add_subscription(
        SubscriptionDraft {
            customer_id,
            plan_name: "Fiber 50".to_string(),
            monthly_fee: Money::from_major(25),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
        },
        &time,
    )?;

    println!("on {}:", time.now().format("%Y-%m-%d"));
    println!("  debt: {:?}", office.debt_status(debt_id, &time)?);
    println!(
        "  subscription: {:?}",
        office.subscription_status(subscription_id, &time)?
    );

    // no data changes from here on, only the clock moves
    control.advance(Duration::days(45));
    println!("\non {}:", time.now().format("%Y-%m-%d"));
    println!("  debt: {:?}", office.debt_status(debt_id, &time)?);
    println!(
        "  subscription: {:?}",
        office.subscription_status(subscription_id, &time)?
    );

    control.advance(Duration::days(150));
    println!("\non {}:", time.now().format("%Y-%m-%d"));
    println!("  debt: {:?}", office.debt_status(debt_id, &time)?);
    println!(
        "  subscription: {:?}",
        office.subscription_status(subscription_id, &time)?
    );

    println!("\noverdue debts now: {}", office.overdue_debts(&time)?.len());
    println!(
        "expired subscriptions now: {}",
        office.expired_subscriptions(&time)?.len()
    );

    Ok(())
}
