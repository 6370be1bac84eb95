// resources.rs — List the subscription catalog.

use sg_policy::PolicyEngine;

pub fn execute(engine: &PolicyEngine) -> anyhow::Result<()> {
    let catalog = engine.store().snapshot().catalog.clone();
    if catalog.is_empty() {
        println!("No subscriptions in the catalog (is the policy file present?).");
        return Ok(());
    }

    println!("{:<10} {:<24} {:<12} {:>10}", "ID", "NAME", "CATEGORY", "AMOUNT");
    for resource in catalog {
        println!(
            "{:<10} {:<24} {:<12} {:>10}",
            resource.id, resource.name, resource.category, resource.amount
        );
    }
    Ok(())
}
