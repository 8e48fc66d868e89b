use jornada::{EconomyStore, JsonFileStore, thousands};

pub(super) fn run_users(store: &JsonFileStore) -> Result<(), String> {
    let ledger = store.load_all().map_err(|e| e.to_string())?;
    if ledger.is_empty() {
        println!("No registered users.");
        return Ok(());
    }

    let mut users: Vec<_> = ledger.users.values().collect();
    users.sort_by(|a, b| b.balance.cmp(&a.balance).then_with(|| a.id.cmp(&b.id)));
    for user in users {
        println!(
            "{} | {} | ${} | {} | {} pet(s)",
            user.id,
            user.display_name,
            thousands(user.balance),
            user.rank,
            user.pets.len()
        );
    }
    Ok(())
}

pub(super) fn run_show(store: &JsonFileStore, id: &str) -> Result<(), String> {
    let user = store
        .get(id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("user {} not found", id))?;
    let json = serde_json::to_string_pretty(&user).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}
