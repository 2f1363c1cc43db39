//! Status command implementation

use std::path::Path;

use anyhow::Result;

use super::open_db;

pub fn cmd_status(db_path: &Path) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 SpendWise Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());

    if !db_path.exists() {
        println!("   Size: (database not initialized)");
        println!();
        println!("   Run 'spendwise init' to create it.");
        println!();
        return Ok(());
    }

    if let Ok(metadata) = fs::metadata(db_path) {
        let size_kb = metadata.len() as f64 / 1024.0;
        if size_kb < 1024.0 {
            println!("   Size: {:.1} KB", size_kb);
        } else {
            println!("   Size: {:.1} MB", size_kb / 1024.0);
        }
    }

    match open_db(db_path) {
        Ok(db) => {
            println!();
            println!("   Users: {}", db.count_users()?);
            println!("   Categories: {}", db.count_categories()?);
            println!("   Expenses: {}", db.count_all_expenses()?);
            println!("   Budgets: {}", db.count_budgets()?);
            println!("   Goals: {}", db.count_goals()?);
        }
        Err(e) => {
            println!();
            println!("   ❌ Error opening database: {}", e);
        }
    }

    println!();
    Ok(())
}
