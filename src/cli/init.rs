use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>, party_a: Option<String>, party_b: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(name) = party_a {
        settings.party_a_name = name;
    }
    if let Some(name) = party_b {
        settings.party_b_name = name;
    }

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;

    let conn = get_connection(&resolved.join("splitbook.db"))?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Initialized splitbook at {}", resolved.display());
    println!(
        "Parties: {} (A) and {} (B)",
        settings.party_a_name, settings.party_b_name
    );
    println!();
    println!("Record your first expense:");
    println!("  splitbook add 52.10 --payer A --category groceries");
    Ok(())
}
