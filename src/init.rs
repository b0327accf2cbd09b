//! Project initialization for tablero
//!
//! `tablero init` creates .tablero/ with a config file and a local SQLite
//! database seeded with the sample rows, so `tablero serve` works right away.

use crate::dataset::sample_records;
use crate::db::Database;
use colored::Colorize;
use std::fs;
use std::path::Path;

const CONFIG_TOML: &str = r#"# tablero configuration
# Environment variables (DATABASE_URL, DB_HOST, DB_USER, DB_PASSWORD, DB_NAME,
# PORT, DEBUG, RENDER, TABLERO_FIXTURE) override anything set here.

[source]
# Table holding analisis, total_po, ciudad, aliado, region
table = "mi_tabla"

[fallback]
# JSON array of row objects tried when the database cannot be read
# fixture = "backup.json"
use_sample = true

[server]
host = "0.0.0.0"
port = 8050
"#;

const LOCAL_DB: &str = "mi_base_de_datos.db";

/// Initialize tablero in `dir`
pub fn init_project(dir: &Path) -> Result<(), String> {
    println!("\n{}", "Initializing tablero...".cyan().bold());
    println!("   Directory: {}\n", dir.display());

    // 1. Create .tablero directory
    let tablero_dir = dir.join(".tablero");
    create_dir_if_missing(&tablero_dir)?;

    // 2. Write config.toml
    let config_path = tablero_dir.join("config.toml");
    write_file_if_missing(&config_path, CONFIG_TOML, ".tablero/config.toml")?;

    // 3. Seed the local database
    let db_path = tablero_dir.join(LOCAL_DB);
    if db_path.exists() {
        println!("   {} .tablero/{} (already exists)", "Skipping".yellow(), LOCAL_DB);
    } else {
        let db = Database::create(&db_path).map_err(|e| e.to_string())?;
        let rows = db
            .seed_table("mi_tabla", &sample_records())
            .map_err(|e| e.to_string())?;
        println!("   {} .tablero/{} ({} sample rows)", "Creating".green(), LOCAL_DB, rows);
    }

    // 4. Keep the local database out of git
    add_to_gitignore(dir)?;

    println!("\n{}", "tablero initialized!".green().bold());
    println!("\nNext steps:");
    println!("  1. Run {} to open the dashboard", "tablero serve".cyan());
    println!("  2. Point {} at your own database when ready", "DATABASE_URL".cyan());
    println!();

    Ok(())
}

fn create_dir_if_missing(path: &Path) -> Result<(), String> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Could not create {}: {}", path.display(), e))?;
        println!("   {} {}", "Creating".green(), path.display());
    }
    Ok(())
}

fn write_file_if_missing(path: &Path, content: &str, display_name: &str) -> Result<(), String> {
    if path.exists() {
        println!("   {} {} (already exists)", "Skipping".yellow(), display_name);
    } else {
        fs::write(path, content)
            .map_err(|e| format!("Could not write {}: {}", display_name, e))?;
        println!("   {} {}", "Creating".green(), display_name);
    }
    Ok(())
}

fn add_to_gitignore(dir: &Path) -> Result<(), String> {
    let gitignore_path = dir.join(".gitignore");
    let entry = ".tablero/";

    if gitignore_path.exists() {
        let existing = fs::read_to_string(&gitignore_path)
            .map_err(|e| format!("Could not read .gitignore: {}", e))?;

        if existing.lines().any(|line| line.trim() == entry || line.trim() == ".tablero") {
            return Ok(());
        }

        let new_content = format!("{}\n\n# tablero local data\n{}\n", existing.trim_end(), entry);
        fs::write(&gitignore_path, new_content)
            .map_err(|e| format!("Could not update .gitignore: {}", e))?;
        println!("   {} .gitignore (added .tablero/)", "Updated".green());
    } else {
        let content = format!("# tablero local data\n{}\n", entry);
        fs::write(&gitignore_path, content)
            .map_err(|e| format!("Could not create .gitignore: {}", e))?;
        println!("   {} .gitignore", "Creating".green());
    }

    Ok(())
}
