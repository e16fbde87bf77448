//! The `kjappe init` command.

use std::path::Path;

use anyhow::Result;

use kjappe_core::datekey::{canonical_key, local_today};

pub fn execute() -> Result<()> {
    if Path::new("kjappe.toml").exists() {
        println!("kjappe.toml already exists, skipping.");
    } else {
        std::fs::write("kjappe.toml", SAMPLE_CONFIG)?;
        println!("Created kjappe.toml");
    }

    std::fs::create_dir_all("questions")?;
    let example = format!("questions/{}.json", canonical_key(local_today()));
    if Path::new(&example).exists() {
        println!("{example} already exists, skipping.");
    } else {
        std::fs::write(&example, EXAMPLE_QUIZ)?;
        println!("Created {example}");
    }

    println!("\nNext steps:");
    println!("  1. Edit {example} with today's questions");
    println!("  2. Run: kjappe validate");
    println!("  3. Run: kjappe play --offline");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# kjappe configuration

questions_dir = "./questions"
store_path = "./kjappe-store.json"
share_url = "https://www.femkjappe.no"

# Maximum number of typos accepted in an answer.
fuzzy_threshold = 2
questions_per_quiz = 5
request_timeout_secs = 30

# Uncomment to play against a quiz server.
# [server]
# base_url = "${KJAPPE_SERVER_URL}"
"#;

const EXAMPLE_QUIZ: &str = r#"{
  "theme": "Blandet",
  "questions": [
    { "question": "Hvem komponerte Tryllefløyten?", "answer": "Mozart" },
    { "question": "Hva het Oslo før 1925?", "answer": "Kristiania", "aliases": ["Christiania"] },
    { "question": "Hvor mange fylker har Norge fra 2024?", "answer": "15", "aliases": ["femten"] },
    { "question": "Hvem malte Skrik?", "answer": "Edvard Munch", "aliases": ["Munch"] },
    { "question": "Hva er hovedstaden i Island?", "answer": "Reykjavik", "aliases": ["Reykjavík"] }
  ]
}
"#;
