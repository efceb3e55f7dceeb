pub mod config;
pub mod sound;
pub mod stats;
pub mod timer;

/// Calendar day completions are credited to.
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
