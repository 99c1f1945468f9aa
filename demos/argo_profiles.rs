use anyhow::Result;
use argovis::{Client, QueryOptions, data_inflate, units_inflate};
use serde_json::json;

fn main() -> Result<()> {
    // Demo program that calls the library API.
    // Configure the endpoint via ARGOVIS_API_URL / ARGOVIS_API_KEY.
    let client = Client::from_env()?;

    let mut options = QueryOptions::new();
    options.insert("startDate".to_string(), json!("2023-01-01T00:00:00Z"));
    options.insert("endDate".to_string(), json!("2023-01-10T00:00:00Z"));
    options.insert(
        "polygon".to_string(),
        json!([[-34, 16], [-34, 18], [-36, 18], [-36, 16], [-34, 16]]),
    );
    options.insert("data".to_string(), json!("temperature"));

    let profiles = client.query("argo", &options)?;
    println!("{} profile(s)", profiles.len());

    if let Some(profile) = profiles.first() {
        let units = units_inflate(profile, None)?;
        println!("units: {}", serde_json::to_string(&units)?);

        let levels = data_inflate(profile, None)?;
        for level in levels.iter().take(5) {
            println!("{}", serde_json::to_string(level)?);
        }
    }
    Ok(())
}
