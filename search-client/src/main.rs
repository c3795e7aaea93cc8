use std::{env, error::Error, process};

use search_client::SearchClient;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);

    let query = args.next().unwrap_or_else(|| {
        eprintln!("error: no search query provided");
        process::exit(1);
    });

    let num_results = match args.next() {
        Some(count) => count.parse::<u32>().unwrap_or_else(|_| {
            eprintln!("error: invalid result count");
            process::exit(1);
        }),
        None => 10,
    };

    let api_key = env::var("GOOGLE_API_KEY").unwrap_or_else(|_| {
        eprintln!("error: GOOGLE_API_KEY is not set");
        process::exit(1);
    });

    let engine_id = env::var("GOOGLE_SEARCH_ENGINE_ID").unwrap_or_else(|_| {
        eprintln!("error: GOOGLE_SEARCH_ENGINE_ID is not set");
        process::exit(1);
    });

    let client = SearchClient::new(api_key, engine_id);
    let outcome = client.search(&query, num_results)?;

    for (i, url) in outcome.urls.iter().enumerate() {
        println!("{}. {}", i + 1, url);
    }

    println!(
        "search completed in {} milliseconds",
        outcome.elapsed.as_millis()
    );

    Ok(())
}
