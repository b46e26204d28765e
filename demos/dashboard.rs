use ticketing_client::types::RegistrantQuery;
use ticketing_client::{ConfigLocation, SessionClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Reads TICKETING_API_URL and friends from the environment
    let client = SessionClient::from_location(ConfigLocation::Env)
        .await?
        .on_unauthenticated(|| eprintln!("session expired, sign in again"));

    let me = client.users().me().await?;
    println!("signed in as {} (@{})", me.name, me.username);

    for ticket in client.tickets().list().await? {
        let page = client
            .registrants()
            .by_ticket(&ticket.id, &RegistrantQuery::default())
            .await?;
        println!(
            "{}: {}/{} registered, {} on first page",
            ticket.title,
            ticket.registered_count,
            ticket.quota,
            page.data.len()
        );
    }
    Ok(())
}
