use uno_pinterest::{AnalyticsParams, Client, Granularity, ListParams};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new()?;
    let ad_accounts = client.ad_accounts();

    let accounts = ad_accounts.list(ListParams::default()).await?;
    let Some(account) = accounts.iter().next() else {
        println!("no ad accounts visible to this token");
        return Ok(());
    };
    let account_id = account.id().unwrap_or_default();
    println!(
        "[account] {} ({})",
        account.get_str("name").unwrap_or("<unnamed>"),
        account_id
    );

    let mut page = ad_accounts
        .campaigns(account_id, ListParams::builder().page_size(25).build())
        .await?;
    loop {
        for campaign in &page {
            println!(
                "  [campaign] {} {}",
                campaign.id().unwrap_or_default(),
                campaign.get_str("status").unwrap_or("?")
            );
        }
        if !page.has_more() {
            break;
        }
        page = page.fetch_next().await?;
    }

    let stats = ad_accounts
        .analytics(
            account_id,
            AnalyticsParams::builder()
                .start_date("2024-01-01")
                .end_date("2024-01-07")
                .columns(vec!["SPEND_IN_DOLLAR".to_string(), "TOTAL_IMPRESSION".to_string()])
                .granularity(Granularity::Day)
                .build(),
        )
        .await?;
    for row in &stats {
        println!("  [analytics] {}", serde_json::to_string(row)?);
    }

    Ok(())
}
