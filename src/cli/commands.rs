use crate::app::{AppContext, Result};
use crate::domain::{Resolution, SelectionResult};
use crate::pricing::select_lowest;
use crate::scraper::{LazySession, PageSession};

pub async fn run(ctx: &AppContext) -> Result<()> {
    if ctx.config.test_mode {
        println!("Test mode: synthetic quotes, writing to {}", ctx.config.sheets.test_sheet);
    } else if ctx.credentials.api_key()?.is_none() {
        println!(
            "No product API key in {}, every link will be scraped",
            ctx.credentials.path().display()
        );
    }

    let summary = ctx.run().await?;

    println!(
        "Priced {} groups ({} links): {} winners, {} blank rows",
        summary.groups,
        summary.links,
        summary.winners,
        summary.groups - summary.winners
    );
    Ok(())
}

pub async fn resolve(ctx: &AppContext, links: &[String]) -> Result<()> {
    let mut session = LazySession::new(ctx.launcher.clone());

    let mut resolutions = Vec::with_capacity(links.len());
    let mut failure = None;
    for link in links {
        match ctx.resolver.resolve(&mut session, link).await {
            Ok(resolution) => resolutions.push(resolution),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
        if let Some(e) = session.take_launch_error() {
            failure = Some(e);
            break;
        }
    }

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }
    if let Some(e) = failure {
        return Err(e);
    }

    for resolution in &resolutions {
        match resolution {
            Resolution::Priced(price) => {
                println!("{:>10.2}  {}", price.effective_price, resolution.link())
            }
            Resolution::Unpriced { reason, .. } => {
                println!("{:>10}  {} ({})", "-", resolution.link(), reason)
            }
            Resolution::Unresolvable { .. } => {
                println!("{:>10}  {} (no product id)", "-", resolution.link())
            }
        }
    }

    match select_lowest("", &resolutions) {
        SelectionResult::Winner {
            winning_link, price, ..
        } => println!("Lowest: {:.2} at {}", price, winning_link),
        SelectionResult::NoWinner => println!("No link could be priced"),
    }
    Ok(())
}

pub fn authorize(ctx: &AppContext, refresh_token: &str) -> Result<()> {
    ctx.tokens.save(&ctx.credentials, refresh_token)?;
    println!("Saved authorization to {}", ctx.tokens.path().display());
    Ok(())
}
