use crate::domain::{ResolvedPrice, Resolution, SelectionResult};

/// Pick the cheapest priced link of a group.
///
/// Scans in input order with a strict less-than comparison, so on an exact tie
/// the earliest link keeps the win.
pub fn select_lowest(display_name: &str, resolutions: &[Resolution]) -> SelectionResult {
    let mut lowest: Option<&ResolvedPrice> = None;

    for price in resolutions.iter().filter_map(Resolution::price) {
        match lowest {
            Some(best) if price.effective_price >= best.effective_price => {}
            _ => lowest = Some(price),
        }
    }

    match lowest {
        Some(best) => SelectionResult::Winner {
            display_name: display_name.to_string(),
            winning_link: best.source_link.clone(),
            price: best.effective_price,
        },
        None => SelectionResult::NoWinner,
    }
}
