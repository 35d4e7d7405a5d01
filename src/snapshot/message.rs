use super::MarketSnapshot;

/// Horizontal rule under the title line.
pub const SEPARATOR: &str = "───────────────────────────";

/// Append `%` unless the value already ends with one.
fn pct(value: &str) -> String {
    let v = value.trim();
    if v.ends_with('%') {
        v.to_string()
    } else {
        format!("{}%", v)
    }
}

/// Slack mrkdwn message for the snapshot.
///
/// Percent-style fields always end in `%`. USD/CAD is an exchange rate,
/// not a change, and is passed through verbatim.
pub fn format_message(s: &MarketSnapshot) -> String {
    [
        format!("*Date: {} Market*", s.date),
        SEPARATOR.to_string(),
        format!(":us: S&P 500: {}", pct(&s.sp500)),
        format!(":us: Nasdaq: {}", pct(&s.nasdaq)),
        format!(":flag-ca: TSX Comp: {}", pct(&s.tsx)),
        format!(":seven: Magnificent7: {}", pct(&s.mags)),
        format!(":bitcoin: Bitcoin: {}", pct(&s.btc)),
        format!(":ethereum: Ethereum: {}", pct(&s.eth)),
        format!(":chart_with_upwards_trend: USD/CAD: {}", s.usdcad),
        format!(":gold_ingot: Gold: {}", pct(&s.gold)),
    ]
    .join("\n")
}
