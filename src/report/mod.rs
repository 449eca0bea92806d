//! Chat report formatter
//!
//! Renders a snapshot as the short plain-text message pushed to chat
//! channels. Banks are listed in a fixed order with "-" for missing ones.

mod format;

pub use format::{format_amount, format_rate_with_diff, format_signed};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::types::{BankRate, Snapshot, SourceId};

pub const STALE_FOOTNOTE: &str = "※ 일부 은행 데이터는 전 영업일(또는 가장 최근 영업일) 기준입니다.";

#[derive(Clone, Copy)]
enum Currency {
    Usd,
    Jpy,
}

fn bank_line(source: SourceId, bank: Option<&BankRate>, currency: Currency) -> String {
    let name = source.short_name();
    let Some(bank) = bank else {
        return format!("{}  -", name);
    };

    let (rate, diff) = match currency {
        Currency::Usd => (bank.quote.usd_rate, bank.usd_diff),
        Currency::Jpy => (bank.quote.jpy_rate, bank.jpy_diff),
    };
    let stale = if bank.quote.is_stale { " *" } else { "" };

    format!(
        "{}  {} {}{}",
        name,
        format_rate_with_diff(rate, diff),
        bank.quote.round_label(),
        stale
    )
}

fn spot_line(price: Decimal, premium: Option<Decimal>) -> String {
    match premium {
        Some(p) => format!("{} (김프 {}%)", format_amount(price, 0), format_signed(p, 2)),
        None => format_amount(price, 0),
    }
}

/// Report lines for one snapshot
pub fn build_report(
    snapshot: &Snapshot,
    generated_at: NaiveDateTime,
    detail_url: Option<&str>,
) -> Vec<String> {
    let mut lines = vec![format!(
        "[실시간 환율] {}",
        generated_at.format("%Y-%m-%d %H:%M")
    )];

    if let Some(reference) = &snapshot.reference {
        lines.push(String::new());
        lines.push(format_rate_with_diff(reference.usd_krw, None));
        lines.push(format_rate_with_diff(reference.jpy_krw_per_100, None));
    }

    for (title, currency) in [("[달러 환율]", Currency::Usd), ("[엔화 환율]", Currency::Jpy)] {
        lines.push(String::new());
        lines.push(title.to_string());
        for source in SourceId::BANKS {
            lines.push(bank_line(source, snapshot.bank(source), currency));
        }
    }

    lines.push(String::new());
    lines.push("[테더]".to_string());
    lines.push(match &snapshot.spot.main {
        Some(ticker) => spot_line(ticker.price, snapshot.premium_pct),
        None => "-".to_string(),
    });

    lines.push(String::new());
    lines.push("[비트]".to_string());
    lines.push(match &snapshot.spot.secondary {
        Some(ticker) => spot_line(ticker.price, None),
        None => "-".to_string(),
    });

    if snapshot.has_stale_banks() {
        lines.push(String::new());
        lines.push(STALE_FOOTNOTE.to_string());
    }

    if let Some(url) = detail_url.filter(|u| !u.is_empty()) {
        lines.push(String::new());
        lines.push(format!("상세: {}", url));
    }

    lines
}

/// Report as one message
pub fn render_report(
    snapshot: &Snapshot,
    generated_at: NaiveDateTime,
    detail_url: Option<&str>,
) -> String {
    build_report(snapshot, generated_at, detail_url).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quote, ReferenceRate, SpotAsset, SpotTicker};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 27)
            .unwrap()
            .and_hms_opt(19, 40, 5)
            .unwrap()
    }

    fn ticker(asset: SpotAsset, price: Decimal) -> SpotTicker {
        SpotTicker {
            asset,
            price,
            prev_close: price,
            change_amount: Decimal::ZERO,
            change_rate: Decimal::ZERO,
            high: None,
            low: None,
            volume_24h: None,
        }
    }

    fn sample() -> Snapshot {
        let mut shinhan = Quote::new(SourceId::Shinhan);
        shinhan.usd_rate = Some(dec!(1468.5));
        shinhan.jpy_rate = Some(dec!(941.53));
        shinhan.sequence_label = Some("584".into());

        let mut hana = Quote::new(SourceId::Hana);
        hana.usd_rate = Some(dec!(1471));
        hana.jpy_rate = Some(dec!(940));
        hana.sequence_label = Some("731".into());
        hana.is_stale = true;

        Snapshot {
            banks: vec![
                BankRate {
                    quote: shinhan,
                    usd_diff: Some(dec!(1.85)),
                    jpy_diff: Some(dec!(-0.25)),
                },
                BankRate {
                    quote: hana,
                    usd_diff: Some(dec!(-0.65)),
                    jpy_diff: Some(dec!(1.28)),
                },
            ],
            reference: Some(ReferenceRate {
                source: SourceId::Investing,
                observed_date: None,
                observed_time: None,
                usd_krw: Some(dec!(1470.35)),
                jpy_krw_per_100: Some(dec!(941.28)),
            }),
            spot: crate::types::SpotPair {
                main: Some(ticker(SpotAsset::USDT, dec!(1400))),
                secondary: Some(ticker(SpotAsset::BTC, dec!(143250000))),
            },
            premium_pct: Some(dec!(3.7037037)),
        }
    }

    #[test]
    fn full_report_layout() {
        let lines = build_report(&sample(), at(), Some("https://fx.example/"));
        let expected = vec![
            "[실시간 환율] 2025-11-27 19:40",
            "",
            "1,470.35",
            "941.28",
            "",
            "[달러 환율]",
            "신한  1,468.50 (+1.85) 584회차",
            "국민  -",
            "하나  1,471.00 (-0.65) 731회차 *",
            "",
            "[엔화 환율]",
            "신한  941.53 (-0.25) 584회차",
            "국민  -",
            "하나  940.00 (+1.28) 731회차 *",
            "",
            "[테더]",
            "1,400 (김프 +3.70%)",
            "",
            "[비트]",
            "143,250,000",
            "",
            STALE_FOOTNOTE,
            "",
            "상세: https://fx.example/",
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn empty_snapshot_renders_placeholders() {
        let text = render_report(&Snapshot::default(), at(), None);
        assert!(text.contains("신한  -"));
        assert!(text.contains("[테더]\n-"));
        assert!(text.contains("[비트]\n-"));
        assert!(!text.contains("상세"));
        assert!(!text.contains(STALE_FOOTNOTE));
    }
}
