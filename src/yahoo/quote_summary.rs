// =============================================================================
// Yahoo quoteSummary API - fundamentals and financial statements
// =============================================================================
//
// `GET /v10/finance/quoteSummary/{symbol}?modules=...`
//
// Numeric fields are published as `{ "raw": 1.0, "fmt": "1.00" }` objects, or
// as `{}` when the provider has no value. Each field is mapped independently
// onto `Fundamentals`; a missing module only leaves its fields empty.
//
// Statement modules carry a list of periods, each an object of line items
// keyed by camelCase name plus an `endDate` and a `maxAge`.

use std::collections::{BTreeMap, HashMap};

use chrono::DateTime;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::market_data::{FinancialStatements, Fundamentals, StatementPeriod};

pub(crate) const MODULES: &str = "assetProfile,summaryDetail,price";
pub(crate) const STATEMENT_MODULES: &str =
    "balanceSheetHistory,incomeStatementHistory,cashflowStatementHistory";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryEnvelope {
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    result: Option<Vec<SummaryResult>>,
    error: Option<SummaryError>,
}

#[derive(Debug, Deserialize)]
struct SummaryError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    #[serde(default)]
    asset_profile: AssetProfile,
    #[serde(default)]
    summary_detail: SummaryDetail,
    #[serde(default)]
    price: PriceModule,
    #[serde(default)]
    balance_sheet_history: BalanceSheetHistory,
    #[serde(default)]
    income_statement_history: IncomeStatementHistory,
    #[serde(default)]
    cashflow_statement_history: CashflowStatementHistory,
}

type RawStatement = HashMap<String, serde_json::Value>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetHistory {
    #[serde(default)]
    balance_sheet_statements: Vec<RawStatement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementHistory {
    #[serde(default)]
    income_statement_history: Vec<RawStatement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashflowStatementHistory {
    #[serde(default)]
    cashflow_statements: Vec<RawStatement>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
    country: Option<String>,
    website: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Raw {
    raw: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    market_cap: Option<Raw>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<Raw>,
    dividend_yield: Option<Raw>,
    previous_close: Option<Raw>,
    open: Option<Raw>,
    day_low: Option<Raw>,
    day_high: Option<Raw>,
    fifty_two_week_low: Option<Raw>,
    fifty_two_week_high: Option<Raw>,
    volume: Option<Raw>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    symbol: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    currency: Option<String>,
    exchange_name: Option<String>,
}

fn raw(v: &Option<Raw>) -> Option<f64> {
    v.as_ref().and_then(|r| r.raw).filter(|x| x.is_finite())
}

/// Unwrap the single result of a quoteSummary body.
fn first_result(symbol: &str, body: &str) -> Result<SummaryResult, ProviderError> {
    let envelope: SummaryEnvelope = serde_json::from_str(body).map_err(|e| {
        ProviderError::Malformed(format!("quoteSummary response for {symbol}: {e}"))
    })?;

    if let Some(err) = envelope.quote_summary.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return Err(ProviderError::no_data(symbol));
        }
        return Err(ProviderError::Malformed(format!(
            "{}: {}",
            err.code,
            err.description.unwrap_or_default()
        )));
    }

    envelope
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::no_data(symbol))
}

/// Parse a quoteSummary body into fundamentals for `symbol`.
pub(crate) fn parse_quote_summary(symbol: &str, body: &str) -> Result<Fundamentals, ProviderError> {
    let SummaryResult {
        asset_profile: profile,
        summary_detail: detail,
        price,
        ..
    } = first_result(symbol, body)?;

    Ok(Fundamentals {
        symbol: price.symbol.unwrap_or_else(|| symbol.to_string()),
        long_name: price.long_name.or(price.short_name),
        sector: profile.sector,
        industry: profile.industry,
        market_cap: raw(&detail.market_cap),
        trailing_pe: raw(&detail.trailing_pe),
        dividend_yield: raw(&detail.dividend_yield),
        previous_close: raw(&detail.previous_close),
        open: raw(&detail.open),
        day_low: raw(&detail.day_low),
        day_high: raw(&detail.day_high),
        fifty_two_week_low: raw(&detail.fifty_two_week_low),
        fifty_two_week_high: raw(&detail.fifty_two_week_high),
        volume: raw(&detail.volume).map(|v| v.max(0.0) as u64),
        country: profile.country,
        currency: price.currency.or(detail.currency),
        website: profile.website,
        exchange: price.exchange_name,
    })
}

/// Parse the statement modules of a quoteSummary body.
pub(crate) fn parse_statements(
    symbol: &str,
    body: &str,
) -> Result<FinancialStatements, ProviderError> {
    let result = first_result(symbol, body)?;
    Ok(FinancialStatements {
        balance_sheet: periods(result.balance_sheet_history.balance_sheet_statements),
        income_statement: periods(result.income_statement_history.income_statement_history),
        cash_flow: periods(result.cashflow_statement_history.cashflow_statements),
    })
}

/// Newest period first. Periods without a usable `endDate` are dropped, as
/// are line items without a numeric `raw` value.
fn periods(raw: Vec<RawStatement>) -> Vec<StatementPeriod> {
    let mut out: Vec<StatementPeriod> = raw
        .into_iter()
        .filter_map(|statement| {
            let end_date = statement
                .get("endDate")
                .and_then(|v| v.get("raw"))
                .and_then(serde_json::Value::as_i64)
                .and_then(|ts| DateTime::from_timestamp(ts, 0))?
                .date_naive();

            let items: BTreeMap<String, f64> = statement
                .into_iter()
                .filter(|(key, _)| key != "endDate" && key != "maxAge")
                .filter_map(|(key, value)| {
                    let raw = value.get("raw")?.as_f64()?;
                    raw.is_finite().then_some((key, raw))
                })
                .collect();

            Some(StatementPeriod { end_date, items })
        })
        .collect();
    out.sort_by(|a, b| b.end_date.cmp(&a.end_date));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_modules() {
        let body = r#"{"quoteSummary":{"result":[{
            "assetProfile":{"sector":"Technology","industry":"Consumer Electronics",
                            "country":"United States","website":"https://www.apple.com"},
            "summaryDetail":{"marketCap":{"raw":2950000000000,"fmt":"2.95T"},
                             "trailingPE":{"raw":30.1,"fmt":"30.10"},
                             "dividendYield":{"raw":0.0051,"fmt":"0.51%"},
                             "previousClose":{"raw":189.0},"open":{"raw":189.5},
                             "dayLow":{"raw":188.1},"dayHigh":{"raw":192.5},
                             "fiftyTwoWeekLow":{"raw":124.2},"fiftyTwoWeekHigh":{"raw":199.6},
                             "volume":{"raw":51234567},"currency":"USD"},
            "price":{"symbol":"AAPL","longName":"Apple Inc.","currency":"USD","exchangeName":"NasdaqGS"}
        }],"error":null}}"#;

        let f = parse_quote_summary("AAPL", body).unwrap();
        assert_eq!(f.symbol, "AAPL");
        assert_eq!(f.long_name.as_deref(), Some("Apple Inc."));
        assert_eq!(f.sector.as_deref(), Some("Technology"));
        assert_eq!(f.market_cap, Some(2_950_000_000_000.0));
        assert_eq!(f.trailing_pe, Some(30.1));
        assert_eq!(f.volume, Some(51_234_567));
        assert_eq!(f.exchange.as_deref(), Some("NasdaqGS"));
    }

    #[test]
    fn empty_raw_objects_become_none() {
        let body = r#"{"quoteSummary":{"result":[{
            "summaryDetail":{"trailingPE":{},"dividendYield":{}},
            "price":{"shortName":"SPDR S&P 500"}
        }],"error":null}}"#;
        let f = parse_quote_summary("SPY", body).unwrap();
        assert_eq!(f.symbol, "SPY");
        assert_eq!(f.long_name.as_deref(), Some("SPDR S&P 500"));
        assert_eq!(f.trailing_pe, None);
        assert_eq!(f.dividend_yield, None);
        assert_eq!(f.sector, None);
    }

    #[test]
    fn parses_statement_modules() {
        let body = r#"{"quoteSummary":{"result":[{
            "balanceSheetHistory":{"balanceSheetStatements":[
                {"maxAge":1,"endDate":{"raw":1664496000,"fmt":"2022-09-30"},
                 "totalAssets":{"raw":352755000000,"fmt":"352.76B"},"cash":{"raw":23646000000}},
                {"maxAge":1,"endDate":{"raw":1696032000,"fmt":"2023-09-30"},
                 "totalAssets":{"raw":352583000000,"fmt":"352.58B"},"goodWill":{}}
            ],"maxAge":86400},
            "incomeStatementHistory":{"incomeStatementHistory":[
                {"endDate":{"raw":1696032000},"totalRevenue":{"raw":383285000000},
                 "netIncome":{"raw":96995000000}}
            ]},
            "cashflowStatementHistory":{"cashflowStatements":[
                {"endDate":{"fmt":"2023-09-30"},"netIncome":{"raw":1.0}}
            ]}
        }],"error":null}}"#;

        let s = parse_statements("AAPL", body).unwrap();
        assert_eq!(s.balance_sheet.len(), 2);
        // Newest period first.
        assert_eq!(
            s.balance_sheet[0].end_date,
            chrono::NaiveDate::from_ymd_opt(2023, 9, 30).unwrap()
        );
        assert_eq!(s.balance_sheet[0].items.get("totalAssets"), Some(&352_583_000_000.0));
        assert!(!s.balance_sheet[0].items.contains_key("goodWill"));
        assert!(!s.balance_sheet[0].items.contains_key("maxAge"));
        assert_eq!(s.balance_sheet[1].items.get("cash"), Some(&23_646_000_000.0));

        assert_eq!(s.income_statement.len(), 1);
        assert_eq!(s.income_statement[0].items.len(), 2);
        // No numeric endDate: the period cannot be placed and is dropped.
        assert!(s.cash_flow.is_empty());
    }

    #[test]
    fn missing_statement_modules_are_empty() {
        let body = r#"{"quoteSummary":{"result":[{"price":{"symbol":"SPY"}}],"error":null}}"#;
        let s = parse_statements("SPY", body).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn not_found_is_no_data() {
        let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for ticker symbol: ZZZZ"}}}"#;
        assert!(matches!(
            parse_quote_summary("ZZZZ", body),
            Err(ProviderError::NoData { .. })
        ));
        assert!(matches!(
            parse_statements("ZZZZ", body),
            Err(ProviderError::NoData { .. })
        ));
    }
}
