//! # Bill Commands
//!
//! `summary`, `quote`, `split` and `ticket`: one settlement session opened on
//! a saved bill file, the operator's adjustments applied, one view printed.

use mesa_core::settlement::preset_amounts;
use mesa_core::types::TableStatus;
use mesa_core::validation::{parse_amount, parse_percentage};
use mesa_core::{BillSummary, Money, PaymentMethod, Table};
use serde::Serialize;

use crate::commands::BillArgs;
use crate::error::AppError;
use crate::gateway::FileGateway;
use crate::state::{CashierConfig, SettlementSession};

/// Builds the session every bill command works on.
fn open_session(args: &BillArgs, config: &CashierConfig) -> Result<SettlementSession, AppError> {
    let gateway = FileGateway::new().with_bill(&args.bill);
    let table = Table {
        id: args.table,
        number: args.table,
        status: TableStatus::Ocupada,
    };

    let mut session = SettlementSession::open(table, &gateway, config.default_tip_percent)?;

    if let Some(text) = &args.discount {
        if is_percentage(text) {
            session.apply_discount_percentage(parse_percentage(text)?.value())?;
        } else {
            session.set_discount(parse_amount(text)?.unwrap_or_default())?;
        }
    }

    if let Some(text) = &args.tip {
        if is_percentage(text) {
            session.apply_tip_percentage(parse_percentage(text)?.value())?;
        } else {
            session.set_tip(parse_amount(text)?.unwrap_or_default())?;
        }
    }

    Ok(session)
}

fn is_percentage(text: &str) -> bool {
    text.trim_end().ends_with('%')
}

fn row(label: &str, value: String) -> String {
    format!("{:<12}{:>14}", label, value)
}

fn summary_lines(summary: &BillSummary, config: &CashierConfig) -> Vec<String> {
    let fmt = |m: Money| config.format_currency(m);
    vec![
        row("Subtotal", fmt(summary.product_subtotal)),
        row("Descuento", format!("-{}", fmt(summary.discount))),
        row("Propina", fmt(summary.tip)),
        row("Total", fmt(summary.final_total)),
        row("Pagado", fmt(summary.amount_paid)),
        row("Restante", fmt(summary.remaining)),
    ]
}

/// One line of percentage buttons with what each would set.
fn preset_line(
    label: &str,
    sign: &str,
    base: Money,
    presets: &[u32],
    config: &CashierConfig,
) -> Result<String, AppError> {
    let buttons = preset_amounts(base, presets)?
        .into_iter()
        .map(|(percent, amount)| format!("{}% {}{}", percent, sign, config.format_currency(amount)))
        .collect::<Vec<_>>();
    Ok(format!("{:<12}{}", label, buttons.join(" | ")))
}

/// `summary`: every derived figure of the bill, plus the configured
/// discount and tip buttons.
pub fn summary(args: &BillArgs, config: &CashierConfig) -> Result<String, AppError> {
    let session = open_session(args, config)?;
    let summary = session.summary()?;

    if args.json {
        return Ok(serde_json::to_string_pretty(&summary)?);
    }

    let mut lines = vec![format!("Mesa {}", args.table)];
    lines.extend(summary_lines(&summary, config));
    lines.push(String::new());
    lines.push(preset_line(
        "Descuentos",
        "-",
        summary.product_subtotal,
        &config.discount_presets,
        config,
    )?);
    lines.push(preset_line(
        "Propinas",
        "",
        summary.product_subtotal,
        &config.tip_presets,
        config,
    )?);
    Ok(lines.join("\n"))
}

#[derive(Serialize)]
struct QuoteOutput<'a> {
    summary: BillSummary,
    preview: &'a crate::state::PaymentPreview,
    request: mesa_core::wire::PaymentRequestDto,
}

/// `quote`: what the pay button would do, and the body it would post.
pub fn quote(
    args: &BillArgs,
    config: &CashierConfig,
    amount: Option<&str>,
    method: &str,
) -> Result<String, AppError> {
    let mut session = open_session(args, config)?;
    session.set_method(method.parse::<PaymentMethod>()?)?;
    if let Some(text) = amount {
        // Strict here: a typo on the command line should not silently
        // become "pay everything".
        parse_amount(text)?;
        session.set_amount_text(text)?;
    }

    let summary = session.summary()?;
    let preview = session.preview()?;
    let request = session.prepare_attempt()?.to_request();

    if args.json {
        return Ok(serde_json::to_string_pretty(&QuoteOutput {
            summary,
            preview: &preview,
            request,
        })?);
    }

    let mut lines = summary_lines(&summary, config);
    lines.push(String::new());
    lines.push(format!(
        "{} ({})",
        preview.kind.action_label(),
        session.method()
    ));
    lines.push(preview.confirmation_prompt.clone());
    lines.push(format!("[{}]", preview.button_label));
    lines.push(String::new());
    lines.push(serde_json::to_string(&request)?);
    Ok(lines.join("\n"))
}

/// `split`: the rounded per-person share plus shares that add up exactly.
pub fn split(args: &BillArgs, config: &CashierConfig, people: i64) -> Result<String, AppError> {
    let session = open_session(args, config)?;
    let share = session.split(people)?;
    let shares = session.split_shares(people)?;

    if args.json {
        #[derive(Serialize)]
        struct SplitOutput {
            people: i64,
            share: Money,
            shares: Vec<Money>,
        }
        return Ok(serde_json::to_string_pretty(&SplitOutput {
            people,
            share,
            shares,
        })?);
    }

    let total = session.summary()?.final_total;
    Ok([
        row("Total", config.format_currency(total)),
        row("Personas", people.to_string()),
        row("Por persona", config.format_currency(share)),
        format!(
            "Partes exactas: {}",
            shares
                .iter()
                .map(|m| config.format_currency(*m))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ]
    .join("\n"))
}

/// `ticket`: the receipt as it would be printed.
pub fn ticket(args: &BillArgs, config: &CashierConfig) -> Result<String, AppError> {
    let session = open_session(args, config)?;
    Ok(session.ticket(&config.restaurant_name, config.receipt_width, &|m| {
        config.format_currency(m)
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::io::Write;

    fn bill_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "items": [
                    {{"producto": "Enchiladas", "cantidad": 2, "subtotal": 100}},
                    {{"producto": "Horchata", "cantidad": 1, "subtotal": 50}}
                ],
                "cuenta": {{"total": 150, "descuento": 0, "propina": 0}},
                "totalPagado": 50
            }}"#
        )
        .unwrap();
        file
    }

    fn args(file: &tempfile::NamedTempFile) -> BillArgs {
        BillArgs {
            bill: file.path().to_path_buf(),
            table: 4,
            discount: Some("10%".to_string()),
            tip: Some("15%".to_string()),
            json: false,
        }
    }

    #[test]
    fn test_summary_text() {
        let file = bill_file();
        let out = summary(&args(&file), &CashierConfig::default()).unwrap();

        assert!(out.starts_with("Mesa 4"));
        assert!(out.contains("$157.50"));
        assert!(out.contains("-$15.00"));
        assert!(out.contains("$107.50"));
        assert!(out.contains("Descuentos  10% -$15.00 | 20% -$30.00 | 50% -$75.00"));
        assert!(out.contains("Propinas    10% $15.00 | 15% $22.50 | 20% $30.00"));
    }

    #[test]
    fn test_summary_uses_configured_presets() {
        let file = bill_file();
        let config = CashierConfig {
            discount_presets: vec![5],
            tip_presets: vec![12, 18],
            ..CashierConfig::default()
        };
        let out = summary(&args(&file), &config).unwrap();

        assert!(out.contains("Descuentos  5% -$7.50"));
        assert!(out.contains("Propinas    12% $18.00 | 18% $27.00"));
        assert!(!out.contains("50%"));
    }

    #[test]
    fn test_summary_json_with_amounts() {
        let file = bill_file();
        let mut a = args(&file);
        a.discount = Some("20".to_string());
        a.tip = None;
        a.json = true;

        let out = summary(&a, &CashierConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["discount"], 2000);
        assert_eq!(value["final_total"], 13000);
        assert_eq!(value["remaining"], 8000);
    }

    #[test]
    fn test_quote_full_close() {
        let file = bill_file();
        let out = quote(&args(&file), &CashierConfig::default(), None, "tarjeta").unwrap();

        assert!(out.contains("Cerrar Cuenta (tarjeta)"));
        assert!(out.contains("¿Cerrar Cuenta de Mesa 4? Monto: $107.50"));
        assert!(out.contains("\"metodoPago\":\"tarjeta\""));
        assert!(out.contains("\"monto\":107.5"));
    }

    #[test]
    fn test_quote_partial_and_bad_input() {
        let file = bill_file();
        let config = CashierConfig::default();
        let out = quote(&args(&file), &config, Some("50"), "efectivo").unwrap();
        assert!(out.contains("Monto: $50.00"));

        let err = quote(&args(&file), &config, Some("cincuenta"), "efectivo").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = quote(&args(&file), &config, None, "bitcoin").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_split() {
        let file = bill_file();
        let config = CashierConfig::default();
        let out = split(&args(&file), &config, 3).unwrap();
        assert!(out.contains("$52.50"));
        assert!(out.contains("Partes exactas: $52.50, $52.50, $52.50"));

        let err = split(&args(&file), &config, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_ticket_respects_config() {
        let file = bill_file();
        let config = CashierConfig {
            restaurant_name: "La Cantina".to_string(),
            receipt_width: 40,
            ..CashierConfig::default()
        };
        let out = ticket(&args(&file), &config).unwrap();

        assert_eq!(out.lines().next().unwrap().trim(), "La Cantina");
        assert!(out.lines().all(|l| l.chars().count() <= 40));
        assert!(out.contains("¡Gracias por su visita!"));
    }

    #[test]
    fn test_ticket_uses_configured_currency() {
        let file = bill_file();
        let config = CashierConfig {
            currency_symbol: "S/".to_string(),
            ..CashierConfig::default()
        };
        let out = ticket(&args(&file), &config).unwrap();

        assert!(out.contains("S/100.00"));
        assert!(out.contains("-S/15.00"));
        assert!(out.contains("S/157.50"));
        assert!(!out.contains('$'));
    }

    #[test]
    fn test_missing_bill_file() {
        let a = BillArgs {
            bill: "/nonexistent/mesa.json".into(),
            table: 1,
            discount: None,
            tip: None,
            json: false,
        };
        let err = summary(&a, &CashierConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::GatewayError);
    }
}
