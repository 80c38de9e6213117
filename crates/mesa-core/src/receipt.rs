//! # Receipt Ticket
//!
//! Plain-text ticket for a table's bill, laid out for a fixed paper width.
//!
//! ```text
//!          Mi Restaurante
//!              Mesa 4
//! --------------------------------
//! 2x Enchiladas            $100.00
//! 1x Horchata               $50.00
//! --------------------------------
//! Subtotal:                $150.00
//! Descuento:               -$15.00
//! Propina:                  $22.50
//! TOTAL:                   $157.50
//!
//!      ¡Gracias por su visita!
//! ```
//!
//! Figures come from a [`BillSummary`]; nothing is recomputed here. Amounts
//! are printed with the caller's formatter so the ticket shows the same
//! currency as every other screen.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::settlement::BillSummary;
use crate::types::BillState;

/// Narrowest paper the layout supports.
pub const MIN_TICKET_WIDTH: usize = 24;

const FOOTER: &str = "¡Gracias por su visita!";

/// Header data that doesn't come from the bill itself.
#[derive(Debug, Clone)]
pub struct TicketHeader {
    pub restaurant_name: String,
    pub table_number: i64,
    pub printed_at: Option<DateTime<Utc>>,
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }
    format!("{}{}", " ".repeat((width - len) / 2), text)
}

/// `left` and `right` on one line, `right` flush with the paper edge.
/// `left` is cut short when both don't fit.
fn columns(left: &str, right: &str, width: usize) -> String {
    let right_len = right.chars().count();
    let room = width.saturating_sub(right_len + 1);
    let left: String = left.chars().take(room).collect();
    let gap = width.saturating_sub(left.chars().count() + right_len).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}

/// Renders the ticket. `width` below [`MIN_TICKET_WIDTH`] is widened to it.
///
/// `format_money` prints every amount; `Money::to_string` gives `$157.50`.
pub fn render_ticket(
    header: &TicketHeader,
    bill: &BillState,
    summary: &BillSummary,
    width: usize,
    format_money: &dyn Fn(Money) -> String,
) -> String {
    let width = width.max(MIN_TICKET_WIDTH);
    let rule = "-".repeat(width);
    let mut lines = vec![
        center(&header.restaurant_name, width),
        center(&format!("Mesa {}", header.table_number), width),
    ];
    if let Some(at) = header.printed_at {
        lines.push(center(&at.format("%Y-%m-%d %H:%M").to_string(), width));
    }
    lines.push(rule.clone());

    for item in &bill.items {
        lines.push(columns(
            &format!("{}x {}", item.quantity, item.product_name),
            &format_money(item.line_subtotal),
            width,
        ));
    }

    lines.push(rule);
    lines.push(columns("Subtotal:", &format_money(summary.product_subtotal), width));
    lines.push(columns("Descuento:", &format!("-{}", format_money(summary.discount)), width));
    lines.push(columns("Propina:", &format_money(summary.tip), width));
    lines.push(columns("TOTAL:", &format_money(summary.final_total), width));
    lines.push(String::new());
    lines.push(center(FOOTER, width));

    let mut ticket = lines.join("\n");
    ticket.push('\n');
    ticket
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Adjustments, LineItem};

    fn dollars(m: Money) -> String {
        m.to_string()
    }

    fn sample() -> (TicketHeader, BillState, BillSummary) {
        let bill = BillState {
            table_id: 12,
            items: vec![
                LineItem {
                    product_name: "Enchiladas".to_string(),
                    quantity: 2,
                    line_subtotal: Money::from_cents(10000),
                },
                LineItem {
                    product_name: "Horchata".to_string(),
                    quantity: 1,
                    line_subtotal: Money::from_cents(5000),
                },
            ],
            stored_discount: Money::zero(),
            stored_tip: Money::zero(),
            amount_paid_so_far: Money::zero(),
            reported_total: Money::from_cents(15000),
        };
        let summary = BillSummary::compute(
            &bill,
            &Adjustments::new(Money::from_cents(1500), Money::from_cents(2250)),
        );
        let header = TicketHeader {
            restaurant_name: "Mi Restaurante".to_string(),
            table_number: 4,
            printed_at: None,
        };
        (header, bill, summary)
    }

    #[test]
    fn test_render_ticket() {
        let (header, bill, summary) = sample();
        let ticket = render_ticket(&header, &bill, &summary, 32, &dollars);
        let lines: Vec<&str> = ticket.lines().collect();

        assert_eq!(lines[0].trim(), "Mi Restaurante");
        assert_eq!(lines[1].trim(), "Mesa 4");
        assert_eq!(lines[3], "2x Enchiladas            $100.00");
        assert_eq!(lines[4], "1x Horchata               $50.00");
        assert_eq!(lines[6], "Subtotal:                $150.00");
        assert_eq!(lines[7], "Descuento:               -$15.00");
        assert_eq!(lines[8], "Propina:                  $22.50");
        assert_eq!(lines[9], "TOTAL:                   $157.50");
        assert_eq!(lines.last().unwrap().trim(), "¡Gracias por su visita!");

        for line in &lines {
            assert!(line.chars().count() <= 32, "line too wide: {:?}", line);
        }
    }

    #[test]
    fn test_long_names_are_truncated() {
        let (header, mut bill, summary) = sample();
        bill.items[0].product_name = "Parrillada mixta para cuatro personas".to_string();
        let ticket = render_ticket(&header, &bill, &summary, 24, &dollars);

        let line = ticket.lines().nth(3).unwrap();
        assert_eq!(line.chars().count(), 24);
        assert!(line.ends_with("$100.00"));
        assert!(line.starts_with("2x Parrillada"));
    }

    #[test]
    fn test_print_time_line() {
        let (mut header, bill, summary) = sample();
        header.printed_at = Some(
            DateTime::parse_from_rfc3339("2026-10-17T21:05:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        let ticket = render_ticket(&header, &bill, &summary, 10, &dollars);
        assert_eq!(ticket.lines().nth(2).unwrap().trim(), "2026-10-17 21:05");
    }

    #[test]
    fn test_amounts_use_given_formatter() {
        let (header, bill, summary) = sample();
        let pesos = |m: Money| format!("MX$ {}", m.to_decimal());
        let ticket = render_ticket(&header, &bill, &summary, 32, &pesos);
        let lines: Vec<&str> = ticket.lines().collect();

        assert_eq!(lines[3], "2x Enchiladas         MX$ 100.00");
        assert_eq!(lines[7], "Descuento:            -MX$ 15.00");
        assert_eq!(lines[9], "TOTAL:                MX$ 157.50");
        assert!(!ticket.contains(" $"));
    }
}
