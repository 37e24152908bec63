//! Bill arithmetic. Pure functions over order rows, no I/O and no state, so
//! the same math backs single-order bills, per-table bill lists, and the
//! table summary card.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{OrderItemAddonModel, OrderItemModel, OrderModel};

/// Fixed 7% VAT. Deliberately not configurable.
pub fn vat_rate() -> Decimal {
    dec!(0.07)
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Line total: per-unit price × quantity plus the line's addon charges.
pub fn line_total(price_each: Decimal, quantity: i32, addon_prices: &[Decimal]) -> Decimal {
    round2(price_each * Decimal::from(quantity) + addon_prices.iter().copied().sum::<Decimal>())
}

pub fn subtotal(line_totals: &[Decimal]) -> Decimal {
    round2(line_totals.iter().copied().sum())
}

pub fn vat(subtotal: Decimal) -> Decimal {
    round2(subtotal * vat_rate())
}

pub fn total(subtotal: Decimal) -> Decimal {
    round2(subtotal + vat(subtotal))
}

/// One priced line on a bill
#[derive(Debug, Serialize)]
pub struct BillLine {
    pub menu_name: String,
    pub meat_option: Option<String>,
    pub quantity: i32,
    pub total_price: Decimal,
}

/// A single order priced out with VAT
#[derive(Debug, Serialize)]
pub struct OrderBill {
    pub order_id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub order_time: NaiveTime,
    pub status: &'static str,
    pub items: Vec<BillLine>,
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

/// Table-level rollup over per-order bills (each already VAT-inclusive)
#[derive(Debug, Serialize)]
pub struct TableBillSummary {
    pub table_no: String,
    pub orders: Vec<BillSummaryEntry>,
    pub grand_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BillSummaryEntry {
    pub order_number: String,
    pub total: Decimal,
}

/// Prices out one order from its stored rows.
pub fn bill_for_order(
    order: &OrderModel,
    items: &[OrderItemModel],
    addons: &[OrderItemAddonModel],
) -> OrderBill {
    let mut lines = Vec::new();
    let mut line_totals = Vec::new();
    for item in items.iter().filter(|i| i.order_id == order.id) {
        let addon_prices: Vec<Decimal> = addons
            .iter()
            .filter(|a| a.order_item_id == item.id)
            .map(|a| a.addon_price)
            .collect();
        let total_price = line_total(item.price_each, item.quantity, &addon_prices);
        line_totals.push(total_price);
        lines.push(BillLine {
            menu_name: item.menu_name.clone(),
            meat_option: item.meat_option.clone(),
            quantity: item.quantity,
            total_price,
        });
    }

    let bill_subtotal = subtotal(&line_totals);
    OrderBill {
        order_id: order.id,
        order_number: order.order_number.clone(),
        order_date: order.order_date,
        order_time: order.order_time,
        status: order.status.label(),
        items: lines,
        subtotal: bill_subtotal,
        vat: vat(bill_subtotal),
        total: total(bill_subtotal),
    }
}

/// Rolls per-order bills up into the table summary; each order total already
/// includes its own VAT.
pub fn summarize_table(table_no: String, bills: &[OrderBill]) -> TableBillSummary {
    let grand_total = round2(bills.iter().map(|b| b.total).sum());
    TableBillSummary {
        table_no,
        orders: bills
            .iter()
            .map(|b| BillSummaryEntry {
                order_number: b.order_number.clone(),
                total: b.total,
            })
            .collect(),
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vat_round_trip_at_two_decimals() {
        let sub = subtotal(&[dec!(40.00), dec!(60.00)]);
        assert_eq!(sub, dec!(100.00));
        assert_eq!(vat(sub), dec!(7.00));
        assert_eq!(total(sub), dec!(107.00));
    }

    #[test]
    fn vat_rounds_half_up() {
        // 107.50 × 0.07 = 7.525 → 7.53
        assert_eq!(vat(dec!(107.50)), dec!(7.53));
    }

    #[test]
    fn line_total_adds_addon_charges() {
        assert_eq!(line_total(dec!(120), 2, &[dec!(10), dec!(6)]), dec!(256.00));
        assert_eq!(line_total(dec!(60), 2, &[]), dec!(120.00));
    }

    #[test]
    fn table_summary_sums_vat_inclusive_totals() {
        let mk = |number: &str, sub: Decimal| OrderBill {
            order_id: Uuid::new_v4(),
            order_number: number.to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 4, 19).unwrap(),
            order_time: NaiveTime::from_hms_opt(12, 34, 0).unwrap(),
            status: "Complete",
            items: Vec::new(),
            subtotal: sub,
            vat: vat(sub),
            total: total(sub),
        };
        let bills = vec![mk("ORD-1", dec!(100.00)), mk("ORD-2", dec!(50.00))];
        let summary = summarize_table("01".to_string(), &bills);
        assert_eq!(summary.grand_total, dec!(107.00) + dec!(53.50));
        assert_eq!(summary.orders.len(), 2);
    }
}
