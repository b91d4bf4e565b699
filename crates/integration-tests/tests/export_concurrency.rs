//! Concurrent daily-aggregate appends.
//!
//! Multiple independent sessions may share one orders directory; the
//! exporter's read-modify-write append is a critical section, so rows
//! from parallel checkouts must all survive.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rust_decimal::Decimal;
use tempfile::TempDir;

use cotton_harbor_core::Price;
use cotton_harbor_store::{
    Cart, CustomerDetails, ExportMode, OrderExporter, Product, place_order,
};

fn red_tee() -> Product {
    Product {
        id: "red-tee".into(),
        name: "Red Tee".to_owned(),
        description: "Classic red cotton tee".to_owned(),
        price: Price::new(Decimal::from(500)).unwrap(),
        sizes: vec!["S".to_owned(), "M".to_owned(), "L".to_owned()],
        image: "images/red-tee.png".to_owned(),
    }
}

#[test]
fn test_parallel_sessions_lose_no_rows() {
    const SESSIONS: usize = 8;
    const ORDERS_PER_SESSION: usize = 5;

    let dir = TempDir::new().unwrap();
    let exporter = Arc::new(OrderExporter::new(dir.path(), ExportMode::Daily).unwrap());

    let handles: Vec<_> = (0..SESSIONS)
        .map(|session| {
            let exporter = Arc::clone(&exporter);
            thread::spawn(move || {
                let product = red_tee();
                let customer = CustomerDetails::new(
                    format!("Customer {session}"),
                    "0300 1234567",
                    "Lahore",
                );
                let mut ids = Vec::new();
                for _ in 0..ORDERS_PER_SESSION {
                    let mut cart = Cart::new();
                    cart.add_item(&product, "M", 1).unwrap();
                    let order = place_order(&cart, &customer).unwrap();
                    exporter.export_order(&order).unwrap();
                    ids.push(order.id().to_string());
                }
                ids
            })
        })
        .collect();

    let mut expected = HashSet::new();
    for handle in handles {
        expected.extend(handle.join().unwrap());
    }
    assert_eq!(expected.len(), SESSIONS * ORDERS_PER_SESSION);

    let aggregate = exporter.export_all_orders().unwrap();
    let rows = OrderExporter::read_rows(&aggregate).unwrap();
    assert_eq!(rows.len(), SESSIONS * ORDERS_PER_SESSION);

    let written: HashSet<String> = rows.into_iter().map(|row| row.order_id).collect();
    assert_eq!(written, expected);
}

#[test]
fn test_interleaved_appends_keep_one_header() {
    let dir = TempDir::new().unwrap();
    let exporter = Arc::new(OrderExporter::new(dir.path(), ExportMode::Daily).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let exporter = Arc::clone(&exporter);
            thread::spawn(move || {
                let mut cart = Cart::new();
                cart.add_item(&red_tee(), "S", 2).unwrap();
                let customer = CustomerDetails::new("Ali", "0300 1234567", "Lahore");
                let order = place_order(&cart, &customer).unwrap();
                exporter.export_order(&order).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let aggregate = exporter.export_all_orders().unwrap();
    let content = std::fs::read_to_string(&aggregate).unwrap();
    let headers = content
        .lines()
        .filter(|line| line.starts_with("Order ID,"))
        .count();
    assert_eq!(headers, 1);
    assert_eq!(content.lines().count(), 5);
}
