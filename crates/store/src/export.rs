//! Order export to spreadsheet (CSV) files.
//!
//! Every placed order is written as one row per line item, with the
//! order-level fields repeated on each row so the file stands alone for
//! downstream admin tooling. The column order is fixed; tools depend on
//! column position, so it must never change within a deployment.
//!
//! Two naming schemes are supported: one file per order (filenames are
//! unique, never contended) or one rolling file per calendar day that new
//! orders append to. The daily append is a read-modify-write performed
//! under an internal lock, so concurrent sessions sharing an exporter
//! cannot lose each other's rows.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkout::Order;

/// Column headers, in the fixed export order.
pub const COLUMNS: [&str; 11] = [
    "Order ID",
    "Date",
    "Customer Name",
    "Phone Number",
    "Delivery Address",
    "Product Name",
    "Size",
    "Quantity",
    "Price",
    "Subtotal",
    "Total Amount",
];

/// How exported files are named and grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportMode {
    /// One file per order, named from the order ID.
    #[default]
    PerOrder,
    /// One rolling file per calendar day; new orders append rows.
    Daily,
}

impl std::fmt::Display for ExportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerOrder => write!(f, "per-order"),
            Self::Daily => write!(f, "daily"),
        }
    }
}

impl std::str::FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-order" => Ok(Self::PerOrder),
            "daily" => Ok(Self::Daily),
            _ => Err(format!("invalid export mode: {s}")),
        }
    }
}

/// Errors that can occur when exporting or reading order files.
///
/// An export failure does not invalidate the order it was asked to write;
/// the order stands in memory and the caller surfaces the missing invoice
/// artifact separately from any validation failure.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The storage path could not be read or written.
    #[error("order storage failure at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing file does not parse as the expected tabular format.
    #[error("order file {path} is corrupt: {reason}")]
    Corrupt {
        /// Path of the unreadable file.
        path: PathBuf,
        /// What failed to parse.
        reason: String,
    },

    /// No aggregate orders file exists yet.
    #[error("no aggregate orders file exists")]
    NotFound,
}

/// One row of an exported order file, read back into typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub order_id: String,
    pub date: String,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub product: String,
    pub size: String,
    pub quantity: u32,
    pub price: Decimal,
    pub subtotal: Decimal,
    pub order_total: Decimal,
}

/// Writes placed orders to CSV files in a configured directory.
#[derive(Debug)]
pub struct OrderExporter {
    orders_dir: PathBuf,
    mode: ExportMode,
    // Serializes the read-modify-write append to the daily aggregate so
    // concurrent sessions cannot interleave and drop rows.
    aggregate_lock: Mutex<()>,
}

impl OrderExporter {
    /// Create an exporter writing into `orders_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the directory cannot be created.
    pub fn new(orders_dir: impl Into<PathBuf>, mode: ExportMode) -> Result<Self, ExportError> {
        let orders_dir = orders_dir.into();
        fs::create_dir_all(&orders_dir).map_err(|source| ExportError::Io {
            path: orders_dir.clone(),
            source,
        })?;
        Ok(Self {
            orders_dir,
            mode,
            aggregate_lock: Mutex::new(()),
        })
    }

    /// The configured export mode.
    #[must_use]
    pub const fn mode(&self) -> ExportMode {
        self.mode
    }

    /// Write `order` to durable storage and return the file written.
    ///
    /// In per-order mode the file is named from the order ID. In daily
    /// mode the order's rows are appended to today's aggregate file,
    /// preserving all previously written rows.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be written and
    /// [`ExportError::Corrupt`] if an existing aggregate file does not
    /// carry the expected header (the file is left untouched).
    pub fn export_order(&self, order: &Order) -> Result<PathBuf, ExportError> {
        let path = match self.mode {
            ExportMode::PerOrder => self.write_order_file(order)?,
            ExportMode::Daily => self.append_to_aggregate(order)?,
        };
        tracing::info!(order_id = %order.id(), path = %path.display(), "order exported");
        Ok(path)
    }

    /// Return the existing aggregate file for today, for bulk download.
    ///
    /// This never generates new data; it only hands back what previous
    /// exports persisted.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotFound`] if no aggregate file exists for
    /// today (always the case in per-order deployments).
    pub fn export_all_orders(&self) -> Result<PathBuf, ExportError> {
        let path = self.aggregate_path(Utc::now().date_naive());
        if path.exists() {
            Ok(path)
        } else {
            Err(ExportError::NotFound)
        }
    }

    /// Read an exported file back into typed rows.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be read and
    /// [`ExportError::Corrupt`] if the header or any row does not parse.
    pub fn read_rows(path: &Path) -> Result<Vec<ExportRow>, ExportError> {
        let content = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lines = content.lines();
        let head = lines.next().unwrap_or_default();
        if head != header() {
            return Err(corrupt(path, "unexpected header row".to_owned()));
        }

        let mut rows = Vec::new();
        for (number, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            rows.push(parse_row(path, number + 2, line)?);
        }
        Ok(rows)
    }

    /// Path of the aggregate file for a calendar day.
    #[must_use]
    pub fn aggregate_path(&self, date: NaiveDate) -> PathBuf {
        self.orders_dir
            .join(format!("orders_{}.csv", date.format("%Y%m%d")))
    }

    fn write_order_file(&self, order: &Order) -> Result<PathBuf, ExportError> {
        let path = self.orders_dir.join(format!("order_{}.csv", order.id()));
        let mut content = header();
        content.push('\n');
        push_rows(&mut content, order);
        fs::write(&path, content).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn append_to_aggregate(&self, order: &Order) -> Result<PathBuf, ExportError> {
        let path = self.aggregate_path(Utc::now().date_naive());

        // Critical section: read-modify-write must not interleave between
        // sessions appending to the same day's file.
        let _guard = self
            .aggregate_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut content = if path.exists() {
            let existing = fs::read_to_string(&path).map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
            if existing.lines().next().unwrap_or_default() != header() {
                return Err(corrupt(&path, "unexpected header row".to_owned()));
            }
            let mut existing = existing;
            if !existing.ends_with('\n') {
                existing.push('\n');
            }
            existing
        } else {
            let mut fresh = header();
            fresh.push('\n');
            fresh
        };

        push_rows(&mut content, order);
        fs::write(&path, content).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn header() -> String {
    COLUMNS.join(",")
}

fn push_rows(buf: &mut String, order: &Order) {
    let date = order.placed_at().format("%Y-%m-%d %H:%M:%S").to_string();
    for line in order.lines() {
        // Writing to a String cannot fail.
        let _ = writeln!(
            buf,
            "{},{},{},{},{},{},{},{},{},{},{}",
            escape(order.id().as_str()),
            escape(&date),
            escape(&order.customer().name),
            escape(&order.customer().phone),
            escape(&order.customer().address),
            escape(&line.name),
            escape(&line.size),
            line.quantity,
            line.price.amount(),
            line.subtotal(),
            order.total(),
        );
    }
}

/// Quote a field if it contains a comma, quote, or line break.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn corrupt(path: &Path, reason: String) -> ExportError {
    ExportError::Corrupt {
        path: path.to_path_buf(),
        reason,
    }
}

fn parse_row(path: &Path, number: usize, line: &str) -> Result<ExportRow, ExportError> {
    let fields =
        split_line(line).map_err(|reason| corrupt(path, format!("row {number}: {reason}")))?;
    let count = fields.len();
    let [order_id, date, customer_name, phone, address, product, size, quantity, price, subtotal, order_total]: [String; 11] =
        fields.try_into().map_err(|_| {
            corrupt(
                path,
                format!("row {number}: expected {} columns, found {count}", COLUMNS.len()),
            )
        })?;

    let quantity = quantity
        .parse()
        .map_err(|_| corrupt(path, format!("row {number}: bad quantity {quantity:?}")))?;
    let price = parse_decimal(path, number, "price", &price)?;
    let subtotal = parse_decimal(path, number, "subtotal", &subtotal)?;
    let order_total = parse_decimal(path, number, "total", &order_total)?;

    Ok(ExportRow {
        order_id,
        date,
        customer_name,
        phone,
        address,
        product,
        size,
        quantity,
        price,
        subtotal,
        order_total,
    })
}

fn parse_decimal(
    path: &Path,
    number: usize,
    column: &str,
    raw: &str,
) -> Result<Decimal, ExportError> {
    raw.parse()
        .map_err(|_| corrupt(path, format!("row {number}: bad {column} {raw:?}")))
}

/// Split one CSV line into fields, honoring quoted fields.
fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' if field.is_empty() => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_owned());
    }
    fields.push(field);
    Ok(fields)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use cotton_harbor_core::Price;

    use crate::cart::Cart;
    use crate::catalog::Product;
    use crate::checkout::{CustomerDetails, place_order};

    use super::*;

    fn tee(id: &str, name: &str, price: u32) -> Product {
        Product {
            id: id.into(),
            name: name.to_owned(),
            description: String::new(),
            price: Price::new(Decimal::from(price)).unwrap(),
            sizes: vec!["S".to_owned(), "M".to_owned()],
            image: String::new(),
        }
    }

    fn red_tee_order() -> Order {
        let mut cart = Cart::new();
        cart.add_item(&tee("red-tee", "Red Tee", 500), "M", 2).unwrap();
        let customer = CustomerDetails::new("Ali", "0300 1234567", "Lahore");
        place_order(&cart, &customer).unwrap()
    }

    #[test]
    fn test_per_order_export_and_read_back() {
        let dir = TempDir::new().unwrap();
        let exporter = OrderExporter::new(dir.path(), ExportMode::PerOrder).unwrap();

        let order = red_tee_order();
        let path = exporter.export_order(&order).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("order_{}.csv", order.id())
        );

        let rows = OrderExporter::read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.order_id, order.id().as_str());
        assert_eq!(row.customer_name, "Ali");
        assert_eq!(row.product, "Red Tee");
        assert_eq!(row.size, "M");
        assert_eq!(row.quantity, 2);
        assert_eq!(row.price, Decimal::from(500));
        assert_eq!(row.subtotal, Decimal::from(1000));
        assert_eq!(row.order_total, Decimal::from(1000));
    }

    #[test]
    fn test_daily_append_preserves_existing_rows() {
        let dir = TempDir::new().unwrap();
        let exporter = OrderExporter::new(dir.path(), ExportMode::Daily).unwrap();

        let first = red_tee_order();
        let second = red_tee_order();
        let path_a = exporter.export_order(&first).unwrap();
        let path_b = exporter.export_order(&second).unwrap();
        assert_eq!(path_a, path_b);

        let rows = OrderExporter::read_rows(&path_a).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_id, first.id().as_str());
        assert_eq!(rows[1].order_id, second.id().as_str());
    }

    #[test]
    fn test_fields_with_commas_survive_the_round_trip() {
        let dir = TempDir::new().unwrap();
        let exporter = OrderExporter::new(dir.path(), ExportMode::PerOrder).unwrap();

        let mut cart = Cart::new();
        cart.add_item(&tee("tee", "Tee, \"Limited\" Edition", 750), "S", 1)
            .unwrap();
        let customer =
            CustomerDetails::new("Ali", "0300 1234567", "House 12, Street 4, Lahore");
        let order = place_order(&cart, &customer).unwrap();

        let path = exporter.export_order(&order).unwrap();
        let rows = OrderExporter::read_rows(&path).unwrap();
        assert_eq!(rows[0].address, "House 12, Street 4, Lahore");
        assert_eq!(rows[0].product, "Tee, \"Limited\" Edition");
    }

    #[test]
    fn test_multi_line_order_repeats_order_fields_per_row() {
        let dir = TempDir::new().unwrap();
        let exporter = OrderExporter::new(dir.path(), ExportMode::PerOrder).unwrap();

        let mut cart = Cart::new();
        cart.add_item(&tee("a", "A Tee", 500), "M", 2).unwrap();
        cart.add_item(&tee("b", "B Tee", 300), "S", 1).unwrap();
        let order =
            place_order(&cart, &CustomerDetails::new("Ali", "0300", "Lahore")).unwrap();

        let path = exporter.export_order(&order).unwrap();
        let rows = OrderExporter::read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.order_id, order.id().as_str());
            assert_eq!(row.order_total, Decimal::from(1300));
        }
        assert_eq!(rows[0].subtotal, Decimal::from(1000));
        assert_eq!(rows[1].subtotal, Decimal::from(300));
    }

    #[test]
    fn test_corrupt_aggregate_is_rejected_and_untouched() {
        let dir = TempDir::new().unwrap();
        let exporter = OrderExporter::new(dir.path(), ExportMode::Daily).unwrap();

        let path = exporter.aggregate_path(Utc::now().date_naive());
        fs::write(&path, "not,the,expected,header\nsome,stale,data,here\n").unwrap();

        let err = exporter.export_order(&red_tee_order()).unwrap_err();
        assert!(matches!(err, ExportError::Corrupt { .. }));

        let untouched = fs::read_to_string(&path).unwrap();
        assert!(untouched.starts_with("not,the,expected,header"));
    }

    #[test]
    fn test_unwritable_directory_fails_with_io() {
        let dir = TempDir::new().unwrap();
        // A file where the orders directory should be
        let blocked = dir.path().join("orders");
        fs::write(&blocked, "occupied").unwrap();

        let err = OrderExporter::new(&blocked, ExportMode::PerOrder).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }

    #[test]
    fn test_export_all_orders_requires_an_aggregate() {
        let dir = TempDir::new().unwrap();
        let exporter = OrderExporter::new(dir.path(), ExportMode::Daily).unwrap();

        assert!(matches!(
            exporter.export_all_orders(),
            Err(ExportError::NotFound)
        ));

        exporter.export_order(&red_tee_order()).unwrap();
        let path = exporter.export_all_orders().unwrap();
        assert_eq!(path, exporter.aggregate_path(Utc::now().date_naive()));
    }

    #[test]
    fn test_export_mode_parses_config_tokens() {
        assert_eq!("per-order".parse::<ExportMode>().unwrap(), ExportMode::PerOrder);
        assert_eq!("daily".parse::<ExportMode>().unwrap(), ExportMode::Daily);
        assert!("weekly".parse::<ExportMode>().is_err());
    }

    #[test]
    fn test_split_line_handles_quoted_fields() {
        let fields = split_line(r#"a,"b, with comma","with ""quote""",d"#).unwrap();
        assert_eq!(fields, vec!["a", "b, with comma", "with \"quote\"", "d"]);
        assert!(split_line("\"unterminated").is_err());
    }
}
