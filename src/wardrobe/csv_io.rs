//! CSV Import and Export
//!
//! Bulk item import from spreadsheet exports and the CSV flavour of the
//! data export. Columns are matched by header name, case-insensitively:
//!
//! | column                       | required | notes                         |
//! |------------------------------|----------|-------------------------------|
//! | `name`                       | yes      |                               |
//! | `category` / `type`          | yes      | synonyms like "jeans" accepted|
//! | `color` / `colour`           | no       |                               |
//! | `brand`                      | no       |                               |
//! | `price` / `purchase_price`   | no       | currency symbols stripped     |
//! | `purchase_date` / `date`     | no       | several date formats          |
//! | `tags` / `style_tags`        | no       | `;` or `|` separated          |
//! | `seasons`                    | no       | `;` or `|` separated          |

use chrono::NaiveDate;
use thiserror::Error;

use super::item::{ItemCategory, WardrobeItem};

/// Errors that abort an import outright
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("No rows to import")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of parsing an import file
#[derive(Debug, Default)]
pub struct ImportResult {
    pub items: Vec<WardrobeItem>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Default)]
struct Columns {
    name: usize,
    category: usize,
    color: Option<usize>,
    brand: Option<usize>,
    price: Option<usize>,
    purchase_date: Option<usize>,
    tags: Option<usize>,
    seasons: Option<usize>,
}

impl Columns {
    fn detect(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |names: &[&str]| find_column(headers, names);

        Ok(Self {
            name: find(&["name", "item", "item_name"][..]).ok_or(ImportError::MissingColumn("name"))?,
            category: find(&["category", "type"][..]).ok_or(ImportError::MissingColumn("category"))?,
            color: find(&["color", "colour"][..]),
            brand: find(&["brand"][..]),
            price: find(&["price", "purchase_price", "cost"][..]),
            purchase_date: find(&["purchase_date", "date", "purchased"][..]),
            tags: find(&["tags", "style_tags", "style"][..]),
            seasons: find(&["seasons", "season"][..]),
        })
    }
}

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let key = h.trim().to_lowercase().replace(' ', "_");
        names.contains(&key.as_str())
    })
}

/// Parses item rows for one owner
pub struct ItemCsvImporter {
    owner_id: String,
}

impl ItemCsvImporter {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
        }
    }

    /// Parse a CSV document. Bad rows are reported, not fatal.
    pub fn import(&self, data: &[u8]) -> Result<ImportResult, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let columns = Columns::detect(reader.headers()?)?;
        let mut result = ImportResult::default();

        for (idx, record) in reader.records().enumerate() {
            // Header is line 1
            let line = idx + 2;
            result.rows_processed += 1;

            let parsed = record
                .map_err(|e| e.to_string())
                .and_then(|r| self.parse_row(&columns, &r));

            match parsed {
                Ok(item) => result.items.push(item),
                Err(e) => {
                    result.rows_failed += 1;
                    result.errors.push(format!("Line {}: {}", line, e));
                }
            }
        }

        if result.rows_processed == 0 {
            return Err(ImportError::Empty);
        }

        tracing::info!(
            owner_id = %self.owner_id,
            rows = result.rows_processed,
            failed = result.rows_failed,
            "Parsed item CSV"
        );

        Ok(result)
    }

    fn parse_row(&self, columns: &Columns, record: &csv::StringRecord) -> Result<WardrobeItem, String> {
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).filter(|s| !s.is_empty());

        let name = field(Some(columns.name)).ok_or("missing name")?;
        let raw_category = field(Some(columns.category)).ok_or("missing category")?;
        let category = ItemCategory::parse(raw_category)
            .ok_or_else(|| format!("unknown category '{}'", raw_category))?;

        let mut item = WardrobeItem::new(self.owner_id.clone(), name, category);
        item.color = field(columns.color).map(str::to_string);
        item.brand = field(columns.brand).map(str::to_string);
        item.purchase_price = field(columns.price).map(parse_price).transpose()?;
        item.purchase_date = field(columns.purchase_date).map(parse_date).transpose()?;
        item.style_tags = field(columns.tags).map(split_list).unwrap_or_default();
        item.seasons = field(columns.seasons).map(split_list).unwrap_or_default();

        item.sanitize().map_err(|e| e.to_string())?;
        Ok(item)
    }
}

fn parse_price(s: &str) -> Result<f64, String> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| format!("invalid price '{}'", s))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("could not parse date '{}'", s))
}

fn split_list(s: &str) -> Vec<String> {
    s.split(|c| c == ';' || c == '|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render items as CSV with the same columns the importer reads
pub fn items_to_csv(items: &[WardrobeItem]) -> Result<String, ImportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "name",
        "category",
        "color",
        "brand",
        "price",
        "purchase_date",
        "tags",
        "seasons",
        "wear_count",
        "cost_per_wear",
        "last_worn_at",
        "archived",
    ])?;

    for item in items {
        writer.write_record([
            item.id.clone(),
            item.name.clone(),
            item.category.to_string(),
            item.color.clone().unwrap_or_default(),
            item.brand.clone().unwrap_or_default(),
            item.purchase_price.map(|p| format!("{:.2}", p)).unwrap_or_default(),
            item.purchase_date.map(|d| d.to_string()).unwrap_or_default(),
            item.style_tags.join(";"),
            item.seasons.join(";"),
            item.wear_count.to_string(),
            item.cost_per_wear().map(|c| format!("{:.2}", c)).unwrap_or_default(),
            item.last_worn_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            item.archived.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| ImportError::Io(e.into_error()))?;
    tracing::debug!(items = items.len(), "Rendered item CSV");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
