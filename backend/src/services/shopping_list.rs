//! Shopping list compilation and rendering
//!
//! Aggregation happens in SQL; rendering is pure so it can be tested without
//! a database.

use crate::error::ApiError;
use crate::repositories::{CollectionRepository, ShoppingItem};
use chrono::{DateTime, Local};
use sqlx::PgPool;
use tracing::info;

/// Aggregated cart contents, stamped with the server's local time
#[derive(Debug, Clone)]
pub struct ShoppingList {
    pub items: Vec<ShoppingItem>,
    pub recipes: Vec<String>,
    pub compiled_at: DateTime<Local>,
}

/// Download format (`?format=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoppingListFormat {
    Text,
    Csv,
}

impl ShoppingListFormat {
    pub fn parse(value: Option<&str>) -> Result<Self, ApiError> {
        match value.map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("txt") | Some("text") => Ok(Self::Text),
            Some("csv") => Ok(Self::Csv),
            Some(other) => Err(ApiError::field(
                "format",
                format!("Unsupported format: {}", other),
            )),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// Python-style capitalize: first character upper, the rest lower
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Render the plain text list
pub fn render_text(list: &ShoppingList) -> String {
    if list.items.is_empty() {
        return "Shopping list is empty.".to_string();
    }

    let mut lines = Vec::with_capacity(list.items.len() + list.recipes.len() + 2);
    lines.push(format!(
        "Shopping list (compiled: {}):",
        list.compiled_at.format("%Y-%m-%d %H:%M:%S")
    ));
    for (index, item) in list.items.iter().enumerate() {
        lines.push(format!(
            "{}. {} - {} {}",
            index + 1,
            capitalize(&item.name),
            item.amount,
            item.measurement_unit
        ));
    }
    lines.push("For the following recipes:".to_string());
    lines.extend(list.recipes.iter().map(|recipe| format!("- {}", recipe)));

    lines.join("\n")
}

/// Render `name,amount,measurement_unit` rows
pub fn render_csv(list: &ShoppingList) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "amount", "measurement_unit"])?;
    for item in &list.items {
        writer.write_record([
            capitalize(&item.name),
            item.amount.to_string(),
            item.measurement_unit.clone(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("csv flush failed: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

/// Attachment name, e.g. `Shopping_cart_20240105143000.txt`
pub fn file_name(format: ShoppingListFormat, at: DateTime<Local>) -> String {
    format!("Shopping_cart_{}.{}", at.format("%Y%m%d%H%M%S"), format.extension())
}

pub struct ShoppingListService;

impl ShoppingListService {
    pub async fn compile(pool: &PgPool, user_id: i64) -> Result<ShoppingList, ApiError> {
        let items = CollectionRepository::shopping_items(pool, user_id)
            .await
            .map_err(ApiError::Internal)?;
        let recipes = CollectionRepository::cart_recipe_names(pool, user_id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(ShoppingList {
            items,
            recipes,
            compiled_at: Local::now(),
        })
    }

    /// Compile and render, returning the file name and body
    pub async fn download(
        pool: &PgPool,
        user_id: i64,
        format: ShoppingListFormat,
    ) -> Result<(String, String), ApiError> {
        let list = Self::compile(pool, user_id).await?;

        let body = match format {
            ShoppingListFormat::Text => render_text(&list),
            ShoppingListFormat::Csv => render_csv(&list).map_err(ApiError::Internal)?,
        };

        metrics::counter!("foodgram_shopping_lists_downloaded_total").increment(1);
        info!(user_id, items = list.items.len(), "Shopping list downloaded");

        Ok((file_name(format, list.compiled_at), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use rstest::rstest;

    fn item(name: &str, amount: i64, unit: &str) -> ShoppingItem {
        ShoppingItem {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    fn compiled_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).single().unwrap()
    }

    fn list(items: Vec<ShoppingItem>, recipes: &[&str]) -> ShoppingList {
        ShoppingList {
            items,
            recipes: recipes.iter().map(|r| r.to_string()).collect(),
            compiled_at: compiled_at(),
        }
    }

    #[test]
    fn test_render_text() {
        let list = list(
            vec![item("beetroot", 600, "g"), item("sour CREAM", 2, "tbsp")],
            &["Borscht", "Vinaigrette"],
        );

        assert_eq!(
            render_text(&list),
            "Shopping list (compiled: 2024-01-05 14:30:00):\n\
             1. Beetroot - 600 g\n\
             2. Sour cream - 2 tbsp\n\
             For the following recipes:\n\
             - Borscht\n\
             - Vinaigrette"
        );
    }

    #[test]
    fn test_header_uses_local_wall_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 7, 1, 23, 15, 0).unwrap();
        let mut list = list(vec![item("salt", 1, "g")], &["Soup"]);
        list.compiled_at = instant.with_timezone(&Local);

        let local = instant.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
        let header = render_text(&list).lines().next().unwrap().to_string();
        assert_eq!(header, format!("Shopping list (compiled: {}):", local));
        assert_eq!(
            file_name(ShoppingListFormat::Csv, list.compiled_at),
            format!("Shopping_cart_{}.csv", instant.with_timezone(&Local).format("%Y%m%d%H%M%S"))
        );
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(render_text(&list(vec![], &[])), "Shopping list is empty.");
    }

    #[test]
    fn test_render_csv() {
        let list = list(vec![item("salt, sea", 5, "g")], &["Soup"]);
        assert_eq!(
            render_csv(&list).unwrap(),
            "name,amount,measurement_unit\n\"Salt, sea\",5,g\n"
        );
    }

    #[rstest]
    #[case("яблоко", "Яблоко")]
    #[case("SALT", "Salt")]
    #[case("", "")]
    fn test_capitalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(capitalize(input), expected);
    }

    #[rstest]
    #[case(None, ShoppingListFormat::Text)]
    #[case(Some("txt"), ShoppingListFormat::Text)]
    #[case(Some("CSV"), ShoppingListFormat::Csv)]
    fn test_parse_format(#[case] value: Option<&str>, #[case] expected: ShoppingListFormat) {
        assert_eq!(ShoppingListFormat::parse(value).unwrap(), expected);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(ShoppingListFormat::parse(Some("pdf")).is_err());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name(ShoppingListFormat::Text, compiled_at()),
            "Shopping_cart_20240105143000.txt"
        );
    }

    proptest! {
        #[test]
        fn prop_lines_are_numbered_in_order(amounts in prop::collection::vec(1i64..10_000, 1..20)) {
            let items: Vec<_> = amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| item(&format!("item{}", i), *amount, "g"))
                .collect();
            let text = render_text(&list(items, &["Recipe"]));
            let lines: Vec<&str> = text.lines().collect();

            prop_assert_eq!(lines.len(), amounts.len() + 3);
            for (i, amount) in amounts.iter().enumerate() {
                let expected = format!("{}. Item{} - {} g", i + 1, i, amount);
                prop_assert_eq!(lines[i + 1], expected.as_str());
            }
        }
    }
}
