//! XML export in the store's inventory upload schema.
//!
//! Each inventory record is first extracted into an [`InventoryItem`] by fixed
//! paths, failing with [`ExportError::MissingField`] when a path is absent.
//! Rendering then streams one `<ITEM>` per record inside a single
//! `<INVENTORY>` root through a `quick_xml::Writer`.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::category::{Category, CategoryIndex};
use crate::error::ExportError;
use crate::flatten::scalar_text;
use crate::output::prepare_destination;

// Informational only, nothing validates against it.
const DOCTYPE: &str = "INVENTORY";
const IN_STOCK: &str = "I";

/// Escapes text for XML element content: `&`, `<`, `>`, `"` and `'`.
///
/// Escaping is not idempotent: applying it twice turns `&amp;` into
/// `&amp;amp;`.
///
/// ```
/// use bricklink_backup_core::xml_export::escape;
///
/// assert_eq!(escape("A & B < C"), "A &amp; B &lt; C");
/// ```
pub fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Renders a scalar for element content. Only strings are escaped; numbers,
/// booleans and null cannot contain markup.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => escape(s),
        other => scalar_text(other),
    }
}

fn xml_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    escaped: &str,
) -> Result<(), ExportError> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::from_escaped(escaped)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(xml_err)
}

/// One inventory lot, reduced to the fields the XML schema carries.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub item_id: Value,
    pub item_type: Value,
    pub color_id: Value,
    pub color_name: Value,
    pub item_name: Value,
    pub category_id: Value,
    pub category_name: Value,
    pub bulk: Value,
    pub cost: Value,
    pub quantity: Value,
    pub unit_price: Value,
    pub condition: Value,
}

impl InventoryItem {
    /// Extracts the schema fields from a raw inventory record.
    ///
    /// `item.category_name` is taken from the record when a category join has
    /// already run; otherwise it is looked up in `categories`. With an empty
    /// index an unjoined record is reported as missing the field.
    pub fn from_record(record: &Value, categories: &CategoryIndex) -> Result<Self, ExportError> {
        let label = record_label(record);
        let field = |name: &'static str, path: &[&str]| -> Result<Value, ExportError> {
            lookup(record, path).cloned().ok_or_else(|| {
                error!(field = name, item = %label, "Inventory record is missing a field");
                ExportError::MissingField {
                    field: name,
                    item: label.clone(),
                }
            })
        };

        let category_id = field("item.category_id", &["item", "category_id"])?;
        let category_name = match lookup(record, &["item", "category_name"]) {
            Some(name) => name.clone(),
            None if !categories.is_empty() => Value::String(
                category_id
                    .as_i64()
                    .and_then(|id| categories.name_for(id))
                    .unwrap_or_default()
                    .to_owned(),
            ),
            None => field("item.category_name", &["item", "category_name"])?,
        };

        Ok(Self {
            item_id: field("item.no", &["item", "no"])?,
            item_type: field("item.type", &["item", "type"])?,
            color_id: field("color_id", &["color_id"])?,
            color_name: field("color_name", &["color_name"])?,
            item_name: field("item.name", &["item", "name"])?,
            category_id,
            category_name,
            bulk: field("bulk", &["bulk"])?,
            cost: field("my_cost", &["my_cost"])?,
            quantity: field("quantity", &["quantity"])?,
            unit_price: field("unit_price", &["unit_price"])?,
            condition: field("new_or_used", &["new_or_used"])?,
        })
    }

    /// Writes this item's `<ITEM>` element.
    pub fn write_element<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), ExportError> {
        let (type_code, type_name) = item_type_labels(&self.item_type);
        let elements: [(&str, String); 14] = [
            ("ITEMID", render(&self.item_id)),
            ("ITEMTYPE", type_code),
            ("COLOR", render(&self.color_id)),
            ("COLORNAME", render(&self.color_name)),
            ("ITEMNAME", render(&self.item_name)),
            ("ITEMTYPENAME", type_name),
            ("CATEGORY", render(&self.category_id)),
            ("CATEGORYNAME", render(&self.category_name)),
            ("BULK", render(&self.bulk)),
            ("COST", render(&self.cost)),
            ("QTY", render(&self.quantity)),
            ("PRICE", render(&self.unit_price)),
            ("CONDITION", render(&self.condition)),
            ("STATUS", IN_STOCK.to_owned()),
        ];
        writer
            .write_event(Event::Start(BytesStart::new("ITEM")))
            .map_err(xml_err)?;
        for (tag, text) in &elements {
            write_text_element(writer, tag, text)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("ITEM")))
            .map_err(xml_err)
    }
}

fn lookup<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(record, |node, key| node.get(key))
}

/// Identifies a record in error messages.
fn record_label(record: &Value) -> String {
    lookup(record, &["inventory_id"])
        .or_else(|| lookup(record, &["item", "no"]))
        .map(scalar_text)
        .unwrap_or_else(|| "<unknown>".to_owned())
}

/// XML type code and display name for an API item type such as `PART`.
/// Unknown types are passed through as both.
fn item_type_labels(item_type: &Value) -> (String, String) {
    let raw = scalar_text(item_type);
    let known = match raw.as_str() {
        "PART" => Some(("P", "Part")),
        "SET" => Some(("S", "Set")),
        "MINIFIG" => Some(("M", "Minifig")),
        "BOOK" => Some(("B", "Book")),
        "GEAR" => Some(("G", "Gear")),
        "CATALOG" => Some(("C", "Catalog")),
        "INSTRUCTION" => Some(("I", "Instruction")),
        "UNSORTED_LOT" => Some(("U", "Unsorted Lot")),
        "ORIGINAL_BOX" => Some(("O", "Original Box")),
        _ => None,
    };
    match known {
        Some((code, name)) => (code.to_owned(), name.to_owned()),
        None => {
            let escaped = escape(&raw);
            (escaped.clone(), escaped)
        }
    }
}

/// Renders the whole document for already extracted items.
pub fn render_document(items: &[InventoryItem]) -> Result<String, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("INVENTORY")))
        .map_err(xml_err)?;
    for item in items {
        item.write_element(&mut writer)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("INVENTORY")))
        .map_err(xml_err)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(xml_err)
}

/// Writes `records` as `<dir>/<slug(name)>.xml`.
///
/// `categories` names the category of records that have not been through
/// [`crate::category::join_categories`]; pass an empty slice when they have.
/// Every record is extracted before anything is written, so a missing field
/// leaves no partial file behind. Missing directories are created and an
/// existing file is overwritten.
pub fn write_xml(
    records: &[Value],
    dir: &Path,
    name: &str,
    categories: &[Category],
) -> Result<PathBuf, ExportError> {
    info!(records = records.len(), "Writing data into .xml file");
    let index = CategoryIndex::new(categories);
    let items = records
        .iter()
        .map(|record| InventoryItem::from_record(record, &index))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(items = items.len(), "Extracted inventory items for XML");

    let document = render_document(&items)?;
    let path = prepare_destination(dir, name, "xml")?;
    fs::write(&path, document).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to write XML");
        ExportError::Io {
            path: path.clone(),
            source: e,
        }
    })?;

    info!(path = %path.display(), items = items.len(), "XML backup written");
    Ok(path)
}
