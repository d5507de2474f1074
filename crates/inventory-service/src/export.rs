//! CSV export of inventory items.

use inventory_core::InventoryItem;

use crate::error::ApiError;

/// Column headers, in output order.
pub const EXPORT_HEADERS: [&str; 17] = [
    "UID",
    "Category",
    "Item Name",
    "Serial Number",
    "Location",
    "Project",
    "Status",
    "Quantity",
    "Description",
    "Document",
    "Image",
    "CPU",
    "GPU",
    "OS",
    "Installed Software",
    "Created At",
    "Updated At",
];

fn row(item: &InventoryItem) -> [String; 17] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        item.uid_no.to_string(),
        item.category.label().to_string(),
        item.item_name.clone(),
        text(&item.serial_number),
        text(&item.location),
        text(&item.project),
        item.status.to_string(),
        item.quantity.to_string(),
        text(&item.description),
        text(&item.document),
        text(&item.image),
        text(&item.cpu),
        text(&item.gpu),
        text(&item.os),
        text(&item.installed_software),
        item.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        item.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]
}

/// Render `items` as a CSV document with a header row.
pub fn items_to_csv(items: &[InventoryItem]) -> Result<String, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| ApiError::Internal(format!("CSV write failed: {e}")))?;
    for item in items {
        writer
            .write_record(row(item))
            .map_err(|e| ApiError::Internal(format!("CSV write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(format!("CSV not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use inventory_core::{Category, ItemId, NewItem, Uid, YearMonth};

    #[test]
    fn header_only_when_empty() {
        let csv = items_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("UID,Category,Item Name"));
    }

    #[test]
    fn quotes_fields_with_commas() {
        let mut new = NewItem::new(Category::Monitor, "Dell 27\", IPS");
        new.location = Some("HQ".into());
        let uid = Uid::new(Category::Monitor, YearMonth::new(25, 7).unwrap(), 12);
        let item = InventoryItem::from_new(new, ItemId::generate(), uid, Utc::now());

        let csv = items_to_csv(&[item]).unwrap();
        let second = csv.lines().nth(1).unwrap();
        assert!(second.starts_with("MON-2507-0012,Monitor,\"Dell 27\"\", IPS\",,HQ,,Available,1"));
    }
}
