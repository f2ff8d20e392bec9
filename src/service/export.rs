use std::io::Write;

use crate::models::LineItem;

/// 导出文件名
pub const CSV_FILENAME: &str = "processed_purchase_order.csv";

const HEADERS: [&str; 5] = ["Request Item", "Quantity", "Unit Price", "Total", "Matched Product"];

/// 导出明细到 CSV, 每行一条明细; 空值导出为空单元格
pub fn write_csv<W: Write>(items: &[LineItem], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADERS)?;

    for item in items {
        writer.write_record([
            item.item_name.clone(),
            item.qty.to_string(),
            item.price.to_string(),
            item.total_amount.to_string(),
            item.matched_product.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(items: &[LineItem]) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_csv(items, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
