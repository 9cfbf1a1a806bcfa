//! Read-only cart availability check.

use kidshop_core::VariantDescriptor;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::products::load_products_with_variants;
use crate::DbError;

#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_ref: String,
    pub descriptor: VariantDescriptor,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemReport {
    pub product_id: i64,
    pub product_name: String,
    pub design: String,
    pub color: String,
    pub size: String,
    pub price: Decimal,
    pub requested_quantity: i64,
    pub available_stock: i64,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartReport {
    pub is_valid: bool,
    pub items: Vec<CartItemReport>,
    pub errors: Vec<String>,
}

/// Reports availability for each cart line without touching stock.
///
/// Malformed ids, unknown products, unmatched variants and quantities below
/// one become entries in `errors`; the remaining lines are still checked.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup fails.
pub async fn check_cart(pool: &PgPool, lines: &[CartLine]) -> Result<CartReport, DbError> {
    let parsed: Vec<Option<i64>> = lines
        .iter()
        .map(|line| line.product_ref.trim().parse::<i64>().ok())
        .collect();
    let ids: Vec<i64> = parsed.iter().flatten().copied().collect();

    let mut conn = pool.acquire().await?;
    let products = load_products_with_variants(&mut conn, &ids).await?;

    let mut report = CartReport {
        is_valid: true,
        items: Vec::new(),
        errors: Vec::new(),
    };

    for (line, id) in lines.iter().zip(parsed) {
        let Some(id) = id else {
            report.errors.push(format!("Invalid product ID: {}", line.product_ref));
            continue;
        };
        let Some(product) = products.get(&id) else {
            report.errors.push(format!("Product not found: {}", line.product_ref));
            continue;
        };
        let descriptor = &line.descriptor;
        let Some(variant) = descriptor.find_in(&product.variants) else {
            report.errors.push(format!(
                "Variant not available for {}: {} - {} {}",
                product.product.name,
                descriptor.design_or_empty(),
                descriptor.color_or_empty(),
                descriptor.size_or_empty()
            ));
            continue;
        };

        let available = i64::from(variant.stock);
        let valid_quantity = line.quantity >= 1;
        let is_available = valid_quantity && available >= line.quantity;
        if !valid_quantity {
            report.errors.push(format!(
                "Invalid quantity for {}: {}",
                product.product.name, line.quantity
            ));
        } else if !is_available {
            report.errors.push(format!(
                "Insufficient stock for {} - {} {}: Available {}, Requested {}",
                product.product.name,
                descriptor.color_or_empty(),
                descriptor.size_or_empty(),
                available,
                line.quantity
            ));
        }

        report.items.push(CartItemReport {
            product_id: id,
            product_name: product.product.name.clone(),
            design: variant.design.clone(),
            color: variant.color.clone(),
            size: variant.size.clone(),
            price: product.product.price,
            requested_quantity: line.quantity,
            available_stock: available,
            is_available,
        });
    }

    report.is_valid = report.errors.is_empty();
    Ok(report)
}
