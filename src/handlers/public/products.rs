use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::ListingConfig;
use crate::database::models::Product;
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::state::AppState;

/// Query parameters for GET /products. Numbers arrive as raw strings so
/// malformed values produce a 400 with the standard envelope instead of
/// the extractor's default rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    /// Collection name, or the sentinel "all" for no collection filter.
    pub filter: Option<String>,
    /// Comma-separated category list, match-any.
    pub category: Option<String>,
    /// Comma-separated "true"/"false" list, match-any.
    pub availability: Option<String>,
    /// "default" | "low" | "high"
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductSort {
    Newest,
    PriceLow,
    PriceHigh,
}

impl ProductSort {
    /// `default` and anything unrecognized fall back to newest-first.
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("low") => ProductSort::PriceLow,
            Some("high") => ProductSort::PriceHigh,
            _ => ProductSort::Newest,
        }
    }

    fn order_spec(self) -> Value {
        match self {
            ProductSort::Newest => json!("created_at desc"),
            ProductSort::PriceLow => json!("sale_price asc"),
            ProductSort::PriceHigh => json!("sale_price desc"),
        }
    }
}

/// GET /products - paged, filtered, sorted product listing.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = build_filter(&query, &state.config.listing)?;

    let repo = Repository::<Product>::new("products", state.db.clone());
    let products = repo.select_any(filter).await?;

    Ok(Json(json!({ "success": true, "products": products })))
}

/// GET /products/facets - category and availability counts for the filter
/// sidebar, optionally pre-filtered by collection.
pub async fn product_facets(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let where_clause = collection_where(query.filter.as_deref());
    let filter = FilterData {
        where_clause: where_clause.clone(),
        ..Default::default()
    };

    let repo = Repository::<Product>::new("products", state.db.clone());
    let categories = repo.count_grouped("category", filter).await?;
    let availability = repo
        .count_grouped(
            "availability",
            FilterData {
                where_clause,
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "categories": categories,
        "availability": availability,
    })))
}

fn collection_where(filter: Option<&str>) -> Option<Value> {
    match filter {
        Some(collection) if collection != "all" && !collection.is_empty() => {
            Some(json!({ "collection": collection }))
        }
        _ => None,
    }
}

fn parse_positive(raw: Option<&str>, default: i64, name: &str) -> Result<i64, ApiError> {
    let value = match raw {
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request(format!("{} must be a positive integer", name)))?,
        None => default,
    };
    if value < 1 {
        return Err(ApiError::bad_request(format!("{} must be a positive integer", name)));
    }
    Ok(value)
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Maps listing query parameters onto a filter document. Page and size get
/// explicit defaults and validation; size is capped.
pub(crate) fn build_filter(query: &ListingQuery, listing: &ListingConfig) -> Result<FilterData, ApiError> {
    let page = parse_positive(query.page.as_deref(), listing.default_page, "page")?;
    let size = parse_positive(query.size.as_deref(), listing.default_page_size, "size")?
        .min(listing.max_page_size);

    let mut where_doc = Map::new();
    if let Some(Value::Object(obj)) = collection_where(query.filter.as_deref()) {
        where_doc.extend(obj);
    }

    if let Some(raw) = query.category.as_deref() {
        let categories = split_list(raw);
        if !categories.is_empty() {
            where_doc.insert("category".to_string(), json!({ "$in": categories }));
        }
    }

    if let Some(raw) = query.availability.as_deref() {
        let mut flags = Vec::new();
        for token in split_list(raw) {
            match token {
                "true" => flags.push(true),
                "false" => flags.push(false),
                other => {
                    return Err(ApiError::bad_request(format!(
                        "availability must be true or false, got: {}",
                        other
                    )));
                }
            }
        }
        if !flags.is_empty() {
            where_doc.insert("availability".to_string(), json!({ "$in": flags }));
        }
    }

    Ok(FilterData {
        where_clause: if where_doc.is_empty() { None } else { Some(Value::Object(where_doc)) },
        order: Some(ProductSort::parse(query.sort.as_deref()).order_spec()),
        limit: Some(size),
        offset: Some((page - 1) * size),
    })
}
